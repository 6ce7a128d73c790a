use askama::Template;
use axum::response::Response;
use http::{HeaderMap, StatusCode};

use qepo::is_authenticated;

use crate::flash::{Toast, take_flash};

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    logged_in: bool,
    toasts: Vec<Toast>,
}

pub(super) async fn home(headers: HeaderMap) -> Result<Response, (StatusCode, String)> {
    let (notifications, clear_flash) = take_flash(&headers);
    let template = HomeTemplate {
        logged_in: is_authenticated(&headers).await,
        toasts: notifications.into_iter().map(Toast::from).collect(),
    };
    super::render_page(&template, clear_flash)
}
