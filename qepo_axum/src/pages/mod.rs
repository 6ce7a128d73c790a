mod auth;
mod home;
mod profile;
mod router;
mod storage;

pub(crate) use router::router;

use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use http::{HeaderMap, StatusCode};

/// Render `template` and attach `headers`, typically the one clearing the
/// flash cookie that supplied its toasts
pub(super) fn render_page<T: Template>(
    template: &T,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let html = template.render().map_err(|e| {
        tracing::error!(error = %e, "Template rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok((headers, Html(html)).into_response())
}
