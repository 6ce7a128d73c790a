//! Route guards, applied with `axum::middleware::from_fn`

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::header::HeaderValue;

use qepo::QEPO_REDIRECT_HOME;

use super::config::QEPO_RESPOND_WITH_X_CSRF_TOKEN;
use super::error::ApiError;
use super::session::load_auth_user;

fn add_csrf_header(mut response: Response, csrf_token: &str) -> Response {
    if !*QEPO_RESPOND_WITH_X_CSRF_TOKEN {
        return response;
    }

    if let Ok(header_value) = HeaderValue::from_str(csrf_token) {
        response.headers_mut().insert("X-CSRF-Token", header_value);
    } else {
        tracing::error!("Failed to create CSRF header value from token");
    }
    response
}

fn redirect_home() -> Response {
    Redirect::temporary(QEPO_REDIRECT_HOME.as_str()).into_response()
}

async fn guard_user(mut req: Request, next: Next, on_anonymous: fn(&Request) -> Response) -> Response {
    let Some(auth_user) = load_auth_user(req.headers()).await else {
        tracing::debug!(path = %req.uri().path(), "Anonymous request to a private route");
        return on_anonymous(&req);
    };

    let csrf_token = auth_user.csrf_token.clone();
    req.extensions_mut().insert(auth_user);
    let response = next.run(req).await;
    add_csrf_header(response, &csrf_token)
}

/// Private pages: anonymous GETs go home, anything else gets 401
pub async fn require_user(req: Request, next: Next) -> Response {
    guard_user(req, next, |req| {
        if req.method() == http::Method::GET {
            redirect_home()
        } else {
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    })
    .await
}

/// JSON routes: anonymous requests get a 401 body
pub async fn require_user_401(req: Request, next: Next) -> Response {
    guard_user(req, next, |_| ApiError::unauthorized().into_response()).await
}

/// Guest-only pages such as login and register: signed-in users go home
pub async fn require_guest(req: Request, next: Next) -> Response {
    if load_auth_user(req.headers()).await.is_some() {
        tracing::debug!(path = %req.uri().path(), "Signed-in user sent away from a guest page");
        return redirect_home();
    }
    next.run(req).await
}
