//! Router-level test helpers.
//!
//! Tests drive the real router with `tower::ServiceExt::oneshot` against a
//! temporary SQLite file and the in-memory auth provider and object store.

use axum::{Router, body::Body, response::Response};
use http::{Request, header};
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

pub(crate) const TEST_PASSWORD: &str = "Abcdef1!";

fn set_default_env(key: &str, value: &str) {
    if std::env::var_os(key).is_none() {
        // Runs inside `Once`, before any configuration static is read
        unsafe { std::env::set_var(key, value) };
    }
}

pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        dotenvy::from_filename(".env_test").ok();

        let db_path =
            std::env::temp_dir().join(format!("qepo-axum-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&db_path);

        set_default_env("GENERIC_DATA_STORE_TYPE", "sqlite");
        set_default_env(
            "GENERIC_DATA_STORE_URL",
            &format!("sqlite:{}", db_path.display()),
        );
        set_default_env("AUTH_PROVIDER_TYPE", "memory");
        set_default_env("OBJECT_STORE_TYPE", "memory");
    });

    if let Err(e) = crate::init().await {
        eprintln!("Warning: test initialization failed: {e}");
    }
}

/// An address nobody else in the test run uses
pub(crate) fn unique_email(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{}x{n}@example.com", std::process::id())
}

pub(crate) async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub(crate) async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8_lossy(&bytes).into_owned()
}

pub(crate) fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// `Cookie` header value a browser would send after `response`
pub(crate) fn cookies_from(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|cookie| !cookie.contains("Max-Age=-"))
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

pub(crate) fn form_post(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("valid request")
}

pub(crate) fn json_request(
    method: http::Method,
    uri: &str,
    cookie: &str,
    csrf_token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = csrf_token {
        builder = builder.header("X-CSRF-Token", token);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Register and log in a fresh account. Returns the session cookie.
pub(crate) async fn signed_in(app: &Router, email: &str) -> String {
    let register = send(
        app,
        form_post(
            "/register",
            None,
            &[("email", email), ("password", TEST_PASSWORD)],
        ),
    )
    .await;
    assert_eq!(register.status(), http::StatusCode::OK);

    let login = send(
        app,
        form_post(
            "/login",
            None,
            &[("email", email), ("password", TEST_PASSWORD)],
        ),
    )
    .await;
    assert_eq!(login.status(), http::StatusCode::SEE_OTHER);
    cookies_from(&login)
        .split("; ")
        .filter(|pair| !pair.starts_with("qepo_flash="))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The session's CSRF token, as echoed by a guarded route
pub(crate) async fn csrf_token(app: &Router, cookie: &str) -> String {
    let response = send(app, get("/api/profile", Some(cookie))).await;
    response
        .headers()
        .get("X-CSRF-Token")
        .and_then(|v| v.to_str().ok())
        .expect("guarded responses carry the CSRF token")
        .to_string()
}
