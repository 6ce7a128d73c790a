use askama::Template;
use axum::{
    extract::{Form, Query},
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use qepo::{
    AuthForm, FieldErrors, Notification, QEPO_LOGIN_URL, callback_core, login_core, logout_core,
    register_core, start_oauth_core,
};

use crate::error::IntoResponseError;
use crate::flash::{Toast, redirect_with, redirect_with_notification, take_flash};

#[derive(Template)]
#[template(path = "auth_form.html")]
struct AuthFormTemplate<'a> {
    logged_in: bool,
    toasts: Vec<Toast>,
    heading: &'a str,
    action: &'a str,
    email: &'a str,
    email_error: Option<&'a str>,
    password_error: Option<&'a str>,
    password_autocomplete: &'a str,
    switch_prompt: &'a str,
    switch_href: &'a str,
    switch_label: &'a str,
}

#[derive(Clone, Copy)]
enum AuthPage {
    Login,
    Register,
}

fn render_auth_page(
    page: AuthPage,
    email: &str,
    errors: &FieldErrors,
    notifications: Vec<Notification>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let (heading, action, password_autocomplete, switch_prompt, switch_href, switch_label) =
        match page {
            AuthPage::Login => (
                "Login",
                "/login",
                "current-password",
                "Belum punya akun?",
                "/register",
                "Register",
            ),
            AuthPage::Register => (
                "Register",
                "/register",
                "new-password",
                "Sudah punya akun?",
                "/login",
                "Login",
            ),
        };

    let template = AuthFormTemplate {
        logged_in: false,
        toasts: notifications.into_iter().map(Toast::from).collect(),
        heading,
        action,
        email,
        email_error: errors.get("email"),
        password_error: errors.get("password"),
        password_autocomplete,
        switch_prompt,
        switch_href,
        switch_label,
    };
    super::render_page(&template, headers)
}

pub(super) async fn login_page(headers: HeaderMap) -> Result<Response, (StatusCode, String)> {
    let (notifications, clear_flash) = take_flash(&headers);
    render_auth_page(
        AuthPage::Login,
        "",
        &FieldErrors::new(),
        notifications,
        clear_flash,
    )
}

/// A failed login re-renders the page in place
pub(super) async fn login_submit(
    Form(form): Form<AuthForm>,
) -> Result<Response, (StatusCode, String)> {
    match login_core(&form).await {
        Ok(outcome) => Ok(redirect_with(outcome)),
        Err(failure) => render_auth_page(
            AuthPage::Login,
            &form.email,
            &failure.errors,
            failure.notification.into_iter().collect(),
            HeaderMap::new(),
        ),
    }
}

pub(super) async fn register_page(headers: HeaderMap) -> Result<Response, (StatusCode, String)> {
    let (notifications, clear_flash) = take_flash(&headers);
    render_auth_page(
        AuthPage::Register,
        "",
        &FieldErrors::new(),
        notifications,
        clear_flash,
    )
}

/// On success the form comes back empty with a success toast
pub(super) async fn register_submit(
    Form(form): Form<AuthForm>,
) -> Result<Response, (StatusCode, String)> {
    match register_core(&form).await {
        Ok(notification) => render_auth_page(
            AuthPage::Register,
            "",
            &FieldErrors::new(),
            vec![notification],
            HeaderMap::new(),
        ),
        Err(failure) => render_auth_page(
            AuthPage::Register,
            &form.email,
            &failure.errors,
            failure.notification.into_iter().collect(),
            HeaderMap::new(),
        ),
    }
}

/// Send the browser to the provider's OAuth consent page
pub(super) async fn oauth_start() -> Response {
    match start_oauth_core().await {
        Ok((url, headers)) => (headers, Redirect::to(&url)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Could not start OAuth sign-in");
            redirect_with_notification(
                QEPO_LOGIN_URL.as_str(),
                Notification::error("Kesalahan tidak terduga"),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

pub(super) async fn callback(
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = &query.error {
        tracing::warn!(
            error = %error,
            description = query.error_description.as_deref().unwrap_or_default(),
            "Provider returned an error to the callback"
        );
    }
    redirect_with(callback_core(&headers, query.code.as_deref()).await)
}

pub(super) async fn logout(headers: HeaderMap) -> Result<Response, (StatusCode, String)> {
    logout_core(&headers)
        .await
        .into_response_error()
        .map(redirect_with)
}
