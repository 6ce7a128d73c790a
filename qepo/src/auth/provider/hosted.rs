use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::auth::errors::AuthError;
use crate::auth::types::{Credentials, ProviderSession, ProviderUser};
use crate::utils::get_client;

use super::AuthProvider;

/// GoTrue-compatible REST client
pub(crate) struct HostedAuthProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HostedAuthProvider {
    pub(crate) fn new(base_url: &str, api_key: &str) -> Self {
        tracing::info!(base_url, "Creating hosted auth provider client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: get_client(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.base_url)
    }

    async fn post_for_session(&self, path: &str, body: Value) -> Result<ProviderSession, AuthError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }
}

async fn error_from_response(response: reqwest::Response) -> AuthError {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => provider_error_from_body(status, &body),
        Err(_) => AuthError::InvalidResponse(format!("Unexpected status {status}")),
    }
}

/// Error bodies come as `{error_code|code|error, msg|message|error_description}`.
fn provider_error_from_body(status: StatusCode, body: &Value) -> AuthError {
    let field = |key: &str| body.get(key).and_then(Value::as_str);

    let message = field("msg")
        .or_else(|| field("message"))
        .or_else(|| field("error_description"))
        .or_else(|| field("error"))
        .unwrap_or("Unknown auth provider error");

    let code = field("error_code")
        .or_else(|| field("code"))
        .or_else(|| match field("error") {
            // Older servers report password failures as a generic grant error
            Some("invalid_grant") if message.contains("Invalid login credentials") => {
                Some("invalid_credentials")
            }
            Some("invalid_grant") if message.contains("Email not confirmed") => {
                Some("email_not_confirmed")
            }
            other => other,
        })
        .unwrap_or("unexpected_failure");

    tracing::debug!(%status, code, message, "Auth provider rejected request");
    AuthError::provider(code, message)
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    #[tracing::instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_up(&self, credentials: &Credentials) -> Result<ProviderUser, AuthError> {
        let response = self
            .client
            .post(self.endpoint("/signup"))
            .header("apikey", &self.api_key)
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        // With auto-confirm the body is a session, otherwise the bare user
        let mut body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        let user = if body.get("user").is_some() {
            body["user"].take()
        } else {
            body
        };

        serde_json::from_value(user).map_err(|e| AuthError::InvalidResponse(e.to_string()))
    }

    #[tracing::instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<ProviderSession, AuthError> {
        self.post_for_session(
            "/token?grant_type=password",
            json!({ "email": credentials.email, "password": credentials.password }),
        )
        .await
    }

    async fn oauth_authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthError> {
        let url = url::Url::parse_with_params(
            &self.endpoint("/authorize"),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )
        .map_err(|e| AuthError::InvalidResponse(format!("Invalid authorize URL: {e}")))?;

        Ok(url.into())
    }

    #[tracing::instrument(skip_all)]
    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, AuthError> {
        self.post_for_session(
            "/token?grant_type=pkce",
            json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // The token is already gone on the provider side
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(error_from_response(response).await),
        }
    }

    #[tracing::instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, AuthError> {
        let response = self
            .client
            .get(self.endpoint("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => response
                .json::<ProviderUser>()
                .await
                .map(Some)
                .map_err(|e| AuthError::InvalidResponse(e.to_string())),
            _ => Err(error_from_response(response).await),
        }
    }
}
