//! Calls into the configured auth provider. Successful state changes are
//! published on the auth event channel.

use super::config::GENERIC_AUTH_PROVIDER;
use super::errors::AuthError;
use super::events::publish;
use super::types::{AuthEvent, Credentials, ProviderSession, ProviderUser};

pub(crate) async fn sign_up(credentials: &Credentials) -> Result<ProviderUser, AuthError> {
    let user = GENERIC_AUTH_PROVIDER.sign_up(credentials).await?;
    tracing::info!(user_id = %user.id, "User signed up");
    publish(AuthEvent::SignedUp {
        user_id: user.id.clone(),
    });
    Ok(user)
}

pub(crate) async fn sign_in_with_password(
    credentials: &Credentials,
) -> Result<ProviderSession, AuthError> {
    let session = GENERIC_AUTH_PROVIDER
        .sign_in_with_password(credentials)
        .await?;
    tracing::info!(user_id = %session.user.id, "User signed in with password");
    publish(AuthEvent::SignedIn {
        user_id: session.user.id.clone(),
    });
    Ok(session)
}

pub(crate) async fn oauth_authorize_url(
    provider: &str,
    redirect_to: &str,
    code_challenge: &str,
) -> Result<String, AuthError> {
    GENERIC_AUTH_PROVIDER
        .oauth_authorize_url(provider, redirect_to, code_challenge)
        .await
}

pub(crate) async fn exchange_code_for_session(
    auth_code: &str,
    code_verifier: &str,
) -> Result<ProviderSession, AuthError> {
    let session = GENERIC_AUTH_PROVIDER
        .exchange_code_for_session(auth_code, code_verifier)
        .await?;
    tracing::info!(user_id = %session.user.id, "User signed in with OAuth");
    publish(AuthEvent::SignedIn {
        user_id: session.user.id.clone(),
    });
    Ok(session)
}

pub(crate) async fn sign_out(access_token: &str) -> Result<(), AuthError> {
    GENERIC_AUTH_PROVIDER.sign_out(access_token).await?;
    publish(AuthEvent::SignedOut);
    Ok(())
}

pub(crate) async fn get_user(access_token: &str) -> Result<Option<ProviderUser>, AuthError> {
    GENERIC_AUTH_PROVIDER.get_user(access_token).await
}
