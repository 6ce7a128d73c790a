mod client;
mod config;
mod errors;
mod events;
mod pkce;
mod provider;
mod types;

pub(crate) use client::{
    exchange_code_for_session, get_user, oauth_authorize_url, sign_in_with_password, sign_out,
    sign_up,
};
pub(crate) use pkce::{start_pkce, take_pkce_verifier};

pub use config::AUTH_OAUTH_PROVIDER;
pub use errors::{AuthError, AuthErrorCode};
pub use events::subscribe_auth_events;
pub use types::{AuthEvent, Credentials, ProviderSession, ProviderUser, UserMetadata};

#[cfg(test)]
pub(crate) use provider::MEMORY_OAUTH_EMAIL;

pub(crate) async fn init() -> Result<(), AuthError> {
    let _ = *config::GENERIC_AUTH_PROVIDER;
    Ok(())
}
