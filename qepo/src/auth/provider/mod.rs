mod hosted;
mod memory;

use async_trait::async_trait;

use super::errors::AuthError;
use super::types::{Credentials, ProviderSession, ProviderUser};

pub(crate) use hosted::HostedAuthProvider;
pub(crate) use memory::InMemoryAuthProvider;
#[cfg(test)]
pub(crate) use memory::MEMORY_OAUTH_EMAIL;

/// Request/response contract of the hosted authentication service.
#[async_trait]
pub(crate) trait AuthProvider: Send + Sync + 'static {
    async fn sign_up(&self, credentials: &Credentials) -> Result<ProviderUser, AuthError>;

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<ProviderSession, AuthError>;

    /// URL the browser is sent to for OAuth sign-in. The provider comes back
    /// to `redirect_to` with a `code` query parameter.
    async fn oauth_authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthError>;

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// `None` when the token is not (or no longer) accepted.
    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, AuthError>;
}
