use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::auth::errors::AuthError;
use crate::auth::pkce::verify_code_challenge;
use crate::auth::types::{Credentials, ProviderSession, ProviderUser, UserMetadata};
use crate::utils::{base64url_encode, gen_random_string};

use super::AuthProvider;

const SESSION_EXPIRES_IN: u64 = 3600;
const AUTH_CODE_EXPIRES_IN: u64 = 300;

/// The account every in-memory OAuth sign-in resolves to
pub(crate) const MEMORY_OAUTH_EMAIL: &str = "oauth.user@example.com";
const MEMORY_OAUTH_NAME: &str = "OAuth User";

struct MemoryAccount {
    user: ProviderUser,
    password_hash: Option<String>,
}

struct MemoryState {
    // keyed by email
    accounts: HashMap<String, MemoryAccount>,
    // access token -> (user id, expiry)
    sessions: HashMap<String, (String, Instant)>,
    // auth code -> (code challenge, expiry)
    pending_codes: HashMap<String, (String, Instant)>,
    session_ttl: Duration,
    code_ttl: Duration,
}

impl MemoryState {
    fn new(session_ttl: Duration, code_ttl: Duration) -> Self {
        Self {
            accounts: HashMap::new(),
            sessions: HashMap::new(),
            pending_codes: HashMap::new(),
            session_ttl,
            code_ttl,
        }
    }

    fn evict_expired(&mut self, now: Instant) {
        self.sessions.retain(|_, (_, expires_at)| *expires_at > now);
        self.pending_codes.retain(|_, (_, expires_at)| *expires_at > now);
    }

    fn add_pending_code(&mut self, code: String, code_challenge: String) {
        let now = Instant::now();
        self.evict_expired(now);
        self.pending_codes
            .insert(code, (code_challenge, now + self.code_ttl));
    }

    fn take_pending_code(&mut self, code: &str) -> Option<String> {
        self.pending_codes
            .remove(code)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(challenge, _)| challenge)
    }

    fn session_user_id(&self, access_token: &str) -> Option<&str> {
        self.sessions
            .get(access_token)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(user_id, _)| user_id.as_str())
    }

    fn user_by_id(&self, user_id: &str) -> Option<&ProviderUser> {
        self.accounts
            .values()
            .map(|account| &account.user)
            .find(|user| user.id == user_id)
    }

    fn issue_session(&mut self, user: ProviderUser) -> Result<ProviderSession, AuthError> {
        let access_token = gen_random_string(32)?;
        let now = Instant::now();
        self.evict_expired(now);
        self.sessions
            .insert(access_token.clone(), (user.id.clone(), now + self.session_ttl));
        Ok(ProviderSession {
            access_token,
            refresh_token: None,
            expires_in: self.session_ttl.as_secs(),
            user,
        })
    }
}

/// Auth provider kept entirely in process memory, for development and tests
pub(crate) struct InMemoryAuthProvider {
    state: Mutex<MemoryState>,
}

impl InMemoryAuthProvider {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory auth provider");
        Self::with_ttls(
            Duration::from_secs(SESSION_EXPIRES_IN),
            Duration::from_secs(AUTH_CODE_EXPIRES_IN),
        )
    }

    fn with_ttls(session_ttl: Duration, code_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(MemoryState::new(session_ttl, code_ttl)),
        }
    }
}

fn hash_password(password: &str) -> String {
    base64url_encode(&Sha256::digest(password.as_bytes()))
}

fn new_user(email: &str, user_metadata: UserMetadata) -> Result<ProviderUser, AuthError> {
    Ok(ProviderUser {
        id: format!("mem-{}", gen_random_string(12)?),
        email: Some(email.to_string()),
        user_metadata,
    })
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(&self, credentials: &Credentials) -> Result<ProviderUser, AuthError> {
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&credentials.email) {
            return Err(AuthError::provider(
                "user_already_exists",
                "User already registered",
            ));
        }

        let user = new_user(&credentials.email, UserMetadata::default())?;
        state.accounts.insert(
            credentials.email.clone(),
            MemoryAccount {
                user: user.clone(),
                password_hash: Some(hash_password(&credentials.password)),
            },
        );
        Ok(user)
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<ProviderSession, AuthError> {
        let mut state = self.state.lock().await;
        let password_hash = hash_password(&credentials.password);

        let user = match state.accounts.get(&credentials.email) {
            Some(account) if account.password_hash.as_deref() == Some(password_hash.as_str()) => {
                account.user.clone()
            }
            _ => {
                return Err(AuthError::provider(
                    "invalid_credentials",
                    "Invalid login credentials",
                ));
            }
        };

        state.issue_session(user)
    }

    async fn oauth_authorize_url(
        &self,
        _provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<String, AuthError> {
        let code = gen_random_string(16)?;
        self.state
            .lock()
            .await
            .add_pending_code(code.clone(), code_challenge.to_string());

        // Skip the consent screen and go straight back with a code
        let url = url::Url::parse_with_params(redirect_to, &[("code", code.as_str())])
            .map_err(|e| AuthError::InvalidResponse(format!("Invalid redirect URL: {e}")))?;
        Ok(url.into())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<ProviderSession, AuthError> {
        let mut state = self.state.lock().await;

        let challenge = state.take_pending_code(auth_code).ok_or_else(|| {
            AuthError::provider("flow_state_not_found", "No valid flow state found")
        })?;
        if !verify_code_challenge(code_verifier, &challenge) {
            return Err(AuthError::provider(
                "bad_code_verifier",
                "Code challenge does not match previously saved code verifier",
            ));
        }

        let user = match state.accounts.get(MEMORY_OAUTH_EMAIL) {
            Some(account) => account.user.clone(),
            None => {
                let user = new_user(
                    MEMORY_OAUTH_EMAIL,
                    UserMetadata {
                        name: Some(MEMORY_OAUTH_NAME.to_string()),
                        avatar_url: None,
                    },
                )?;
                state.accounts.insert(
                    MEMORY_OAUTH_EMAIL.to_string(),
                    MemoryAccount {
                        user: user.clone(),
                        password_hash: None,
                    },
                );
                user
            }
        };

        state.issue_session(user)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.state.lock().await.sessions.remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<ProviderUser>, AuthError> {
        let state = self.state.lock().await;
        Ok(state
            .session_user_id(access_token)
            .and_then(|user_id| state.user_by_id(user_id))
            .cloned())
    }
}
