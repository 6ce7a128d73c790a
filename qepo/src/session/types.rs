use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::ProviderUser;
use crate::session::errors::SessionError;
use crate::storage::CacheData;

/// The signed-in user as seen by pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProviderUser> for User {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            name: user.user_metadata.name,
            avatar_url: user.user_metadata.avatar_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub(crate) access_token: String,
    pub(crate) csrf_token: String,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) ttl: u64,
}

impl TryFrom<StoredSession> for CacheData {
    type Error = SessionError;

    fn try_from(data: StoredSession) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(&data)
                .map_err(|e| SessionError::Storage(e.to_string()))?,
        })
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}
