use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A user's profile row. `user_id` is the auth provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        user_id: String,
        email: String,
        username: Option<String>,
        profile_picture_url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            username,
            bio: None,
            profile_picture_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn projection(&self) -> ProfileProjection {
        ProfileProjection {
            bio: self.bio.clone(),
            profile_picture_url: self.profile_picture_url.clone(),
            username: self.username.clone(),
        }
    }
}

/// What pages and the JSON API get to see of a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileProjection {
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub username: Option<String>,
}

/// Fields to change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.bio.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ProfileSearchField {
    UserId(String),
    Username(String),
}

impl fmt::Display for ProfileSearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserId(id) => write!(f, "UserId({id})"),
            Self::Username(name) => write!(f, "Username({name})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_has_no_bio_and_equal_timestamps() {
        let profile = Profile::new(
            "u1".to_string(),
            "a@b.com".to_string(),
            Some("budi".to_string()),
            None,
        );

        assert_eq!(profile.bio, None);
        assert_eq!(profile.created_at, profile.updated_at);
        assert_eq!(
            profile.projection(),
            ProfileProjection {
                bio: None,
                profile_picture_url: None,
                username: Some("budi".to_string()),
            }
        );
    }

    #[test]
    fn test_profile_update_serde_omits_missing_fields() {
        let update: ProfileUpdate = serde_json::from_str(r#"{"bio":"hi"}"#).unwrap();
        assert_eq!(update.username, None);
        assert_eq!(update.bio.as_deref(), Some("hi"));
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());

        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"bio":"hi"}"#);
    }
}
