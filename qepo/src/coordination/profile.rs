use serde::Deserialize;

use crate::profile::{ProfileError, ProfileProjection, ProfileUpdate, get_profile, update_profile};
use crate::validation::{FieldErrors, validate_bio, validate_username};

use super::errors::CoordinationError;
use super::types::{FormFailure, Notification};

const MSG_USERNAME_TAKEN: &str = "Username sudah digunakan";
const MSG_UPDATE_FAILED: &str = "Gagal update profile";

/// Body of the edit-profile form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl EditProfileForm {
    /// Form prefilled from the stored profile
    pub fn from_profile(profile: &ProfileProjection) -> Self {
        Self {
            username: profile.username.clone().unwrap_or_default(),
            bio: profile.bio.clone().unwrap_or_default(),
            csrf_token: String::new(),
        }
    }

    /// Whether the form differs from what is stored
    pub fn is_dirty(&self, current: &ProfileProjection) -> bool {
        self.username.trim() != current.username.as_deref().unwrap_or_default()
            || self.bio != current.bio.as_deref().unwrap_or_default()
    }

    /// Validate the form and keep only the fields that actually changed.
    ///
    /// Clearing the username does not unset it.
    pub fn changes(&self, current: &ProfileProjection) -> Result<ProfileUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();
        let username = errors.record("username", validate_username(&self.username));
        let bio = errors.record("bio", validate_bio(&self.bio));
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut update = ProfileUpdate::default();
        if let Some(Some(username)) = username {
            if current.username.as_deref() != Some(username.as_str()) {
                update.username = Some(username);
            }
        }
        if let Some(bio) = bio {
            if current.bio.as_deref().unwrap_or_default() != bio {
                update.bio = Some(bio);
            }
        }
        Ok(update)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileFormOutcome {
    /// Nothing to save
    Unchanged,
    Updated(Notification),
    Rejected(FormFailure),
}

fn update_failure(err: &ProfileError) -> FormFailure {
    let mut errors = FieldErrors::new();
    if matches!(err, ProfileError::UsernameTaken) {
        errors.set("username", MSG_USERNAME_TAKEN);
    }
    FormFailure {
        errors,
        notification: Some(Notification::error(MSG_UPDATE_FAILED)),
    }
}

/// Save the edit-profile form for `user_id`
#[tracing::instrument(skip(form))]
pub async fn submit_profile_form(user_id: &str, form: &EditProfileForm) -> ProfileFormOutcome {
    let current = match get_profile(user_id).await {
        Ok(profile) => profile.unwrap_or_default(),
        Err(e) => {
            tracing::error!(error = %e, "Profile lookup failed");
            return ProfileFormOutcome::Rejected(FormFailure::notify(Notification::error(
                MSG_UPDATE_FAILED,
            )));
        }
    };

    let update = match form.changes(&current) {
        Ok(update) => update,
        Err(errors) => return ProfileFormOutcome::Rejected(FormFailure::fields(errors)),
    };
    if update.is_empty() {
        return ProfileFormOutcome::Unchanged;
    }

    match update_profile(user_id, update).await {
        Ok(_) => ProfileFormOutcome::Updated(Notification::success("Berhasil update profile")),
        Err(e) => {
            tracing::info!(error = %e, "Profile update rejected");
            ProfileFormOutcome::Rejected(update_failure(&e))
        }
    }
}

/// Validate a JSON update before applying it. Unlike the form, every
/// supplied field is written.
pub async fn update_profile_checked(
    user_id: &str,
    update: ProfileUpdate,
) -> Result<ProfileProjection, CoordinationError> {
    let mut errors = FieldErrors::new();
    let username = match update.username.as_deref() {
        Some(username) => errors.record("username", validate_username(username)).flatten(),
        None => None,
    };
    let bio = match update.bio.as_deref() {
        Some(bio) => errors.record("bio", validate_bio(bio)),
        None => None,
    };
    if !errors.is_empty() {
        return Err(CoordinationError::Validation(errors));
    }

    Ok(update_profile(user_id, ProfileUpdate { username, bio }).await?)
}

/// Avatar fallback: the first letter of each word, uppercased
pub fn initials(username: &str) -> String {
    username
        .split(' ')
        .filter_map(|word| word.chars().next())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::create_profile;
    use crate::session::User as SessionUser;
    use crate::test_utils::{init_test_environment, unique_id};
    use serial_test::serial;

    fn projection(username: Option<&str>, bio: Option<&str>) -> ProfileProjection {
        ProfileProjection {
            bio: bio.map(str::to_string),
            profile_picture_url: None,
            username: username.map(str::to_string),
        }
    }

    fn form(username: &str, bio: &str) -> EditProfileForm {
        EditProfileForm {
            username: username.to_string(),
            bio: bio.to_string(),
            csrf_token: String::new(),
        }
    }

    async fn seed_profile(prefix: &str) -> String {
        let user_id = unique_id(prefix);
        create_profile(&SessionUser {
            id: user_id.clone(),
            email: format!("{user_id}@example.com"),
            name: None,
            avatar_url: None,
        })
        .await
        .unwrap();
        user_id
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("budi santoso"), "BS");
        assert_eq!(initials("ani"), "A");
        assert_eq!(initials("a  b"), "AB");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn test_form_prefill_is_clean() {
        let current = projection(Some("budi"), None);
        let form = EditProfileForm::from_profile(&current);
        assert_eq!(form.username, "budi");
        assert_eq!(form.bio, "");
        assert!(!form.is_dirty(&current));
        assert!(form.changes(&current).unwrap().is_empty());
    }

    #[test]
    fn test_changes_keep_only_modified_fields() {
        let current = projection(Some("budi"), Some("old"));

        let update = form("budi", "new").changes(&current).unwrap();
        assert_eq!(update.username, None);
        assert_eq!(update.bio.as_deref(), Some("new"));

        let update = form("  andi ", "old").changes(&current).unwrap();
        assert_eq!(update.username.as_deref(), Some("andi"));
        assert_eq!(update.bio, None);

        // Clearing the username is a no-op
        let cleared = form("", "old");
        assert!(cleared.is_dirty(&current));
        assert!(cleared.changes(&current).unwrap().is_empty());
    }

    #[test]
    fn test_changes_report_field_errors() {
        let errors = form("ab", &"x".repeat(301))
            .changes(&ProfileProjection::default())
            .unwrap_err();
        assert!(errors.contains("username"));
        assert!(errors.contains("bio"));
    }

    #[tokio::test]
    #[serial]
    async fn test_submit_unchanged_and_updated() {
        init_test_environment().await;
        let user_id = seed_profile("form-user").await;
        let current = get_profile(&user_id).await.unwrap().unwrap();

        let unchanged = EditProfileForm::from_profile(&current);
        assert_eq!(
            submit_profile_form(&user_id, &unchanged).await,
            ProfileFormOutcome::Unchanged
        );

        let username = unique_id("nama");
        let outcome = submit_profile_form(&user_id, &form(&username, "halo")).await;
        assert_eq!(
            outcome,
            ProfileFormOutcome::Updated(Notification::success("Berhasil update profile"))
        );

        let stored = get_profile(&user_id).await.unwrap().unwrap();
        assert_eq!(stored.username, Some(username));
        assert_eq!(stored.bio.as_deref(), Some("halo"));
    }

    #[tokio::test]
    #[serial]
    async fn test_submit_taken_username() {
        init_test_environment().await;
        let first = seed_profile("first").await;
        let second = seed_profile("second").await;

        let username = unique_id("rebut");
        submit_profile_form(&first, &form(&username, "")).await;

        let outcome = submit_profile_form(&second, &form(&username, "")).await;
        let ProfileFormOutcome::Rejected(failure) = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert_eq!(failure.errors.get("username"), Some(MSG_USERNAME_TAKEN));
        assert_eq!(failure.notification, Some(Notification::error(MSG_UPDATE_FAILED)));
    }

    #[tokio::test]
    #[serial]
    async fn test_checked_update_validates_supplied_fields() {
        init_test_environment().await;
        let user_id = seed_profile("api-user").await;

        let err = update_profile_checked(
            &user_id,
            ProfileUpdate {
                username: Some("x".to_string()),
                bio: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoordinationError::Validation(ref e) if e.contains("username")));

        let updated = update_profile_checked(
            &user_id,
            ProfileUpdate {
                username: None,
                bio: Some("dari api".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("dari api"));
    }
}
