use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;

use crate::session::User as SessionUser;
use crate::storage::{GENERIC_OBJECT_STORE, ObjectStore};

use super::config::{AVATAR_BUCKET, AVATAR_CONTENT_TYPE, AVATAR_MAX_BYTES, avatar_key};
use super::errors::ProfileError;
use super::storage::ProfileStore;
use super::types::{Profile, ProfileProjection, ProfileSearchField, ProfileUpdate};

/// The profile of `user_id`, if one has been created.
pub async fn get_profile(user_id: &str) -> Result<Option<ProfileProjection>, ProfileError> {
    Ok(ProfileStore::get_profile_by(ProfileSearchField::UserId(user_id.to_string()))
        .await?
        .map(|profile| profile.projection()))
}

async fn username_owner(username: &str) -> Result<Option<String>, ProfileError> {
    Ok(
        ProfileStore::get_profile_by(ProfileSearchField::Username(username.to_string()))
            .await?
            .map(|profile| profile.user_id),
    )
}

/// Create the user's profile from provider metadata unless it already exists.
///
/// An existing profile is returned untouched. A display name already used
/// as someone else's username is dropped rather than failing the creation.
#[tracing::instrument(skip(user), fields(user_id = %user.id))]
pub async fn create_profile(user: &SessionUser) -> Result<ProfileProjection, ProfileError> {
    if let Some(existing) =
        ProfileStore::get_profile_by(ProfileSearchField::UserId(user.id.clone())).await?
    {
        tracing::debug!("Profile already exists");
        return Ok(existing.projection());
    }

    let mut username = user.name.clone();
    if let Some(name) = &username {
        if username_owner(name).await?.is_some_and(|owner| owner != user.id) {
            tracing::warn!(username = %name, "Seeded username already claimed, leaving it unset");
            username = None;
        }
    }

    let profile = Profile::new(
        user.id.clone(),
        user.email.clone(),
        username,
        user.avatar_url.clone(),
    );

    let stored = match ProfileStore::insert_profile(&profile).await {
        Err(ProfileError::UsernameTaken) if profile.username.is_some() => {
            tracing::warn!("Seeded username claimed concurrently, leaving it unset");
            ProfileStore::insert_profile(&Profile {
                username: None,
                ..profile
            })
            .await?
        }
        result => result?,
    };

    tracing::info!("Profile created");
    Ok(stored.projection())
}

/// Apply the supplied fields to the user's profile.
#[tracing::instrument(skip(update))]
pub async fn update_profile(
    user_id: &str,
    update: ProfileUpdate,
) -> Result<ProfileProjection, ProfileError> {
    if let Some(username) = &update.username {
        if username_owner(username)
            .await?
            .is_some_and(|owner| owner != user_id)
        {
            return Err(ProfileError::UsernameTaken);
        }
    }

    // The UNIQUE constraint backs up the check above when two users race
    if !ProfileStore::update_fields(user_id, &update).await? {
        return Err(ProfileError::NotFound);
    }

    get_profile(user_id).await?.ok_or(ProfileError::NotFound)
}

fn cache_bust_millis(previous_url: Option<&str>, now_millis: i64) -> i64 {
    let previous = previous_url
        .and_then(|url| url.split_once('?'))
        .and_then(|(_, query)| query.split('&').find_map(|kv| kv.strip_prefix("t=")))
        .and_then(|t| t.parse::<i64>().ok());

    match previous {
        Some(t) if t >= now_millis => t + 1,
        _ => now_millis,
    }
}

/// Upload `image` as the user's avatar and point the profile at it.
///
/// The object is overwritten in place, so the stored URL carries a `t`
/// query parameter that grows with every upload. Returns the new URL.
#[tracing::instrument(skip(image), fields(size = image.len()))]
pub async fn update_profile_picture(user_id: &str, image: Vec<u8>) -> Result<String, ProfileError> {
    store_profile_picture(&**GENERIC_OBJECT_STORE, user_id, image).await
}

/// Nothing is written to the profile unless the bucket accepted the image
async fn store_profile_picture(
    objects: &dyn ObjectStore,
    user_id: &str,
    image: Vec<u8>,
) -> Result<String, ProfileError> {
    if image.is_empty() {
        return Err(ProfileError::InvalidImage("Image is empty".to_string()));
    }
    if image.len() > *AVATAR_MAX_BYTES {
        return Err(ProfileError::InvalidImage(format!(
            "Image is larger than {} bytes",
            *AVATAR_MAX_BYTES
        )));
    }

    let current = ProfileStore::get_profile_by(ProfileSearchField::UserId(user_id.to_string()))
        .await?
        .ok_or(ProfileError::NotFound)?;

    let key = avatar_key(user_id);
    objects
        .upload(&AVATAR_BUCKET, &key, image, AVATAR_CONTENT_TYPE, true)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Avatar upload failed");
            ProfileError::from(e)
        })?;

    let t = cache_bust_millis(
        current.profile_picture_url.as_deref(),
        Utc::now().timestamp_millis(),
    );
    let url = format!("{}?t={t}", objects.public_url(&AVATAR_BUCKET, &key));

    if !ProfileStore::set_picture_url(user_id, &url).await? {
        return Err(ProfileError::NotFound);
    }

    tracing::info!(url = %url, "Profile picture updated");
    Ok(url)
}

/// Base64 variant used by the JSON API. `None` changes nothing.
pub async fn update_profile_picture_base64(
    user_id: &str,
    image: Option<&str>,
) -> Result<Option<String>, ProfileError> {
    let Some(encoded) = image else {
        return Ok(None);
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProfileError::InvalidImage(format!("Invalid base64: {e}")))?;

    update_profile_picture(user_id, bytes).await.map(Some)
}
