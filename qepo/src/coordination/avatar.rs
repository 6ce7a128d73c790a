//! Avatar editor: `Idle -> Selected -> (save -> Idle | remove -> Idle)`.
//!
//! The pending image lives in the cache store under the session id, so it
//! survives the redirects between selecting and saving but never reaches
//! the object store before it is saved.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::profile::{AVATAR_MAX_BYTES, ProfileError, update_profile_picture};
use crate::session::SESSION_COOKIE_MAX_AGE;
use crate::storage::{CacheData, GENERIC_CACHE_STORE, StorageError};

use super::errors::CoordinationError;
use super::types::Notification;

const AVATAR_SELECTION_PREFIX: &str = "avatar_selection";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl SelectedImage {
    /// Inline preview for an `<img src>`
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarState {
    Idle,
    Selected(SelectedImage),
}

#[derive(Serialize, Deserialize)]
struct StoredSelection {
    content_type: String,
    data: String,
}

pub async fn get_avatar_state(session_id: &str) -> Result<AvatarState, CoordinationError> {
    let Some(cached) = GENERIC_CACHE_STORE
        .lock()
        .await
        .get(AVATAR_SELECTION_PREFIX, session_id)
        .await?
    else {
        return Ok(AvatarState::Idle);
    };

    let stored: StoredSelection = serde_json::from_str(&cached.value).map_err(StorageError::from)?;
    let bytes = STANDARD
        .decode(stored.data)
        .map_err(|e| StorageError::Serde(e.to_string()))?;

    Ok(AvatarState::Selected(SelectedImage {
        bytes,
        content_type: stored.content_type,
    }))
}

/// Hold `bytes` as the pending avatar, replacing any earlier selection
pub async fn select_avatar(
    session_id: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<(), CoordinationError> {
    if bytes.is_empty() {
        return Err(ProfileError::InvalidImage("No image selected".to_string()).into());
    }
    if !content_type.starts_with("image/") {
        return Err(ProfileError::InvalidImage(format!("Not an image: {content_type}")).into());
    }
    if bytes.len() > *AVATAR_MAX_BYTES {
        return Err(ProfileError::InvalidImage(format!(
            "Image is larger than {} bytes",
            *AVATAR_MAX_BYTES
        ))
        .into());
    }

    let stored = StoredSelection {
        content_type: content_type.to_string(),
        data: STANDARD.encode(&bytes),
    };
    let value = serde_json::to_string(&stored).map_err(StorageError::from)?;

    GENERIC_CACHE_STORE
        .lock()
        .await
        .put_with_ttl(
            AVATAR_SELECTION_PREFIX,
            session_id,
            CacheData { value },
            *SESSION_COOKIE_MAX_AGE as usize,
        )
        .await?;

    tracing::debug!(size = bytes.len(), content_type, "Avatar selected");
    Ok(())
}

/// Drop the pending avatar, if any
pub async fn remove_selected_avatar(session_id: &str) -> Result<(), CoordinationError> {
    GENERIC_CACHE_STORE
        .lock()
        .await
        .remove(AVATAR_SELECTION_PREFIX, session_id)
        .await?;
    Ok(())
}

/// Upload the pending avatar. On failure the selection is kept so the user
/// can retry. `None` when nothing was selected.
pub async fn save_selected_avatar(
    session_id: &str,
    user_id: &str,
) -> Result<Option<Notification>, CoordinationError> {
    let AvatarState::Selected(image) = get_avatar_state(session_id).await? else {
        return Ok(None);
    };

    match update_profile_picture(user_id, image.bytes).await {
        Ok(_) => {
            remove_selected_avatar(session_id).await?;
            Ok(Some(Notification::success("Berhasil mengubah foto profil")))
        }
        Err(e) => {
            tracing::error!(error = %e, user_id, "Saving avatar failed");
            Ok(Some(Notification::error("Gagal mengubah foto profil")))
        }
    }
}
