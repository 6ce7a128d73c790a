//! qepo - profile service and sign-in flows for the Qepo web app
//!
//! Users register and log in through a hosted auth provider, either with
//! email and password or with OAuth (PKCE), and edit a profile made of a
//! username, a bio and an avatar. Profiles live in SQLite or PostgreSQL,
//! avatars in object storage, sessions in the cache store.

mod auth;
mod config;
mod coordination;
mod profile;
mod session;
mod storage;
mod utils;
mod validation;

#[cfg(test)]
mod test_utils;

pub use auth::{
    AuthError, AuthErrorCode, AuthEvent, ProviderUser, UserMetadata, subscribe_auth_events,
};

pub use config::{CALLBACK_PATH, QEPO_BASE_URL, QEPO_LOGIN_URL, QEPO_REDIRECT_HOME, callback_url};

pub use coordination::{
    AuthForm, AvatarState, CoordinationError, EditProfileForm, FormFailure, Notification,
    NotificationKind, ProfileFormOutcome, RedirectOutcome, SelectedImage, callback_core,
    get_avatar_state, initials, login_core, logout_core, register_core, remove_selected_avatar,
    save_selected_avatar, select_avatar, start_oauth_core, submit_profile_form,
    update_profile_checked,
};

pub use profile::{
    AVATAR_MAX_BYTES, ProfileError, ProfileProjection, ProfileUpdate, create_profile,
    get_profile, update_profile, update_profile_picture, update_profile_picture_base64,
};

pub use session::{
    CsrfToken, SESSION_COOKIE_NAME, SessionError, User as SessionUser,
    get_session_id_from_headers, get_user_from_headers, is_authenticated,
    prepare_logout_response,
};

pub use storage::{MEMORY_OBJECT_PATH, StorageError, StoredObject, get_stored_object};

pub use validation::{
    BIO_MAX_LEN, FieldErrors, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};

/// Initialize the stores and the auth provider
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    storage::init().await?;
    auth::init().await?;
    profile::init().await?;
    Ok(())
}
