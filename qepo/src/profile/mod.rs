mod config;
mod errors;
mod main;
mod storage;
mod types;

pub use config::AVATAR_MAX_BYTES;
pub use errors::ProfileError;
pub use main::{
    create_profile, get_profile, update_profile, update_profile_picture,
    update_profile_picture_base64,
};
pub use types::{ProfileProjection, ProfileUpdate};

pub(crate) async fn init() -> Result<(), ProfileError> {
    storage::ProfileStore::init().await
}
