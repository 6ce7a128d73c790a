//! Page flows that tie the auth provider, sessions and profiles together.
//!
//! Each flow returns plain data (redirect targets, cookies, field errors,
//! notifications) and leaves rendering to the web layer.

mod auth;
mod avatar;
mod callback;
mod errors;
mod profile;
mod types;

pub use auth::{AuthForm, login_core, logout_core, register_core, start_oauth_core};
pub use avatar::{
    AvatarState, SelectedImage, get_avatar_state, remove_selected_avatar, save_selected_avatar,
    select_avatar,
};
pub use callback::callback_core;
pub use errors::CoordinationError;
pub use profile::{
    EditProfileForm, ProfileFormOutcome, initials, submit_profile_form, update_profile_checked,
};
pub use types::{FormFailure, Notification, NotificationKind, RedirectOutcome};
