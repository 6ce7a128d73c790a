mod config;
mod errors;
mod main;
mod types;

pub use config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
pub use errors::SessionError;
pub use main::{
    get_session_id_from_headers, get_user_from_headers, is_authenticated,
    prepare_logout_response,
};
pub use types::{CsrfToken, User};

pub(crate) use main::create_session;
