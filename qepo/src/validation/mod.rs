//! Form validation rules shared by the auth and profile pages

mod errors;
mod schemas;

pub use errors::FieldErrors;
pub use schemas::{
    BIO_MAX_LEN, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN, validate_bio,
    validate_credentials, validate_username,
};
