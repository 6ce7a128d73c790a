use regex::Regex;
use std::sync::LazyLock;

use crate::auth::Credentials;

use super::errors::FieldErrors;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const BIO_MAX_LEN: usize = 300;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub fn validate_email(email: &str) -> Result<&str, String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    // The pattern cannot express these two without lookaround
    if email.starts_with('.') || email.contains("..") || !EMAIL_RE.is_match(email) {
        return Err("Invalid email address".to_string());
    }
    Ok(email)
}

/// Checks the password rules in order and reports the first one that fails
pub fn validate_password(password: &str) -> Result<&str, String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters long"
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number".to_string());
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err("Password must contain at least one special character".to_string());
    }
    Ok(password)
}

/// Validate a username from the edit-profile form.
///
/// An empty value means "no username supplied" and yields `Ok(None)`.
pub fn validate_username(username: &str) -> Result<Option<String>, String> {
    let username = username.trim();
    if username.is_empty() {
        return Ok(None);
    }
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(format!(
            "Username must be at least {USERNAME_MIN_LEN} characters long"
        ));
    }
    if len > USERNAME_MAX_LEN {
        return Err(format!(
            "Username must be at most {USERNAME_MAX_LEN} characters long"
        ));
    }
    Ok(Some(username.to_string()))
}

pub fn validate_bio(bio: &str) -> Result<String, String> {
    if bio.chars().count() > BIO_MAX_LEN {
        return Err(format!("Bio must be at most {BIO_MAX_LEN} characters long"));
    }
    Ok(bio.to_string())
}

/// Shared schema of the login and register forms
pub fn validate_credentials(email: &str, password: &str) -> Result<Credentials, FieldErrors> {
    let mut errors = FieldErrors::new();
    let email = errors.record("email", validate_email(email));
    let password = errors.record("password", validate_password(password));

    match (email, password) {
        (Some(email), Some(password)) => Ok(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(errors),
    }
}
