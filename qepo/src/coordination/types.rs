use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A toast shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Why a form submission did not go through. The page is rendered again
/// with the field errors inline and the notification, if any, as a toast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFailure {
    pub errors: FieldErrors,
    pub notification: Option<Notification>,
}

impl FormFailure {
    pub(crate) fn fields(errors: FieldErrors) -> Self {
        Self {
            errors,
            notification: None,
        }
    }

    pub(crate) fn notify(notification: Notification) -> Self {
        Self {
            errors: FieldErrors::new(),
            notification: Some(notification),
        }
    }
}

/// A redirect together with the cookies and toasts that go with it
#[derive(Debug, Clone)]
pub struct RedirectOutcome {
    pub redirect_to: String,
    pub headers: HeaderMap,
    pub notifications: Vec<Notification>,
}
