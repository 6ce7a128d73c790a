use std::sync::LazyLock;
use tokio::sync::broadcast;

use super::types::AuthEvent;

const AUTH_EVENT_CAPACITY: usize = 64;

static AUTH_EVENTS: LazyLock<broadcast::Sender<AuthEvent>> =
    LazyLock::new(|| broadcast::channel(AUTH_EVENT_CAPACITY).0);

/// Receive sign-up, sign-in and sign-out events from now on.
pub fn subscribe_auth_events() -> broadcast::Receiver<AuthEvent> {
    AUTH_EVENTS.subscribe()
}

pub(crate) fn publish(event: AuthEvent) {
    // No receivers is fine
    let _ = AUTH_EVENTS.send(event);
}
