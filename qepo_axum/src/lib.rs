//! qepo-axum - axum front end for the Qepo profile service
//!
//! Provides the HTML pages (home, login, register, OAuth callback,
//! profile editor), the `/api` JSON routes, the [`AuthUser`] extractor and
//! the route guards. Call [`init`] once before serving [`qepo_router`].

mod api;
mod config;
mod error;
mod flash;
mod middleware;
mod pages;
mod router;
mod session;

#[cfg(test)]
mod test_utils;

pub use config::QEPO_RESPOND_WITH_X_CSRF_TOKEN;
pub use middleware::{require_guest, require_user, require_user_401};
pub use router::{qepo_router, qepo_router_no_trace};
pub use session::AuthUser;

pub use qepo::{AuthEvent, init, subscribe_auth_events};
