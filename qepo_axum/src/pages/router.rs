use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};

use qepo::{AVATAR_MAX_BYTES, CALLBACK_PATH, MEMORY_OBJECT_PATH};

use crate::middleware::{require_guest, require_user};

/// Room for the multipart framing and the CSRF field around the image
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// HTML pages
pub(crate) fn router() -> Router<()> {
    let guest = Router::new()
        .route(
            "/login",
            get(super::auth::login_page).post(super::auth::login_submit),
        )
        .route(
            "/register",
            get(super::auth::register_page).post(super::auth::register_submit),
        )
        .route_layer(from_fn(require_guest));

    let private = Router::new()
        .route(
            "/profile",
            get(super::profile::profile_page).post(super::profile::profile_submit),
        )
        .route(
            "/profile/avatar",
            post(super::profile::avatar_select)
                .layer(DefaultBodyLimit::max(*AVATAR_MAX_BYTES + MULTIPART_OVERHEAD)),
        )
        .route("/profile/avatar/save", post(super::profile::avatar_save))
        .route("/profile/avatar/remove", post(super::profile::avatar_remove))
        .route_layer(from_fn(require_user));

    Router::new()
        .route("/", get(super::home::home))
        .route("/login/google", get(super::auth::oauth_start))
        .route(CALLBACK_PATH, get(super::auth::callback))
        .route("/logout", get(super::auth::logout))
        .route(
            &format!("{MEMORY_OBJECT_PATH}/{{bucket}}/{{key}}"),
            get(super::storage::serve_object),
        )
        .merge(guest)
        .merge(private)
}
