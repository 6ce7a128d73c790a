//! JSON API over the profile service, mounted at `/api`.
//!
//! Every route needs a session cookie. State-changing calls also need the
//! session's CSRF token in the `X-CSRF-Token` header.

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use http::StatusCode;
use serde::Deserialize;

use qepo::{
    AVATAR_MAX_BYTES, ProfileProjection, ProfileUpdate, SessionUser, create_profile, get_profile,
    update_profile_checked, update_profile_picture_base64,
};

use crate::error::ApiError;
use crate::middleware::require_user_401;
use crate::session::AuthUser;

const JSON_OVERHEAD: usize = 16 * 1024;

/// Largest picture body: the base64 form of an `AVATAR_MAX_BYTES` image
/// plus the JSON around it
fn picture_body_limit() -> usize {
    AVATAR_MAX_BYTES.div_ceil(3) * 4 + JSON_OVERHEAD
}

pub(crate) fn router() -> Router<()> {
    Router::new()
        .route(
            "/profile",
            get(read_profile).post(ensure_profile).patch(patch_profile),
        )
        .route(
            "/profile/picture",
            put(put_picture).layer(DefaultBodyLimit::max(picture_body_limit())),
        )
        .route_layer(from_fn(require_user_401))
}

/// Rejections from the extractor (a CSRF mismatch) become a 401 body
fn require(user: Option<AuthUser>) -> Result<AuthUser, ApiError> {
    user.ok_or_else(ApiError::unauthorized)
}

async fn read_profile(
    user: Option<AuthUser>,
) -> Result<Json<Option<ProfileProjection>>, ApiError> {
    let user = require(user)?;
    Ok(Json(get_profile(&user.id).await?))
}

async fn ensure_profile(user: Option<AuthUser>) -> Result<Json<ProfileProjection>, ApiError> {
    let user = require(user)?;
    Ok(Json(create_profile(&SessionUser::from(&user)).await?))
}

async fn patch_profile(
    user: Option<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileProjection>, ApiError> {
    let user = require(user)?;
    Ok(Json(update_profile_checked(&user.id, update).await?))
}

#[derive(Debug, Deserialize)]
struct PictureBody {
    #[serde(default)]
    image: Option<String>,
}

async fn put_picture(
    user: Option<AuthUser>,
    Json(body): Json<PictureBody>,
) -> Result<Response, ApiError> {
    let user = require(user)?;
    update_profile_picture_base64(&user.id, body.image.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
