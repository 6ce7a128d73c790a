use axum::{
    body::Body,
    extract::Path,
    response::{IntoResponse, Response},
};
use http::{StatusCode, header::CONTENT_TYPE};

use qepo::get_stored_object;

use crate::error::IntoResponseError;

/// Serves objects of the in-memory object store, whose public URLs point here
pub(super) async fn serve_object(
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    match get_stored_object(&bucket, &key).await {
        Ok(Some(object)) => http::Response::builder()
            .header(CONTENT_TYPE, object.content_type)
            .header("Cache-Control", "no-cache")
            .body(Body::from(object.bytes))
            .into_response_error(),
        Ok(None) => Ok((StatusCode::NOT_FOUND, "Not found").into_response()),
        Err(e) => {
            tracing::error!(error = %e, bucket, key, "Object lookup failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
