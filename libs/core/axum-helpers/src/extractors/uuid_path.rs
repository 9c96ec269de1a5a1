//! UUID path parameter extractor with automatic validation.

use crate::errors::ErrorResponse;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

/// Extractor for UUID path parameters.
///
/// Parses the path parameter as a UUID, rejecting with a structured 400
/// response when the segment is not a valid UUID.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::UuidPath;
///
/// async fn get_user(UuidPath(id): UuidPath) -> String {
///     format!("User ID: {}", id)
/// }
///
/// let app = Router::new().route("/users/{id}", get(get_user));
/// ```
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        match Uuid::parse_str(&id) {
            Ok(uuid) => Ok(UuidPath(uuid)),
            Err(_) => {
                let body = Json(ErrorResponse {
                    error: "BadRequest".to_string(),
                    message: format!("Invalid UUID: {}", id),
                    details: None,
                });
                Err((StatusCode::BAD_REQUEST, body).into_response())
            }
        }
    }
}
