use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::ErrorResponse;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            UserError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                format!("User {} not found", id),
            ),
            UserError::DuplicateEmail(email) => (
                StatusCode::CONFLICT,
                "Conflict",
                format!("User with email '{}' already exists", email),
            ),
            UserError::Internal(msg) => {
                // Full detail goes to the log, never to the client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
                details: None,
            }),
        )
            .into_response()
    }
}
