use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum CinemaError {
    /// The settings document is missing, malformed, or lacks required fields.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown backend type, or connect/disconnect/handle used out of order.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Caller supplied data that the consuming layer refuses to store.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl CinemaError {
    pub fn validation(message: impl Into<String>) -> Self {
        CinemaError::Validation(message.into())
    }

    pub fn connection(message: impl Into<String>) -> Self {
        CinemaError::Connection(message.into())
    }
}

impl IntoResponse for CinemaError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            CinemaError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorObject {
                    code: "BAD_REQUEST".to_string(),
                    message,
                },
            ),

            err @ CinemaError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: err.to_string(),
                },
            ),

            err @ (CinemaError::Storage(_)
            | CinemaError::Connection(_)
            | CinemaError::Configuration(_)) => {
                error!(error = %err, "request failed inside the persistence layer");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred.".to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
