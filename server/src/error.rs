//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed caller input: bad keys, filters, ids or document urls
    #[error("Invalid request: {0}")]
    Validation(String),

    /// An expected source or destination row is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed request or malformed reply from the remote table service
    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<tablesync_engine::Error> for AppError {
    fn from(err: tablesync_engine::Error) -> Self {
        if err.is_validation() {
            AppError::Validation(err.to_string())
        } else {
            AppError::Remote(err.to_string())
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Remote(err.to_string())
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                StatusCode::NOT_FOUND
            }
            AppError::Remote(msg) => {
                tracing::error!("Remote error: {}", msg);
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(e) => {
                tracing::error!("Configuration error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for the server.
pub type Result<T> = std::result::Result<T, AppError>;
