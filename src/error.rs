use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Secret generation error: {0}")]
    Secret(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Errors render as plain status text; only the upload success path
        // returns a structured body.
        let status = match &self {
            AppError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                StatusCode::NOT_FOUND
            }
            AppError::BadRequest(msg) => {
                tracing::debug!("Bad request: {}", msg);
                StatusCode::BAD_REQUEST
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Secret(msg) => {
                tracing::error!("Secret generation error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Request(e) => {
                tracing::error!("Request error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = status.canonical_reason().unwrap_or("Error").to_string();
        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
