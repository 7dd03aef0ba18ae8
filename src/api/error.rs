use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::infrastructure::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid filename: {0}")]
    InvalidName(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    TooLarge(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists(name) => AppError::AlreadyExists(format!(
                "File '{}' already exists. Please rename and try again.",
                name
            )),
            StorageError::NotFound(name) => AppError::NotFound(format!("File '{}' not found.", name)),
            StorageError::Forbidden => AppError::Forbidden(
                "Operation forbidden: file is outside the designated storage area.".to_string(),
            ),
            StorageError::Io(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidName(_) | AppError::BadRequest(_) | AppError::TooLarge(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "message": self.message(),
            "error": true,
        }));
        (status, body).into_response()
    }
}
