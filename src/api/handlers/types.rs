use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::api::views;

/// The JSON envelope every script-facing response uses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
    pub error: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub filename: String,
}

pub fn api_message(status: StatusCode, message: impl Into<String>, error: bool) -> Response {
    (
        status,
        Json(ApiMessage {
            message: message.into(),
            error,
        }),
    )
        .into_response()
}

/// Result of one upload attempt. Lives only for the duration of the request;
/// rendered as JSON for script-driven clients and as the upload page
/// otherwise.
#[derive(Debug)]
pub struct UploadOutcome {
    pub message: String,
    pub error: bool,
    pub status: StatusCode,
}

impl UploadOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: false,
            status: StatusCode::OK,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
            status,
        }
    }

    pub fn into_response(self, is_xhr: bool) -> Response {
        if is_xhr {
            api_message(self.status, self.message, self.error)
        } else {
            (
                self.status,
                Html(views::upload_page(Some(self.message.as_str()), self.error)),
            )
                .into_response()
        }
    }
}
