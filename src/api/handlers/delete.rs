use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use tracing::{error, info, warn};

use crate::AppState;
use crate::api::handlers::types::{DeleteRequest, api_message};
use crate::infrastructure::storage::StorageError;
use crate::utils::validation::sanitize_filename_strict;

/// Deletes one stored file. JSON in, JSON out; the filename gets the strict
/// sanitizer since this is the destructive path.
pub async fn delete_file(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => {
            return api_message(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Invalid Content-Type. Expected application/json.",
                true,
            );
        }
        Err(_) => {
            return api_message(
                StatusCode::BAD_REQUEST,
                "Invalid request body. Could not parse JSON.",
                true,
            );
        }
    };

    if request.filename.is_empty() {
        return api_message(StatusCode::BAD_REQUEST, "Filename cannot be empty.", true);
    }

    let name = match sanitize_filename_strict(&request.filename) {
        Ok(name) => name,
        Err(err) => {
            warn!(
                "refused deletion of suspicious path '{}': {}",
                request.filename, err
            );
            return api_message(
                StatusCode::BAD_REQUEST,
                "Invalid filename format or contains path characters.",
                true,
            );
        }
    };

    match state.storage.delete(&name).await {
        Ok(()) => {
            info!("successfully deleted file: {}", name);
            api_message(
                StatusCode::OK,
                format!("File '{}' deleted successfully.", name),
                false,
            )
        }
        Err(StorageError::NotFound(_)) => api_message(
            StatusCode::NOT_FOUND,
            format!("File '{}' not found.", name),
            true,
        ),
        Err(StorageError::Forbidden) => {
            warn!("refused deletion outside the storage root: {}", name);
            api_message(
                StatusCode::FORBIDDEN,
                "Operation forbidden: file is outside the designated storage area.",
                true,
            )
        }
        Err(err) => {
            error!("could not delete file {}: {}", name, err);
            api_message(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to delete file '{}'. Check server logs.", name),
                true,
            )
        }
    }
}
