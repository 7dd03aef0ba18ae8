use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::{HeaderMap, StatusCode},
    response::{Html, Response},
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::types::UploadOutcome;
use crate::api::views;
use crate::infrastructure::storage::StorageError;
use crate::utils::validation::sanitize_filename;

const FILE_FIELD: &str = "fileToUpload";

pub async fn upload_form() -> Html<String> {
    Html(views::upload_page(None, false))
}

/// Accepts one multipart upload. The outcome is rendered as JSON for
/// script-driven requests (`X-Requested-With: XMLHttpRequest`) and as the
/// upload page otherwise, with the status reflecting the result.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "XMLHttpRequest");

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return UploadOutcome::failure(
                StatusCode::BAD_REQUEST,
                format!("Error parsing form: {}", rejection.body_text()),
            )
            .into_response(is_xhr);
        }
    };

    let outcome = match store_upload(&state, &mut multipart).await {
        Ok((name, written)) => {
            tracing::info!("successfully uploaded {} ({} bytes)", name, written);
            UploadOutcome::success(format!("File '{}' uploaded successfully!", name))
        }
        Err(err) => {
            // Consume the rest of the stream so the client sees the response
            // instead of a reset connection.
            tracing::warn!("upload failed: {}. consuming remaining stream...", err);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            UploadOutcome::failure(err.status(), err.message())
        }
    };

    outcome.into_response(is_xhr)
}

async fn store_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<(String, u64), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| classify_multipart_error(err, state.config.max_upload_mb()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        return save_field(state, field).await;
    }

    Err(AppError::BadRequest(format!(
        "No file provided. Expected a '{}' form field.",
        FILE_FIELD
    )))
}

async fn save_field(state: &AppState, field: Field<'_>) -> Result<(String, u64), AppError> {
    let raw_name = field.file_name().unwrap_or_default().to_string();
    let name = sanitize_filename(&raw_name).map_err(|err| {
        tracing::warn!("invalid upload filename '{}': {}", raw_name, err);
        AppError::InvalidName("Invalid filename provided.".to_string())
    })?;

    let max_mb = state.config.max_upload_mb();
    let reader = StreamReader::new(field.map_err(std::io::Error::other));

    match state.storage.create(&name, reader).await {
        Ok(written) => Ok((name, written)),
        Err(StorageError::Io(err)) if err.to_string().contains("length limit exceeded") => {
            Err(too_large(max_mb))
        }
        Err(err) => Err(err.into()),
    }
}

fn classify_multipart_error(err: MultipartError, max_mb: usize) -> AppError {
    let text = err.body_text();
    if text.contains("length limit exceeded") {
        too_large(max_mb)
    } else {
        AppError::BadRequest(format!("Error parsing form: {}", text))
    }
}

fn too_large(max_mb: usize) -> AppError {
    AppError::TooLarge(format!(
        "File is too large to upload (the limit is {} MB).",
        max_mb
    ))
}
