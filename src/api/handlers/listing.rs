use axum::{extract::State, response::Html};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::AppState;
use crate::api::error::AppError;
use crate::api::views::{self, FileView};

/// Characters escaped when a file name becomes a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub async fn list_files(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let files = state.storage.list().await.map_err(|err| {
        AppError::Internal(format!(
            "could not read storage directory {}: {}",
            state.storage.path().display(),
            err
        ))
    })?;

    let view: Vec<FileView> = files
        .into_iter()
        .map(|file| {
            let url = format!("/{}", utf8_percent_encode(&file.name, PATH_SEGMENT));
            FileView {
                name: file.name,
                size: file.size,
                url,
            }
        })
        .collect();

    Ok(Html(views::listing_page(&view)))
}
