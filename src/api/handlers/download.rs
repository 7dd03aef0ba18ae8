use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Path, Request, State},
    http::header,
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::AppState;
use crate::api::error::AppError;

/// Serves one stored file. Directories below the root are never browsable:
/// a path naming one reads as not found, exactly like an absent file. The
/// actual streaming (content type, conditional requests, ranges) is
/// delegated to [`ServeFile`].
pub async fn download_file(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    Path(requested): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let Some(full_path) = state.storage.resolve(&requested) else {
        return Err(AppError::NotFound(format!("File '{}' not found.", requested)));
    };

    let metadata = match tokio::fs::metadata(&full_path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("file not found: {} (requested by {})", requested, remote_addr);
            return Err(AppError::NotFound(format!("File '{}' not found.", requested)));
        }
        Err(err) => {
            return Err(AppError::Internal(format!(
                "could not stat {}: {}",
                full_path.display(),
                err
            )));
        }
    };
    if metadata.is_dir() {
        tracing::info!(
            "directory access refused for {} (requested by {})",
            requested,
            remote_addr
        );
        return Err(AppError::NotFound(format!("File '{}' not found.", requested)));
    }

    let forwarded_for = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let requested_url = request.uri().to_string();

    state
        .recorder
        .record(
            Some(remote_addr),
            forwarded_for.as_deref(),
            user_agent.as_deref(),
            &requested,
            &requested_url,
        )
        .await;

    let response = ServeFile::new(&full_path)
        .oneshot(request)
        .await
        .map_err(|err| AppError::Internal(format!("could not serve {}: {}", requested, err)))?;

    Ok(response.map(Body::new))
}
