pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::config::ServerConfig;
use crate::infrastructure::storage::StorageRoot;
use crate::services::download_log::DownloadRecorder;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageRoot>,
    pub recorder: Arc<DownloadRecorder>,
    pub config: ServerConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/upload",
            get(api::handlers::upload::upload_form)
                .post(api::handlers::upload::upload_file)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/delete", post(api::handlers::delete::delete_file))
        .route("/", get(api::handlers::listing::list_files))
        .route("/*path", get(api::handlers::download::download_file))
        .with_state(state)
}
