use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 100;
const ENV_MAX_UPLOAD_SIZE_MB: &str = "MAX_UPLOAD_SIZE_MB";

/// Server configuration, built once at startup and carried in `AppState`.
/// Nothing reads the environment after this is constructed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum upload size in bytes (default: 100 MB)
    pub max_upload_bytes: usize,

    /// Flat directory holding all uploaded and preloaded files
    pub upload_dir: PathBuf,

    /// Read-only seed directory copied into storage at startup
    pub seed_dir: PathBuf,

    /// Directory receiving one JSON record per download
    pub download_log_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            upload_dir: PathBuf::from("./uploads"),
            seed_dir: PathBuf::from("./preloaded"),
            download_log_dir: PathBuf::from("./downloads-log"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables. An invalid
    /// `MAX_UPLOAD_SIZE_MB` falls back to the default with a diagnostic.
    pub fn from_env() -> Self {
        let default = Self::default();

        let max_upload_bytes = match env::var(ENV_MAX_UPLOAD_SIZE_MB) {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(mb) if mb > 0 => {
                    info!("using custom max upload size from {}: {} MB", ENV_MAX_UPLOAD_SIZE_MB, mb);
                    mb * 1024 * 1024
                }
                _ => {
                    warn!(
                        "invalid value for {} ('{}'), using default: {} MB",
                        ENV_MAX_UPLOAD_SIZE_MB, raw, DEFAULT_MAX_UPLOAD_SIZE_MB
                    );
                    default.max_upload_bytes
                }
            },
            Err(_) => {
                info!(
                    "using default max upload size: {} MB (set {} to override)",
                    DEFAULT_MAX_UPLOAD_SIZE_MB, ENV_MAX_UPLOAD_SIZE_MB
                );
                default.max_upload_bytes
            }
        };

        Self {
            max_upload_bytes,
            ..default
        }
    }

    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / 1024 / 1024
    }
}
