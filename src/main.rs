use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use lanparty_files::config::ServerConfig;
use lanparty_files::infrastructure::{preload, storage::StorageRoot};
use lanparty_files::services::download_log::DownloadRecorder;
use lanparty_files::{AppState, create_app};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port for the file server
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lanparty_files=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        "🚀 Starting LAN file server (max upload size: {} MB)",
        config.max_upload_mb()
    );

    // Missing directories are fatal before serving begins.
    let storage = StorageRoot::open(&config.upload_dir).await.with_context(|| {
        format!("could not create storage directory {}", config.upload_dir.display())
    })?;
    tokio::fs::create_dir_all(&config.seed_dir)
        .await
        .with_context(|| {
            format!("could not create seed directory {}", config.seed_dir.display())
        })?;
    tokio::fs::create_dir_all(&config.download_log_dir)
        .await
        .with_context(|| {
            format!(
                "could not create download log directory {}",
                config.download_log_dir.display()
            )
        })?;

    preload::preload_seed_files(&config.seed_dir, &storage).await;

    let state = AppState {
        storage: Arc::new(storage),
        recorder: Arc::new(DownloadRecorder::new(&config.download_log_dir)),
        config,
    };

    let trace_layer = TraceLayer::new_for_http()
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!("📤 finished in {:?} with status {}", latency, response.status());
            },
        );

    let app = create_app(state).layer(trace_layer);
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    warn!("file deletion is ENABLED without authentication");
    info!("✅ Serving files on http://0.0.0.0:{}/", args.port);
    info!("📨 Upload files at http://0.0.0.0:{}/upload", args.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("👋 Server exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, shutting down...");
        },
    }
}
