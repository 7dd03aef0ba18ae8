use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use lanparty_files::config::ServerConfig;
use lanparty_files::infrastructure::storage::StorageRoot;
use lanparty_files::services::download_log::DownloadRecorder;
use lanparty_files::{AppState, create_app};
use tower::ServiceExt;

async fn setup_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageRoot::open(dir.path().join("uploads")).await.unwrap();
    tokio::fs::create_dir_all(dir.path().join("downloads-log"))
        .await
        .unwrap();

    let state = AppState {
        storage: Arc::new(storage),
        recorder: Arc::new(DownloadRecorder::new(dir.path().join("downloads-log"))),
        config: ServerConfig {
            max_upload_bytes: 8 * 1024 * 1024,
            upload_dir: dir.path().join("uploads"),
            seed_dir: dir.path().join("preloaded"),
            download_log_dir: dir.path().join("downloads-log"),
        },
    };

    let app =
        create_app(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    (app, dir)
}

fn delete_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/delete")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_delete_removes_existing_file() {
    let (app, dir) = setup_app().await;
    std::fs::write(dir.path().join("uploads/old.zip"), b"stale").unwrap();

    let response = app
        .oneshot(delete_request(r#"{"filename": "old.zip"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reply = json_body(response).await;
    assert_eq!(reply["error"], false);
    assert!(!dir.path().join("uploads/old.zip").exists());
}

#[tokio::test]
async fn test_delete_missing_file_is_not_found() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(delete_request(r#"{"filename": "ghost.bin"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let reply = json_body(response).await;
    assert_eq!(reply["error"], true);
}

#[tokio::test]
async fn test_delete_rejects_traversal_names() {
    let (app, dir) = setup_app().await;
    std::fs::write(dir.path().join("outside.txt"), b"keep me").unwrap();
    std::fs::write(dir.path().join("uploads/inside.txt"), b"keep me too").unwrap();

    for filename in [
        "../outside.txt",
        "../../etc/passwd",
        "uploads/inside.txt",
        "..",
        "a..b",
        "dir\\inside.txt",
    ] {
        let body = serde_json::json!({ "filename": filename }).to_string();
        let response = app.clone().oneshot(delete_request(&body)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "filename: {filename}"
        );
        let reply = json_body(response).await;
        assert_eq!(reply["error"], true);
    }

    // Nothing was touched
    assert_eq!(
        std::fs::read(dir.path().join("outside.txt")).unwrap(),
        b"keep me"
    );
    assert_eq!(
        std::fs::read(dir.path().join("uploads/inside.txt")).unwrap(),
        b"keep me too"
    );
}

#[tokio::test]
async fn test_delete_empty_filename_is_bad_request() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(delete_request(r#"{"filename": ""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_requires_json_content_type() {
    let (app, dir) = setup_app().await;
    std::fs::write(dir.path().join("uploads/safe.txt"), b"data").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from(r#"{"filename": "safe.txt"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(dir.path().join("uploads/safe.txt").exists());
}

#[tokio::test]
async fn test_delete_malformed_json_is_bad_request() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(delete_request("{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let reply = json_body(response).await;
    assert_eq!(reply["error"], true);
}

#[tokio::test]
async fn test_delete_only_accepts_post() {
    let (app, _dir) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/delete")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
