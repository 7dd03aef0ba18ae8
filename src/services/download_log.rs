use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{info, warn};

/// One immutable access record, written per successful download. Never read
/// back by the server; external tooling consumes the log directory.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub file_name: String,
    pub requested_url: String,
}

/// Persists download records as standalone JSON files. Recording is
/// best-effort throughout: any failure is logged and the download proceeds.
#[derive(Debug)]
pub struct DownloadRecorder {
    log_dir: PathBuf,
}

impl DownloadRecorder {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub async fn record(
        &self,
        remote_addr: Option<SocketAddr>,
        forwarded_for: Option<&str>,
        user_agent: Option<&str>,
        file_name: &str,
        requested_url: &str,
    ) {
        let record = DownloadRecord {
            timestamp: Utc::now(),
            ip_address: client_ip(remote_addr, forwarded_for),
            user_agent: user_agent.unwrap_or_default().to_string(),
            file_name: base_name(file_name),
            requested_url: requested_url.to_string(),
        };

        let json = match serde_json::to_vec_pretty(&record) {
            Ok(json) => json,
            Err(err) => {
                warn!("could not serialize download record for {}: {}", record.file_name, err);
                return;
            }
        };

        let log_name = format!(
            "{}_{}.json",
            record.timestamp.format("%Y%m%d%H%M%S"),
            flatten_name(&record.file_name)
        );
        let log_path = self.log_dir.join(log_name);

        match fs::write(&log_path, json).await {
            Ok(()) => info!(
                "logged download of {} by {} to {}",
                record.file_name,
                record.ip_address,
                log_path.display()
            ),
            Err(err) => warn!(
                "could not write download record to {}: {}",
                log_path.display(),
                err
            ),
        }
    }
}

/// The first `X-Forwarded-For` entry wins when it parses as an IP address;
/// otherwise the connection's remote address, without the port.
fn client_ip(remote_addr: Option<SocketAddr>, forwarded_for: Option<&str>) -> String {
    if let Some(header) = forwarded_for {
        if let Some(first) = header.split(',').next() {
            let candidate = first.trim();
            if candidate.parse::<IpAddr>().is_ok() {
                return candidate.to_string();
            }
            warn!("could not parse address from x-forwarded-for: {}", candidate);
        }
    }

    match remote_addr {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Log files must stay flat: dots and separators in the served name are
/// replaced so the name cannot form a path or an extension of its own.
fn flatten_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '.' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(ip: [u8; 4], port: u16) -> Option<SocketAddr> {
        Some(SocketAddr::from((ip, port)))
    }

    #[test]
    fn test_client_ip_prefers_valid_forwarded_for() {
        assert_eq!(
            client_ip(peer([10, 0, 0, 1], 5000), Some("203.0.113.7, 10.0.0.1")),
            "203.0.113.7"
        );
        assert_eq!(
            client_ip(peer([10, 0, 0, 1], 5000), Some("2001:db8::1")),
            "2001:db8::1"
        );
    }

    #[test]
    fn test_client_ip_falls_back_on_garbage_header() {
        assert_eq!(
            client_ip(peer([192, 168, 1, 20], 61234), Some("not-an-ip")),
            "192.168.1.20"
        );
        assert_eq!(client_ip(peer([192, 168, 1, 20], 61234), None), "192.168.1.20");
        assert_eq!(client_ip(None, None), "unknown");
    }

    #[test]
    fn test_flatten_name() {
        assert_eq!(flatten_name("game.zip"), "game_zip");
        assert_eq!(flatten_name("a/b\\c.txt"), "a_b_c_txt");
    }

    #[tokio::test]
    async fn test_record_writes_one_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = DownloadRecorder::new(dir.path());

        recorder
            .record(
                peer([127, 0, 0, 1], 9999),
                None,
                Some("curl/8.0"),
                "game.zip",
                "/game.zip",
            )
            .await;

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(entries.len(), 1);

        let name = entries[0].file_name().into_string().unwrap();
        assert!(name.ends_with("_game_zip.json"), "log name: {name}");

        let record: serde_json::Value =
            serde_json::from_slice(&std::fs::read(entries[0].path()).unwrap()).unwrap();
        assert_eq!(record["ipAddress"], "127.0.0.1");
        assert_eq!(record["userAgent"], "curl/8.0");
        assert_eq!(record["fileName"], "game.zip");
        assert_eq!(record["requestedUrl"], "/game.zip");
        assert!(record["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_record_failure_is_silent() {
        // Log directory does not exist; the call must not panic or error out.
        let recorder = DownloadRecorder::new("/nonexistent/downloads-log");
        recorder
            .record(peer([127, 0, 0, 1], 1), None, None, "x.bin", "/x.bin")
            .await;
    }
}
