pub mod download_log;
