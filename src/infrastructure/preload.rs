use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::infrastructure::storage::StorageRoot;

/// Copies every regular file from the seed directory into storage, skipping
/// names that already exist there. Each failure is logged and that file is
/// skipped; preload never aborts startup.
pub async fn preload_seed_files(seed_dir: &Path, storage: &StorageRoot) {
    info!("scanning {} for preloaded files...", seed_dir.display());

    let mut entries = match fs::read_dir(seed_dir).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                "could not read seed directory {}: {}",
                seed_dir.display(),
                err
            );
            return;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!("could not read seed directory entry: {}", err);
                break;
            }
        };

        match entry.file_type().await {
            Ok(file_type) if file_type.is_file() => {}
            Ok(_) => continue,
            Err(err) => {
                warn!("could not stat seed entry {:?}: {}", entry.file_name(), err);
                continue;
            }
        }

        let Ok(name) = entry.file_name().into_string() else {
            warn!("skipping seed file with non-UTF-8 name {:?}", entry.file_name());
            continue;
        };

        if storage.exists(&name).await {
            info!("skipping preload for {}: file already exists in storage", name);
            continue;
        }

        let mut src = match fs::File::open(entry.path()).await {
            Ok(src) => src,
            Err(err) => {
                warn!("could not open seed file {}: {}", entry.path().display(), err);
                continue;
            }
        };

        match storage.create(&name, &mut src).await {
            Ok(written) => info!("preloaded {} ({} bytes)", name, written),
            Err(err) => warn!("could not preload {}: {}", name, err),
        }
    }

    info!("preloading complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preload_copies_new_and_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let seed_dir = dir.path().join("preloaded");
        fs::create_dir_all(&seed_dir).await.unwrap();
        fs::write(seed_dir.join("game.zip"), b"seed copy").await.unwrap();
        fs::write(seed_dir.join("new.bin"), b"fresh").await.unwrap();
        fs::create_dir(seed_dir.join("nested")).await.unwrap();

        let storage = StorageRoot::open(dir.path().join("uploads")).await.unwrap();
        storage.create("game.zip", &b"already here"[..]).await.unwrap();

        preload_seed_files(&seed_dir, &storage).await;

        // Existing file untouched, new file copied, directory ignored
        let existing = fs::read(storage.path().join("game.zip")).await.unwrap();
        assert_eq!(existing, b"already here");
        let copied = fs::read(storage.path().join("new.bin")).await.unwrap();
        assert_eq!(copied, b"fresh");
        assert!(!storage.exists("nested").await);
    }

    #[tokio::test]
    async fn test_preload_missing_seed_dir_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageRoot::open(dir.path().join("uploads")).await.unwrap();
        preload_seed_files(&dir.path().join("does-not-exist"), &storage).await;
        assert!(storage.list().await.unwrap().is_empty());
    }
}
