use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file '{0}' already exists")]
    AlreadyExists(String),

    #[error("file '{0}' not found")]
    NotFound(String),

    #[error("path escapes the storage root")]
    Forbidden,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A file enumerated by [`StorageRoot::list`]. Content stays on disk.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// Owns one flat directory of uploaded files. Every filesystem operation on
/// that directory goes through here; handlers never build paths themselves.
#[derive(Debug)]
pub struct StorageRoot {
    root: PathBuf,
}

impl StorageRoot {
    /// Creates the directory if needed and pins its canonical path. The
    /// canonical root is what every containment check compares against.
    pub async fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        let root = fs::canonicalize(&root).await?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Enumerates regular files directly inside the root, sorted
    /// case-insensitively by name. An empty directory is an empty Vec, not
    /// an error. Entries whose metadata or name cannot be read are skipped.
    pub async fn list(&self) -> std::io::Result<Vec<StoredFile>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(err) => {
                    warn!("skipping unreadable entry {:?}: {}", entry.file_name(), err);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                warn!("skipping non-UTF-8 file name {:?}", entry.file_name());
                continue;
            };
            files.push(StoredFile {
                name,
                size: metadata.len(),
            });
        }

        files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(files)
    }

    pub async fn exists(&self, name: &str) -> bool {
        match self.child_path(name) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Streams `reader` into a new file. Never overwrites: a same-named
    /// entry fails with `AlreadyExists` before any byte is written. A write
    /// failure mid-copy removes the partial file best-effort.
    ///
    /// The check-then-create gap is deliberate; see DESIGN.md. Two
    /// concurrent uploads of one name may both pass the existence check.
    pub async fn create<R>(&self, name: &str, mut reader: R) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let path = self.child_path(name)?;

        if fs::metadata(&path).await.is_ok() {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let mut file = fs::File::create(&path).await?;
        let copied = async {
            let written = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            Ok::<u64, std::io::Error>(written)
        }
        .await;

        match copied {
            Ok(written) => Ok(written),
            Err(err) => {
                drop(file);
                if let Err(remove_err) = fs::remove_file(&path).await {
                    warn!(
                        "failed to remove partial file {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                Err(StorageError::Io(err))
            }
        }
    }

    /// Removes a file. `Forbidden` when the resolved path is not strictly
    /// inside the root or is the root itself; `NotFound` when absent.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.child_path(name)?;

        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(err) => return Err(StorageError::Io(err)),
        }

        fs::remove_file(&path).await.map_err(StorageError::Io)
    }

    /// Resolves a requested download path under the root. Only plain path
    /// segments are accepted; `..`, absolute segments and drive prefixes
    /// make the path read as absent.
    pub fn resolve(&self, requested: &str) -> Option<PathBuf> {
        let trimmed = requested.trim_start_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        let mut path = self.root.clone();
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => path.push(part),
                _ => return None,
            }
        }
        Some(path)
    }

    /// The resolved path for `name`, required to be a direct child of the
    /// root. `name` arrives pre-sanitized, but the containment check does
    /// not rely on that.
    fn child_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(StorageError::Forbidden),
        }

        let candidate = self.root.join(name);
        if candidate == self.root || !candidate.starts_with(&self.root) {
            return Err(StorageError::Forbidden);
        }
        Ok(candidate)
    }
}
