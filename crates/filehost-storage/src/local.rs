use crate::traits::{ByteStream, Storage, StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use filehost_core::constants::PARTIAL_DIR;
use filehost_core::{sanitize_filename, AppError};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a storage rooted at `root`. The directory is not created here;
    /// startup does that once.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root and the partial-upload directory if missing.
    pub async fn ensure_dirs(&self) -> StorageResult<()> {
        fs::create_dir_all(self.root.join(PARTIAL_DIR))
            .await
            .map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    self.root.display(),
                    e
                ))
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a filename to a direct child of the root.
    fn key_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        let clean = sanitize_filename(filename)
            .ok_or_else(|| StorageError::InvalidKey(filename.to_string()))?;
        if clean != filename || clean == PARTIAL_DIR {
            return Err(StorageError::InvalidKey(filename.to_string()));
        }

        let path = self.root.join(&clean);
        if path.parent() != Some(self.root.as_path()) {
            return Err(StorageError::InvalidKey(filename.to_string()));
        }
        Ok(path)
    }

    fn partial_path(&self) -> PathBuf {
        self.root
            .join(PARTIAL_DIR)
            .join(format!("{}.part", Uuid::new_v4()))
    }

    async fn regular_file_len(&self, path: &Path, filename: &str) -> StorageResult<u64> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(StorageError::NotFound(filename.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn write_partial(
        &self,
        partial: &Path,
        mut stream: ByteStream,
        max_bytes: u64,
    ) -> StorageResult<u64> {
        if let Some(parent) = partial.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(partial).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                partial.display(),
                e
            ))
        })?;

        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| StorageError::UploadFailed(format!("Failed to read body: {}", e)))?;
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(StorageError::TooLarge { limit: max_bytes });
            }
            file.write_all(&chunk).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    partial.display(),
                    e
                ))
            })?;
        }

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", partial.display(), e))
        })?;

        Ok(written)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store_stream(
        &self,
        filename: &str,
        stream: ByteStream,
        max_bytes: u64,
    ) -> StorageResult<u64> {
        let path = self.key_to_path(filename)?;
        let partial = self.partial_path();
        let start = std::time::Instant::now();

        let size = match self.write_partial(&partial, stream, max_bytes).await {
            Ok(size) => size,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %partial.display(),
                            error = %cleanup,
                            "Failed to remove partial upload"
                        );
                    }
                }
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to publish file {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %filename,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(size)
    }

    async fn content_length(&self, filename: &str) -> StorageResult<u64> {
        let path = self.key_to_path(filename)?;
        self.regular_file_len(&path, filename).await
    }

    async fn open(&self, filename: &str) -> StorageResult<StoredFile> {
        let path = self.key_to_path(filename)?;
        let size = self.regular_file_len(&path, filename).await?;

        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(filename.to_string())
            } else {
                StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %filename,
            size_bytes = size,
            "Local storage stream opened"
        );

        let stream = ReaderStream::new(file).map(|result| result.map_err(StorageError::from));

        Ok(StoredFile {
            filename: filename.to_string(),
            size,
            stream: Box::pin(stream),
        })
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) | StorageError::InvalidKey(name) => {
                AppError::NotFound(format!("File not found: {}", name))
            }
            StorageError::TooLarge { limit } => {
                AppError::PayloadTooLarge(format!("Upload exceeds the limit of {} bytes", limit))
            }
            other => AppError::Storage(other.to_string()),
        }
    }
}
