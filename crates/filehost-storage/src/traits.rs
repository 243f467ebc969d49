//! Storage abstraction trait
//!
//! This module defines the Storage trait that storage backends implement.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stream of body chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// An opened stored file ready to be streamed out
pub struct StoredFile {
    pub filename: String,
    pub size: u64,
    pub stream: Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>,
}

impl std::fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredFile")
            .field("filename", &self.filename)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Storage abstraction trait
///
/// `filename` arguments are sanitized names; backends still refuse anything
/// that is not a direct child of their root.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a stream under `filename`, publishing it only once it is complete.
    ///
    /// Fails with [`StorageError::TooLarge`] as soon as more than `max_bytes`
    /// arrive; nothing is left behind in that case. Returns the number of bytes written.
    async fn store_stream(
        &self,
        filename: &str,
        stream: ByteStream,
        max_bytes: u64,
    ) -> StorageResult<u64>;

    /// Size in bytes of a stored file.
    async fn content_length(&self, filename: &str) -> StorageResult<u64>;

    /// Open a stored file for streaming.
    async fn open(&self, filename: &str) -> StorageResult<StoredFile>;
}
