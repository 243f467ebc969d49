//! Filehost Storage Library
//!
//! This crate provides the storage abstraction for hosted files and its local
//! filesystem implementation.
//!
//! # Layout
//!
//! Files live directly under the storage root as `{root}/{filename}`. Names are
//! sanitized before they reach a backend (see `filehost_core::sanitize_filename`),
//! and backends reject anything that would not be a direct child of the root.
//! Uploads in progress are written under `{root}/.partial/` and renamed into
//! place once complete.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult, StoredFile};
