//! Filehost Core Library
//!
//! This crate provides the configuration, error types, upload credentials and
//! file metadata model shared by the HTTP service and the chat relay.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod token;

// Re-export commonly used types
pub use config::{FilehostConfig, SharedConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    classify, extension_for_content_type, mime_for_filename, sanitize_filename, FileCategory,
    FileMetadata, ProtocolTag, TagError, TagMessage,
};
pub use token::{TokenError, TokenService, UploadClaims};
