//! Filehost API Library
//!
//! This crate provides the HTTP upload and retrieval endpoints, middleware, and
//! application setup.

mod handlers;
mod middleware;
pub mod setup;
pub mod telemetry;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use state::AppState;
