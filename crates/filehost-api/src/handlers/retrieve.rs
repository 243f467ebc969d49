//! Retrieval endpoint
//!
//! `GET|HEAD <mount>/<name>` serves a stored file. The name is decoded and
//! sanitized exactly like an upload name, so no request can reach outside the
//! storage root.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use filehost_core::{mime_for_filename, sanitize_filename, AppError, FilehostConfig};
use futures::TryStreamExt;

use crate::error::HttpAppError;
use crate::state::AppState;

const NOT_FOUND_MESSAGE: &str = "The requested file was not found";

pub async fn handle(
    state: &AppState,
    config: &FilehostConfig,
    method: &Method,
    requested: &str,
) -> Response {
    match retrieve(state, config, method, requested).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Stored-file name for the path after the mount, if it names one.
pub fn resolve_requested_name(requested: &str) -> Option<String> {
    let trimmed = requested.trim_start_matches('/');
    let decoded = urlencoding::decode(trimmed).ok()?;
    sanitize_filename(&decoded)
}

#[tracing::instrument(skip(state, config, method), fields(method = %method))]
async fn retrieve(
    state: &AppState,
    config: &FilehostConfig,
    method: &Method,
    requested: &str,
) -> Result<Response, HttpAppError> {
    let filename = resolve_requested_name(requested)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    let storage = state.storage(config);
    let content_type = HeaderValue::from_static(mime_for_filename(&filename));

    if *method == Method::HEAD {
        let size = storage.content_length(&filename).await.map_err(not_found)?;
        return Ok(file_response(content_type, size, Body::empty()));
    }

    let file = storage.open(&filename).await.map_err(not_found)?;
    let size = file.size;
    let name = file.filename.clone();
    let stream = file.stream.inspect_err(move |e| {
        tracing::error!(filename = %name, error = %e, "Stored file read failed mid-stream");
    });

    tracing::debug!(filename = %filename, size_bytes = size, "Serving stored file");
    Ok(file_response(content_type, size, Body::from_stream(stream)))
}

/// Keep a generic body for missing files; everything else maps as usual.
fn not_found(err: filehost_storage::StorageError) -> HttpAppError {
    match err {
        filehost_storage::StorageError::NotFound(_)
        | filehost_storage::StorageError::InvalidKey(_) => {
            HttpAppError(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
        }
        other => HttpAppError::from(other),
    }
}

fn file_response(content_type: HeaderValue, size: u64, body: Body) -> Response {
    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requested_name() {
        assert_eq!(resolve_requested_name("cat.png").as_deref(), Some("cat.png"));
        assert_eq!(resolve_requested_name("//cat.png").as_deref(), Some("cat.png"));
        assert_eq!(
            resolve_requested_name("my%20notes.txt").as_deref(),
            Some("my notes.txt")
        );
        assert_eq!(
            resolve_requested_name("..%2F..%2Fetc%2Fpasswd").as_deref(),
            Some(".._.._etc_passwd")
        );
        assert_eq!(
            resolve_requested_name("../../etc/passwd").as_deref(),
            Some(".._.._etc_passwd")
        );
    }

    #[test]
    fn test_unresolvable_names() {
        for requested in ["", "/", ".", "..", "%2E%2E", "%FF"] {
            assert_eq!(resolve_requested_name(requested), None, "{requested:?}");
        }
    }
}
