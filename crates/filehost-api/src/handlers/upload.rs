//! Upload endpoint
//!
//! `POST <mount>` stores the request body and answers `201` with the public
//! URL. Checks run in a fixed order and the first failure ends the request:
//! method, credential, content type, filename, size, write.

use axum::{
    body::Body,
    extract::{Query, Request},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use filehost_core::constants::{GENERATED_NAME_LEN, PARTIAL_DIR};
use filehost_core::models::{neutralize_separators, ACCEPTED_CONTENT_TYPES};
use filehost_core::{extension_for_content_type, AppError, FilehostConfig, TokenService};
use filehost_storage::{ByteStream, StorageError};
use futures::TryStreamExt;
use rand::{distr::Alphanumeric, Rng};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;

pub const ALLOWED_METHODS: &str = "OPTIONS, POST";

#[derive(Debug, Deserialize)]
struct CredentialQuery {
    token: Option<String>,
}

pub async fn handle(state: &AppState, config: Arc<FilehostConfig>, request: Request) -> Response {
    let method = request.method().clone();
    if method == Method::OPTIONS {
        return options_response();
    }
    if method != Method::POST {
        return HttpAppError(AppError::MethodNotAllowed {
            method: method.to_string(),
            allow: ALLOWED_METHODS,
        })
        .into_response();
    }

    match upload(state, &config, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Capability discovery: allowed methods and every accepted content type.
fn options_response() -> Response {
    let accept_post = ACCEPTED_CONTENT_TYPES
        .iter()
        .map(|(mime, _)| *mime)
        .collect::<Vec<_>>()
        .join(", ");

    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(
            "Content-Type, Content-Disposition, Content-Length, Authorization",
        ),
    );
    if let Ok(value) = HeaderValue::from_str(&accept_post) {
        headers.insert("Accept-Post", value);
    }
    response
}

#[tracing::instrument(skip_all, fields(filename = tracing::field::Empty))]
async fn upload(
    state: &AppState,
    config: &FilehostConfig,
    request: Request,
) -> Result<Response, HttpAppError> {
    let account = if config.authenticate {
        Some(authenticate(config, &request)?)
    } else {
        None
    };

    let headers = request.headers();
    let extension = content_type_extension(headers)?;
    let filename = resolve_filename(headers, extension)?;
    tracing::Span::current().record("filename", filename.as_str());

    if let Some(length) = content_length(headers) {
        if length > config.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Upload exceeds the limit of {} bytes",
                config.max_upload_bytes
            ))
            .into());
        }
    }

    let stream: ByteStream = Box::pin(
        request
            .into_body()
            .into_data_stream()
            .map_err(std::io::Error::other),
    );

    let storage = state.storage(config);
    let size = storage
        .store_stream(&filename, stream, config.max_upload_bytes)
        .await
        .map_err(|e| match e {
            StorageError::InvalidKey(_) => {
                HttpAppError(AppError::BadRequest("Invalid filename".to_string()))
            }
            other => HttpAppError::from(other),
        })?;

    let url = config.file_url(&filename);
    tracing::info!(
        account = account.as_deref().unwrap_or("-"),
        size_bytes = size,
        url = %url,
        "File uploaded"
    );

    let location = HeaderValue::from_str(&url)
        .map_err(|e| AppError::Internal(format!("Invalid Location header: {}", e)))?;
    Ok((
        StatusCode::CREATED,
        [
            (header::LOCATION, location),
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
        ],
        Body::from(Bytes::from(url)),
    )
        .into_response())
}

/// Verify the request's credential and return the identity it was issued to.
fn authenticate(config: &FilehostConfig, request: &Request) -> Result<String, HttpAppError> {
    let token = bearer_token(request.headers()).or_else(|| {
        Query::<CredentialQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.token)
    });

    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Err(AppError::Unauthorized("An upload credential is required".to_string()).into());
    };

    let tokens = TokenService::from_config(config)
        .map_err(|e| AppError::Internal(format!("Token service unavailable: {}", e)))?;

    tokens.verify(&token).ok_or_else(|| {
        AppError::Unauthorized("The upload credential is invalid or has expired".to_string())
            .into()
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}

fn content_type_extension(headers: &HeaderMap) -> Result<&'static str, HttpAppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    extension_for_content_type(content_type).ok_or_else(|| {
        AppError::UnsupportedMediaType(
            "The uploaded content type is not accepted here".to_string(),
        )
        .into()
    })
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Name to store the upload under: the client's name with separators
/// neutralized, or a random one, with the content type's extension appended
/// when the name has none.
fn resolve_filename(headers: &HeaderMap, extension: &str) -> Result<String, HttpAppError> {
    let requested = match headers.get(header::CONTENT_DISPOSITION) {
        Some(value) => {
            let value = std::str::from_utf8(value.as_bytes()).map_err(|_| {
                AppError::BadRequest("Content-Disposition must be valid UTF-8".to_string())
            })?;
            disposition_filename(value)
        }
        None => None,
    };

    let name = match requested.map(|name| neutralize_separators(&name)) {
        Some(name) if name == "." || name == ".." || name == PARTIAL_DIR => {
            return Err(AppError::BadRequest("Invalid filename".to_string()).into());
        }
        Some(name) if !name.is_empty() => name,
        _ => generate_name(),
    };

    if name.contains('.') {
        Ok(name)
    } else {
        Ok(format!("{}.{}", name, extension))
    }
}

/// `filename` parameter of a Content-Disposition value, quoted or bare.
fn disposition_filename(value: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets valid for `value`.
    let lower = value.to_ascii_lowercase();
    let mut offset = 0;

    while let Some(found) = lower[offset..].find("filename") {
        let start = offset + found;
        offset = start + "filename".len();

        let before = value[..start].trim_end();
        if !(before.is_empty() || before.ends_with(';')) {
            continue;
        }
        // `filename*=` is not supported and skipped here
        let Some(rest) = value[offset..].trim_start().strip_prefix('=') else {
            continue;
        };

        let rest = rest.trim_start();
        return match rest.strip_prefix('"') {
            Some(quoted) => quoted.split_once('"').map(|(name, _)| name.to_string()),
            None => rest.split(';').next().map(|name| name.trim().to_string()),
        };
    }
    None
}

fn generate_name() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_NAME_LEN)
        .map(char::from)
        .collect()
}
