//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpAppError>`. Errors render as a short
//! HTML page, e.g. `<h1>404 Not Found</h1><p>The requested file was not found</p>`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use filehost_core::constants::AUTH_REALM;
use filehost_core::{AppError, ErrorMetadata, LogLevel};
use filehost_storage::StorageError;

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        "<h1>{} {}</h1><p>{}</p>",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error"),
        html_escape::encode_safe(message)
    )
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Client messages never carry paths or error chains.
        let body = error_page(status, &app_error.client_message());
        let mut response = (status, Html(body)).into_response();

        match app_error {
            AppError::Unauthorized(_) => {
                if let Ok(value) =
                    HeaderValue::from_str(&format!("Bearer realm=\"{}\"", AUTH_REALM))
                {
                    response
                        .headers_mut()
                        .insert(header::WWW_AUTHENTICATE, value);
                }
            }
            AppError::MethodNotAllowed { allow, .. } => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static(*allow));
            }
            _ => {}
        }

        response
    }
}
