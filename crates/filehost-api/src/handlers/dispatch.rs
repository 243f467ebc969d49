//! Mount-path dispatch
//!
//! The mount path comes from the live configuration, so it is matched per
//! request instead of being baked into the router. `<mount>` is the upload
//! endpoint and `<mount>/<name>` a stored file. Everything else falls through
//! to a plain 404.

use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
};
use filehost_core::AppError;

use crate::error::HttpAppError;
use crate::handlers::{retrieve, upload};
use crate::state::AppState;

pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let config = state.config.snapshot();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == config.mount_path {
        return upload::handle(&state, config, request).await;
    }

    let file = path
        .strip_prefix(config.mount_path.as_str())
        .and_then(|rest| rest.strip_prefix('/'));
    if let Some(file) = file {
        if method == Method::GET || method == Method::HEAD {
            return retrieve::handle(&state, &config, &method, file).await;
        }
    }

    HttpAppError(AppError::NotFound(
        "The requested URL was not found".to_string(),
    ))
    .into_response()
}
