//! Handler error type

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// A request failure and the status it maps to
#[derive(Debug)]
pub enum AppError {
    /// Upstream or rendering failure (500)
    Internal(String),
    /// Upstream has no such manga or chapter (404)
    NotFound(String),
    /// Malformed client input (400)
    BadRequest(String),
    /// Proxied fetch failed (502)
    BadGateway(String),
}

impl AppError {
    /// Log `err` and return a 500 carrying only `context`
    pub fn upstream(context: &str, err: mangadex::Error) -> Self {
        error!("{}: {}", context, err);
        AppError::Internal(context.to_string())
    }

    /// Like [`AppError::upstream`], but an upstream 404 becomes `missing`
    pub fn lookup(context: &str, missing: &str, err: mangadex::Error) -> Self {
        if err.is_not_found() {
            warn!("{}: {}", missing, err);
            return AppError::NotFound(missing.to_string());
        }
        Self::upstream(context, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        (status, message).into_response()
    }
}
