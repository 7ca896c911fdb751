use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::auth::{
    extractors::HeaderError, jwt::TokenError, password::HashingError, refresh::RefreshError,
};

/// Error returned by every handler.
///
/// Credential failures of any kind become `Unauthorized` with a message chosen
/// by the route; the underlying reason is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub const UNAUTHORIZED: &str = "unauthorized";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.to_string()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.to_string()),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m.to_string()),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<HeaderError> for ApiError {
    fn from(e: HeaderError) -> Self {
        debug!(reason = %e, "credential header rejected");
        ApiError::Unauthorized(UNAUTHORIZED)
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
            other => {
                warn!(reason = %other, "access token rejected");
                ApiError::Unauthorized(UNAUTHORIZED)
            }
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::Store(e) => ApiError::Internal(e),
            other => {
                warn!(reason = %other, "refresh token rejected");
                ApiError::Unauthorized(UNAUTHORIZED)
            }
        }
    }
}

impl From<HashingError> for ApiError {
    fn from(e: HashingError) -> Self {
        ApiError::Internal(e.into())
    }
}
