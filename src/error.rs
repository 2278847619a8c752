//! Request-level error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::stabilize::ProbeFailure;
use crate::upstream::UpstreamError;

/// Terminal failure of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// The stabilization probe failed; the original command was dropped.
    #[error(transparent)]
    Stabilization(#[from] ProbeFailure),

    #[error("UpstreamUnavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("UpstreamTimeout: no response within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("Unknown stabilizer proxy command '{0}'")]
    AdminUnknownCommand(String),

    #[error("Invalid method")]
    AdminBadMethod,

    #[error("Bad request: {0}")]
    AdminBadRequest(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Stabilization(_) | ProxyError::UpstreamUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::AdminUnknownCommand(_) => StatusCode::NOT_FOUND,
            ProxyError::AdminBadMethod => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::AdminBadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout(limit) => ProxyError::UpstreamTimeout(limit),
            other => ProxyError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
