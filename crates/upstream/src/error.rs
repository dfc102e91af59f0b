//! Upstream error types.

use aq_common::AqError;
use thiserror::Error;

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Failure talking to an external service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection refused, DNS failure, reset, ...
    #[error("{service} request failed: {message}")]
    Request { service: &'static str, message: String },

    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} response could not be decoded: {message}")]
    Decode { service: &'static str, message: String },
}

impl UpstreamError {
    /// Classify a reqwest error.
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { service }
        } else if err.is_decode() {
            UpstreamError::Decode {
                service,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            UpstreamError::Status {
                service,
                status: status.as_u16(),
            }
        } else {
            UpstreamError::Request {
                service,
                message: err.to_string(),
            }
        }
    }

    /// Transient failures are worth another attempt: connection problems,
    /// timeouts, HTTP 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Request { .. } | UpstreamError::Timeout { .. } => true,
            UpstreamError::Status { status, .. } => *status >= 500 || *status == 429,
            UpstreamError::Decode { .. } => false,
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            UpstreamError::Request { service, .. }
            | UpstreamError::Timeout { service }
            | UpstreamError::Status { service, .. }
            | UpstreamError::Decode { service, .. } => service,
        }
    }
}

impl From<UpstreamError> for AqError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout { .. } => AqError::Timeout,
            other => AqError::Upstream(other.to_string()),
        }
    }
}
