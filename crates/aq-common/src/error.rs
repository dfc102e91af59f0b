//! Error types for the air-quality map services.

use thiserror::Error;

/// Result type alias using AqError.
pub type AqResult<T> = Result<T, AqError>;

/// Primary error type surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AqError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid date: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    // === Data Errors ===
    #[error("Raster not found: {0}")]
    RasterNotFound(String),

    #[error("Failed to decode raster: {0}")]
    RasterDecode(String),

    // === Upstream Errors ===
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request timeout")]
    Timeout,

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AqError {
    /// Shorthand for an invalid parameter.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        AqError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AqError::MissingParameter(_)
            | AqError::InvalidParameter { .. }
            | AqError::InvalidDate(_)
            | AqError::UnknownLayer(_) => 400,

            AqError::RasterNotFound(_) => 404,

            AqError::Timeout => 504,

            _ => 500,
        }
    }

    /// True for errors caused by the caller rather than an upstream or internal fault.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

// Conversion from common error types
impl From<std::io::Error> for AqError {
    fn from(err: std::io::Error) -> Self {
        AqError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AqError {
    fn from(err: serde_json::Error) -> Self {
        AqError::Internal(format!("JSON error: {}", err))
    }
}
