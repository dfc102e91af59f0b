//! HTTP rendering of service errors.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use aq_common::AqError;
use geotiff_parser::GeoTiffError;
use storage::StorageError;
use upstream::UpstreamError;

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AqError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Render server-side failures (timeouts included) as a 500 with a fixed
    /// message. Client errors keep their own status and message.
    pub fn public(self, message: &str) -> Response {
        if self.0.is_client_error() {
            self.into_response()
        } else {
            tracing::error!(error = %self.0, "Request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(err.into())
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError(err.into())
    }
}

impl From<GeoTiffError> for ApiError {
    fn from(err: GeoTiffError) -> Self {
        ApiError(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AqError::invalid("body", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Rejected request");
        }
        error_response(status, &self.0.to_string())
    }
}

/// JSON error body with the given status.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({ "error": message }).to_string(),
    )
        .into_response()
}
