//! Storage error types.

use aq_common::AqError;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    #[error("Timed out reading {0}")]
    Timeout(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Classify an `object_store` error for `name`.
    pub fn from_object_store(name: &str, err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => StorageError::NotFound(name.to_string()),
            other => {
                let message = other.to_string();
                if message.to_ascii_lowercase().contains("timed out") {
                    StorageError::Timeout(name.to_string())
                } else {
                    StorageError::Backend(format!("{}: {}", name, message))
                }
            }
        }
    }
}

impl From<StorageError> for AqError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => AqError::RasterNotFound(name),
            StorageError::Timeout(_) => AqError::Timeout,
            other => AqError::Storage(other.to_string()),
        }
    }
}
