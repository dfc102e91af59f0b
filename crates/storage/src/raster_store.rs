//! Raster host access through `object_store`.
//!
//! The host is either a static HTTP file server (the GeoTIFF directory served
//! next to GeoServer) or a local directory. Raster names are flat file names
//! such as `PM25_20240501_3km.tif`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use object_store::{
    http::HttpBuilder, local::LocalFileSystem, path::Path, ClientOptions, ObjectStore,
    RetryConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{StorageError, StorageResult};

/// Stream of raster bytes.
pub type ByteStream = BoxStream<'static, StorageResult<Bytes>>;

/// Configuration for the raster host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterStoreConfig {
    /// `http(s)://` base URL or a local directory
    pub base: String,
    /// Whole-request timeout
    pub timeout_secs: u64,
    /// Connection timeout (HTTP only)
    pub connect_timeout_secs: u64,
    /// Retries of transient HTTP failures
    pub max_retries: usize,
}

impl Default for RasterStoreConfig {
    fn default() -> Self {
        Self {
            base: "./data/rasters".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
            max_retries: 2,
        }
    }
}

impl RasterStoreConfig {
    pub fn is_http(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }
}

/// A raster opened for streaming.
pub struct RasterObject {
    /// Size in bytes as reported by the host
    pub size: usize,
    pub stream: ByteStream,
}

/// Read-only client for the raster host.
pub struct RasterStore {
    store: Arc<dyn ObjectStore>,
    base: String,
}

impl std::fmt::Debug for RasterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterStore").field("base", &self.base).finish()
    }
}

impl RasterStore {
    /// Create a raster store client from config.
    pub fn new(config: &RasterStoreConfig) -> StorageResult<Self> {
        let store: Arc<dyn ObjectStore> = if config.is_http() {
            let mut url = config.base.clone();
            if !url.ends_with('/') {
                url.push('/');
            }

            let options = ClientOptions::new()
                .with_allow_http(true)
                .with_timeout(Duration::from_secs(config.timeout_secs))
                .with_connect_timeout(Duration::from_secs(config.connect_timeout_secs));
            let retry = RetryConfig {
                max_retries: config.max_retries,
                retry_timeout: Duration::from_secs(
                    config.timeout_secs * (config.max_retries as u64 + 1),
                ),
                ..Default::default()
            };

            let http = HttpBuilder::new()
                .with_url(url)
                .with_client_options(options)
                .with_retry(retry)
                .build()
                .map_err(|e| {
                    StorageError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
                })?;
            Arc::new(http)
        } else {
            let local = LocalFileSystem::new_with_prefix(&config.base).map_err(|e| {
                StorageError::InvalidConfig(format!(
                    "Raster directory {} is not usable: {}",
                    config.base, e
                ))
            })?;
            Arc::new(local)
        };

        Ok(Self {
            store,
            base: config.base.clone(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Read a whole raster.
    #[instrument(skip(self), fields(base = %self.base))]
    pub async fn get(&self, name: &str) -> StorageResult<Bytes> {
        let location = Path::from(name);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| StorageError::from_object_store(name, e))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::from_object_store(name, e))?;

        debug!(size = bytes.len(), "Read raster");
        Ok(bytes)
    }

    /// Open a raster for pass-through streaming.
    #[instrument(skip(self), fields(base = %self.base))]
    pub async fn get_stream(&self, name: &str) -> StorageResult<RasterObject> {
        let location = Path::from(name);

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| StorageError::from_object_store(name, e))?;

        let size = result.meta.size;
        let owned_name = name.to_string();
        let stream = result
            .into_stream()
            .map(move |chunk| chunk.map_err(|e| StorageError::from_object_store(&owned_name, e)))
            .boxed();

        debug!(size, "Streaming raster");
        Ok(RasterObject { size, stream })
    }

    /// Check if a raster exists.
    pub async fn exists(&self, name: &str) -> StorageResult<bool> {
        let location = Path::from(name);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::from_object_store(name, e)),
        }
    }
}
