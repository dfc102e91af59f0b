//! Point-value sources behind map-info and chart queries.
//!
//! [`GeoTiffSampler`] reads the pixel straight out of the raster file and is
//! the default. [`WmsFeatureInfoSource`] asks GeoServer instead.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use aq_common::time::format_api_date;
use aq_common::{AqResult, RasterId, RasterLayer};
use storage::RasterCache;
use upstream::FeatureInfoClient;

use crate::metrics::{record_cache_outcome, record_point_query};

/// Value of a raster at a geographic coordinate.
#[async_trait]
pub trait PointValueSource: Send + Sync {
    /// `Ok(None)` means no data at that point.
    async fn value_at(&self, raster: RasterId, lat: f64, lng: f64) -> AqResult<Option<f64>>;

    fn name(&self) -> &'static str;
}

/// Samples GeoTIFFs fetched through the raster cache.
///
/// Never fails: fetch and decode problems are logged and reported as no data.
pub struct GeoTiffSampler {
    cache: Arc<RasterCache>,
}

impl GeoTiffSampler {
    pub fn new(cache: Arc<RasterCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl PointValueSource for GeoTiffSampler {
    async fn value_at(&self, raster: RasterId, lat: f64, lng: f64) -> AqResult<Option<f64>> {
        let name = raster.file_name();

        let data = match self.cache.get_with_outcome(&name).await {
            Ok((data, outcome)) => {
                record_cache_outcome(outcome);
                data
            }
            Err(e) => {
                warn!(raster = %name, error = %e, "Raster unavailable, reporting no data");
                record_point_query(self.name(), false);
                return Ok(None);
            }
        };

        // decoding is CPU bound
        let value = match tokio::task::spawn_blocking(move || {
            geotiff_parser::sample_bytes(data, lat, lng)
        })
        .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(raster = %name, error = %e, "Sampling task failed");
                None
            }
        };

        debug!(raster = %name, lat, lng, ?value, "Sampled raster");
        record_point_query(self.name(), value.is_some());
        Ok(value)
    }

    fn name(&self) -> &'static str {
        "geotiff"
    }
}

/// Queries GeoServer with WMS GetFeatureInfo.
///
/// GeoServer reports the raster's fill value as an ordinary `GRAY_INDEX`; those
/// are mapped to no data the same way the GeoTIFF sampler does.
pub struct WmsFeatureInfoSource {
    client: FeatureInfoClient,
}

impl WmsFeatureInfoSource {
    pub fn new(client: FeatureInfoClient) -> Self {
        Self { client }
    }

    fn layer_name(&self, layer: RasterLayer) -> &str {
        match layer {
            RasterLayer::Pm25 => &self.client.config().pm25_layer,
            RasterLayer::Dem => &self.client.config().dem_layer,
        }
    }
}

#[async_trait]
impl PointValueSource for WmsFeatureInfoSource {
    async fn value_at(&self, raster: RasterId, lat: f64, lng: f64) -> AqResult<Option<f64>> {
        let time = raster.date().map(format_api_date);
        let value = self
            .client
            .value_at(self.layer_name(raster.layer()), time.as_deref(), lat, lng)
            .await?
            .filter(|&v| !geotiff_parser::is_missing_value(v));
        record_point_query(self.name(), value.is_some());
        Ok(value)
    }

    fn name(&self) -> &'static str {
        "wms"
    }
}
