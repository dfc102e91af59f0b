//! Application state for the air-quality API.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use aq_common::BaseStation;
use storage::{RasterCache, RasterStore};
use upstream::{build_client, AirQualityClient, FeatureInfoClient, ReverseGeocoder};

use crate::config::{AqConfig, PointSourceMode};
use crate::point_source::{GeoTiffSampler, PointValueSource, WmsFeatureInfoSource};

/// Shared application state.
pub struct AppState {
    pub config: AqConfig,

    /// Static station list, in file order.
    pub stations: Vec<BaseStation>,

    pub air_quality: AirQualityClient,
    pub geocoder: ReverseGeocoder,

    /// Raster bytes for sampling and pass-through.
    pub raster_cache: Arc<RasterCache>,

    /// Source of map-info and chart values.
    pub point_source: Arc<dyn PointValueSource>,

    /// Renders `/metrics`.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Build the state from configuration.
    pub async fn new(config: AqConfig, metrics: PrometheusHandle) -> Result<Self> {
        let stations = load_stations(&config.stations_path).await?;

        let http = build_client(&config.http).context("Failed to build HTTP client")?;
        let air_quality =
            AirQualityClient::new(http.clone(), config.air_quality.clone(), config.retry);
        let geocoder = ReverseGeocoder::new(http.clone(), config.geocoder.clone(), config.retry);

        let store = RasterStore::new(&config.rasters)
            .with_context(|| format!("Failed to open raster host {}", config.rasters.base))?;
        let raster_cache = Arc::new(RasterCache::new(
            config.raster_cache_capacity,
            Arc::new(store),
        ));

        let point_source: Arc<dyn PointValueSource> = match config.point_source {
            PointSourceMode::Geotiff => Arc::new(GeoTiffSampler::new(Arc::clone(&raster_cache))),
            PointSourceMode::Wms => Arc::new(WmsFeatureInfoSource::new(FeatureInfoClient::new(
                http,
                config.wms.clone(),
                config.retry,
            ))),
        };

        info!(
            stations = stations.len(),
            point_source = point_source.name(),
            raster_base = %config.rasters.base,
            cache_capacity = raster_cache.capacity(),
            "Application state ready"
        );

        Ok(Self {
            config,
            stations,
            air_quality,
            geocoder,
            raster_cache,
            point_source,
            metrics,
        })
    }

    /// Coordinates of every station, in list order.
    pub fn station_coords(&self) -> Vec<(f64, f64)> {
        self.stations.iter().map(|s| (s.lat(), s.lng())).collect()
    }
}

/// Read the station list (`[{id, name, geo: [lat, lng]}]`).
pub async fn load_stations(path: &str) -> Result<Vec<BaseStation>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read station list: {}", path))?;
    let stations: Vec<BaseStation> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse station list: {}", path))?;
    info!(path, count = stations.len(), "Loaded stations");
    Ok(stations)
}
