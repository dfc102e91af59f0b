//! Service configuration loading and types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use storage::RasterStoreConfig;
use upstream::{AirQualityConfig, GeocoderConfig, HttpClientConfig, RetryPolicy, WmsConfig};

/// Where map-info and chart values come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSourceMode {
    /// Sample the GeoTIFF rasters directly.
    #[default]
    Geotiff,
    /// Ask GeoServer through WMS GetFeatureInfo.
    Wms,
}

/// Service configuration loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqConfig {
    /// JSON list of monitoring stations
    #[serde(default = "default_stations_path")]
    pub stations_path: String,

    #[serde(default)]
    pub point_source: PointSourceMode,

    /// Rasters kept in memory
    #[serde(default = "default_cache_capacity")]
    pub raster_cache_capacity: usize,

    /// `locationName` when reverse geocoding fails
    #[serde(default = "default_location_placeholder")]
    pub location_placeholder: String,

    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub air_quality: AirQualityConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default)]
    pub wms: WmsConfig,

    #[serde(default)]
    pub rasters: RasterStoreConfig,
}

fn default_stations_path() -> String {
    "config/all_stations.json".to_string()
}

fn default_cache_capacity() -> usize {
    32
}

fn default_location_placeholder() -> String {
    "Đang xác định...".to_string()
}

impl Default for AqConfig {
    fn default() -> Self {
        Self {
            stations_path: default_stations_path(),
            point_source: PointSourceMode::default(),
            raster_cache_capacity: default_cache_capacity(),
            location_placeholder: default_location_placeholder(),
            http: HttpClientConfig::default(),
            retry: RetryPolicy::default(),
            air_quality: AirQualityConfig::default(),
            geocoder: GeocoderConfig::default(),
            wms: WmsConfig::default(),
            rasters: RasterStoreConfig::default(),
        }
    }
}

impl AqConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: &str) -> Result<Self> {
        let file = Path::new(path);

        let mut config = if file.exists() {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read config: {}", path))?;
            let config: AqConfig = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path))?;
            tracing::info!(path, "Loaded service config");
            config
        } else {
            tracing::warn!("Config file {} does not exist, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override the commonly deployed URLs and paths from the environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AQ_PROVIDER_URL") {
            self.air_quality.url = url;
        }
        if let Some(url) = lookup("AQ_GEOCODER_URL") {
            self.geocoder.url = url;
        }
        if let Some(url) = lookup("AQ_WMS_URL") {
            self.wms.url = url;
        }
        if let Some(base) = lookup("AQ_RASTER_BASE") {
            self.rasters.base = base;
        }
        if let Some(path) = lookup("AQ_STATIONS_PATH") {
            self.stations_path = path;
        }
        if let Some(mode) = lookup("AQ_POINT_SOURCE") {
            match mode.to_ascii_lowercase().as_str() {
                "geotiff" => self.point_source = PointSourceMode::Geotiff,
                "wms" => self.point_source = PointSourceMode::Wms,
                other => tracing::warn!(value = other, "Ignoring unknown AQ_POINT_SOURCE"),
            }
        }
    }
}
