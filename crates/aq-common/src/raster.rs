//! Raster identifiers and the file naming convention of the raster host.
//!
//! The names are shared with the map client and GeoServer mosaics, so they
//! must stay exactly `PM25_<YYYYMMDD>_3km.tif` and `DEM_VN_3km.tif`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AqError, AqResult};

/// File name of the static elevation raster.
pub const DEM_FILE_NAME: &str = "DEM_VN_3km.tif";

/// Raster layers served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RasterLayer {
    /// Daily PM2.5 concentration (µg/m³), one raster per date.
    #[serde(rename = "PM25")]
    Pm25,
    /// Static elevation model (m).
    #[serde(rename = "DEM")]
    Dem,
}

impl RasterLayer {
    /// Parse the `layerName` sent by the client.
    pub fn from_layer_name(name: &str) -> AqResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "PM25" | "PM2.5" | "PM2_5" => Ok(RasterLayer::Pm25),
            "DEM" => Ok(RasterLayer::Dem),
            _ => Err(AqError::UnknownLayer(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RasterLayer::Pm25 => "PM25",
            RasterLayer::Dem => "DEM",
        }
    }

    /// Display unit of the sampled values.
    pub fn unit(&self) -> &'static str {
        match self {
            RasterLayer::Pm25 => "µg/m³",
            RasterLayer::Dem => "m",
        }
    }
}

impl fmt::Display for RasterLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (layer, date) pair that resolves to exactly one raster file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterId {
    layer: RasterLayer,
    date: Option<NaiveDate>,
}

impl RasterId {
    /// The PM2.5 raster of a given day.
    pub fn pm25(date: NaiveDate) -> Self {
        Self {
            layer: RasterLayer::Pm25,
            date: Some(date),
        }
    }

    /// The elevation raster (not dated).
    pub fn dem() -> Self {
        Self {
            layer: RasterLayer::Dem,
            date: None,
        }
    }

    /// Resolve a layer and an optional date. PM25 requires the date, DEM ignores it.
    pub fn for_layer(layer: RasterLayer, date: Option<NaiveDate>) -> AqResult<Self> {
        match layer {
            RasterLayer::Pm25 => date
                .map(Self::pm25)
                .ok_or_else(|| AqError::MissingParameter("time".to_string())),
            RasterLayer::Dem => Ok(Self::dem()),
        }
    }

    pub fn layer(&self) -> RasterLayer {
        self.layer
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// File name on the raster host.
    pub fn file_name(&self) -> String {
        match (self.layer, self.date) {
            (RasterLayer::Pm25, Some(date)) => format!("PM25_{}_3km.tif", date.format("%Y%m%d")),
            // for_layer/pm25 never build an undated PM25 id
            (RasterLayer::Pm25, None) => "PM25_3km.tif".to_string(),
            (RasterLayer::Dem, _) => DEM_FILE_NAME.to_string(),
        }
    }
}

impl fmt::Display for RasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Whether a client supplied file name may be passed to the raster host.
///
/// Only flat `.tif`/`.tiff` names made of ASCII letters, digits, `_`, `-` and `.`
/// are accepted; anything with a path separator or `..` is rejected.
pub fn is_safe_file_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && !name.contains("..")
        && (lower.ends_with(".tif") || lower.ends_with(".tiff"))
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
