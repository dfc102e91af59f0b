//! Common types and utilities shared across the air-quality map services.

pub mod bbox;
pub mod category;
pub mod error;
pub mod raster;
pub mod station;
pub mod time;

pub use bbox::BoundingBox;
pub use category::{Category, CategoryTable};
pub use error::{AqError, AqResult};
pub use raster::{RasterId, RasterLayer};
pub use station::{
    BaseStation, EnvironmentalData, HourlyRecord, Metric, Station, StationStatus,
};
pub use time::{parse_api_date, ChartWindow};
