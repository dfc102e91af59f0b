//! HTTP request handlers.

pub mod chart;
pub mod health;
pub mod legends;
pub mod map_info;
pub mod raster;
pub mod stations;

pub use chart::chart_handler;
pub use health::{health_handler, metrics_handler, ready_handler};
pub use legends::legends_handler;
pub use map_info::map_info_handler;
pub use raster::{raster_data_handler, tiff_proxy_handler};
pub use stations::{station_hour_handler, stations_handler};
