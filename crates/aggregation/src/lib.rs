//! Temporal aggregation of air-quality data.
//!
//! - [`daily`]: rounded mean/max rollups of an hourly series
//! - [`station`]: merging a provider hourly block into a [`Station`](aq_common::Station)
//! - [`projection`]: single-hour view of a station day
//! - [`chart`]: concurrent 7-day chart series with per-day failure isolation

pub mod chart;
pub mod daily;
pub mod projection;
pub mod station;

pub use chart::{build_chart_series, ChartPoint};
pub use daily::{complete_series, daily_average, daily_peak, round_half_up};
pub use projection::project_hour;
pub use station::{build_station, station_status};
