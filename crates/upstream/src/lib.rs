//! Outbound HTTP clients.
//!
//! Every client shares a [`reqwest::Client`] built with explicit request and
//! connect timeouts, and wraps each call in a bounded [`RetryPolicy`].

pub mod client;
pub mod error;
pub mod geocoder;
pub mod open_meteo;
pub mod retry;
pub mod wms;

pub use client::{build_client, HttpClientConfig};
pub use error::{UpstreamError, UpstreamResult};
pub use geocoder::{GeocoderConfig, ReverseGeocoder};
pub use open_meteo::{AirQualityClient, AirQualityConfig};
pub use retry::RetryPolicy;
pub use wms::{FeatureInfoClient, WmsConfig};
