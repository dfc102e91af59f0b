//! Reverse geocoding of clicked map points (Nominatim).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::send_json;
use crate::error::UpstreamResult;
use crate::retry::RetryPolicy;

const SERVICE: &str = "geocoder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Nominatim base URL, without `/reverse`
    pub url: String,
    /// `accept-language` for place names
    pub language: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: "https://nominatim.openstreetmap.org".to_string(),
            language: "vi".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    config: GeocoderConfig,
    retry: RetryPolicy,
}

impl ReverseGeocoder {
    pub fn new(client: Client, config: GeocoderConfig, retry: RetryPolicy) -> Self {
        Self {
            client,
            config,
            retry,
        }
    }

    /// Display name of the place at a coordinate.
    ///
    /// `Ok(None)` when the geocoder knows nothing there (open sea, for example).
    #[instrument(skip(self))]
    pub async fn reverse(&self, lat: f64, lng: f64) -> UpstreamResult<Option<String>> {
        let url = format!("{}/reverse", self.config.url.trim_end_matches('/'));
        let lat = lat.to_string();
        let lng = lng.to_string();

        let response: ReverseResponse = self
            .retry
            .run(|| {
                let request = self.client.get(&url).query(&[
                    ("format", "jsonv2"),
                    ("lat", lat.as_str()),
                    ("lon", lng.as_str()),
                    ("accept-language", self.config.language.as_str()),
                ]);
                send_json(SERVICE, request)
            })
            .await?;

        Ok(response
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}
