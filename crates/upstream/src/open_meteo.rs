//! Open-Meteo air-quality client.
//!
//! One request covers every station: latitudes and longitudes are sent as
//! comma-separated lists and the provider answers with one entry per
//! coordinate, in request order. A single coordinate is answered with a bare
//! object instead of an array.

use aq_common::station::HOURLY_VARIABLES;
use aq_common::time::format_api_date;
use aq_common::HourlyRecord;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::client::send_json;
use crate::error::UpstreamResult;
use crate::retry::RetryPolicy;

const SERVICE: &str = "open-meteo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityConfig {
    pub url: String,
    /// Timezone of the hourly time axis
    pub timezone: String,
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            url: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
            timezone: "Asia/Bangkok".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    #[serde(default)]
    hourly: Option<HourlyRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AirQualityResponse {
    Many(Vec<LocationResponse>),
    One(LocationResponse),
}

impl AirQualityResponse {
    fn into_locations(self) -> Vec<LocationResponse> {
        match self {
            AirQualityResponse::Many(locations) => locations,
            AirQualityResponse::One(location) => vec![location],
        }
    }
}

/// Client for the hourly air-quality API.
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    client: Client,
    config: AirQualityConfig,
    retry: RetryPolicy,
}

impl AirQualityClient {
    pub fn new(client: Client, config: AirQualityConfig, retry: RetryPolicy) -> Self {
        Self {
            client,
            config,
            retry,
        }
    }

    /// Hourly records of one day for each `(lat, lng)`, in input order.
    ///
    /// Entries the provider did not return are `None`.
    #[instrument(skip_all, fields(count = coords.len(), date = %date))]
    pub async fn fetch_day(
        &self,
        coords: &[(f64, f64)],
        date: NaiveDate,
    ) -> UpstreamResult<Vec<Option<HourlyRecord>>> {
        if coords.is_empty() {
            return Ok(Vec::new());
        }

        let latitudes = join_coords(coords.iter().map(|c| c.0));
        let longitudes = join_coords(coords.iter().map(|c| c.1));
        let day = format_api_date(date);

        let response: AirQualityResponse = self
            .retry
            .run(|| {
                let request = self.client.get(&self.config.url).query(&[
                    ("latitude", latitudes.as_str()),
                    ("longitude", longitudes.as_str()),
                    ("start_date", day.as_str()),
                    ("end_date", day.as_str()),
                    ("hourly", HOURLY_VARIABLES),
                    ("timezone", self.config.timezone.as_str()),
                ]);
                send_json(SERVICE, request)
            })
            .await?;

        let mut records: Vec<Option<HourlyRecord>> = response
            .into_locations()
            .into_iter()
            .map(|location| location.hourly)
            .collect();

        if records.len() != coords.len() {
            warn!(
                expected = coords.len(),
                received = records.len(),
                "Provider returned a different number of locations"
            );
        }
        records.resize(coords.len(), None);

        info!(
            locations = records.len(),
            with_data = records.iter().filter(|r| r.is_some()).count(),
            "Fetched hourly air quality"
        );
        Ok(records)
    }
}

fn join_coords(values: impl Iterator<Item = f64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}
