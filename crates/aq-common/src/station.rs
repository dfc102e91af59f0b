//! Station and environmental data types exchanged with the map client.

use serde::{Deserialize, Deserializer, Serialize};

/// Hourly variables requested from the air-quality provider, in provider naming.
pub const HOURLY_VARIABLES: &str =
    "us_aqi,pm2_5,pm10,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone";

/// Number of hourly entries in a complete station day.
pub const HOURS_PER_DAY: usize = 24;

/// Fallback address when the station name carries no locality segment.
pub const DEFAULT_ADDRESS: &str = "Vietnam";

/// An entry of the static station list (`all_stations.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    /// `[lat, lng]`
    pub geo: [f64; 2],
}

impl BaseStation {
    pub fn lat(&self) -> f64 {
        self.geo[0]
    }

    pub fn lng(&self) -> f64 {
        self.geo[1]
    }

    /// Locality part of names like `"Station 12 / Hanoi"`.
    pub fn address(&self) -> String {
        self.name
            .split('/')
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ADDRESS)
            .to_string()
    }
}

/// Station ids appear both as numbers and as strings in station lists.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

/// Pollutant metrics tracked per station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Aqi,
    Pm25,
    Pm10,
    Co,
    No2,
    So2,
    O3,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Aqi,
        Metric::Pm25,
        Metric::Pm10,
        Metric::Co,
        Metric::No2,
        Metric::So2,
        Metric::O3,
    ];

    /// Pollutants that are averaged over the day (everything except AQI).
    pub const POLLUTANTS: [Metric; 6] = [
        Metric::Pm25,
        Metric::Pm10,
        Metric::Co,
        Metric::No2,
        Metric::So2,
        Metric::O3,
    ];

    /// Field name in the provider's hourly block.
    pub fn provider_key(&self) -> &'static str {
        match self {
            Metric::Aqi => "us_aqi",
            Metric::Pm25 => "pm2_5",
            Metric::Pm10 => "pm10",
            Metric::Co => "carbon_monoxide",
            Metric::No2 => "nitrogen_dioxide",
            Metric::So2 => "sulphur_dioxide",
            Metric::O3 => "ozone",
        }
    }
}

/// Hourly block of one station-day as returned by the provider.
///
/// Field names follow the provider so the block can be forwarded verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub us_aqi: Vec<Option<f64>>,
    #[serde(default)]
    pub pm2_5: Vec<Option<f64>>,
    #[serde(default)]
    pub pm10: Vec<Option<f64>>,
    #[serde(default)]
    pub carbon_monoxide: Vec<Option<f64>>,
    #[serde(default)]
    pub nitrogen_dioxide: Vec<Option<f64>>,
    #[serde(default)]
    pub sulphur_dioxide: Vec<Option<f64>>,
    #[serde(default)]
    pub ozone: Vec<Option<f64>>,
}

impl HourlyRecord {
    /// The hourly series of a metric.
    pub fn series(&self, metric: Metric) -> &[Option<f64>] {
        match metric {
            Metric::Aqi => &self.us_aqi,
            Metric::Pm25 => &self.pm2_5,
            Metric::Pm10 => &self.pm10,
            Metric::Co => &self.carbon_monoxide,
            Metric::No2 => &self.nitrogen_dioxide,
            Metric::So2 => &self.sulphur_dioxide,
            Metric::O3 => &self.ozone,
        }
    }

    /// Number of hours on the time axis.
    pub fn hours(&self) -> usize {
        self.time.len()
    }
}

/// Operating status derived from data availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Active,
    Maintenance,
}

/// Pollutant values of a station, either daily aggregates or a single hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    /// `null` when no AQI is available.
    pub aqi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlyRecord>,
}

impl EnvironmentalData {
    /// Scalar value of a metric.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Aqi => self.aqi,
            Metric::Pm25 => self.pm25,
            Metric::Pm10 => self.pm10,
            Metric::Co => self.co,
            Metric::No2 => self.no2,
            Metric::So2 => self.so2,
            Metric::O3 => self.o3,
        }
    }

    /// Set the scalar value of a metric.
    pub fn set_value(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Aqi => &mut self.aqi,
            Metric::Pm25 => &mut self.pm25,
            Metric::Pm10 => &mut self.pm10,
            Metric::Co => &mut self.co,
            Metric::No2 => &mut self.no2,
            Metric::So2 => &mut self.so2,
            Metric::O3 => &mut self.o3,
        };
        *slot = value;
    }
}

/// A monitoring station as served to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub status: StationStatus,
    pub last_update: String,
    pub environmental_data: EnvironmentalData,
}
