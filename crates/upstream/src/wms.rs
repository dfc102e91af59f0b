//! GeoServer WMS `GetFeatureInfo` client.
//!
//! Queries a raster mosaic for the value under a coordinate by asking for the
//! center pixel of a small box around it.

use aq_common::BoundingBox;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::send_json;
use crate::error::UpstreamResult;
use crate::retry::RetryPolicy;

const SERVICE: &str = "wms";

/// Half size in degrees of the box queried around a point.
const QUERY_HALF_SIZE: f64 = 0.01;
/// Width and height of the virtual map; odd so the point is the center pixel.
const QUERY_SIZE: u32 = 101;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmsConfig {
    /// WMS endpoint, e.g. `http://localhost:8080/geoserver/air_quality/wms`
    pub url: String,
    /// Time-enabled PM2.5 mosaic
    pub pm25_layer: String,
    /// Elevation coverage
    pub dem_layer: String,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/geoserver/air_quality/wms".to_string(),
            pm25_layer: "air_quality:imagemosaic".to_string(),
            dem_layer: "air_quality:DEM_VN_3km".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(rename = "GRAY_INDEX")]
    gray_index: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct FeatureInfoClient {
    client: Client,
    config: WmsConfig,
    retry: RetryPolicy,
}

impl FeatureInfoClient {
    pub fn new(client: Client, config: WmsConfig, retry: RetryPolicy) -> Self {
        Self {
            client,
            config,
            retry,
        }
    }

    pub fn config(&self) -> &WmsConfig {
        &self.config
    }

    /// `GRAY_INDEX` of the first feature at a coordinate, `None` when there is none.
    #[instrument(skip(self))]
    pub async fn value_at(
        &self,
        layer: &str,
        time: Option<&str>,
        lat: f64,
        lng: f64,
    ) -> UpstreamResult<Option<f64>> {
        let bbox = BoundingBox::around_point(lng, lat, QUERY_HALF_SIZE).to_wms_string();
        let size = QUERY_SIZE.to_string();
        let center = (QUERY_SIZE / 2).to_string();

        let collection: FeatureCollection = self
            .retry
            .run(|| {
                let mut params: Vec<(&str, &str)> = vec![
                    ("service", "WMS"),
                    ("version", "1.1.1"),
                    ("request", "GetFeatureInfo"),
                    ("layers", layer),
                    ("query_layers", layer),
                    ("info_format", "application/json"),
                    ("feature_count", "1"),
                    ("srs", "EPSG:4326"),
                    ("bbox", bbox.as_str()),
                    ("width", size.as_str()),
                    ("height", size.as_str()),
                    ("x", center.as_str()),
                    ("y", center.as_str()),
                ];
                if let Some(time) = time {
                    params.push(("time", time));
                }
                send_json(SERVICE, self.client.get(&self.config.url).query(&params))
            })
            .await?;

        Ok(collection
            .features
            .into_iter()
            .next()
            .and_then(|feature| feature.properties.gray_index))
    }
}
