//! Value and place name of a clicked map point.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use aq_common::{parse_api_date, AqError, RasterId, RasterLayer};

use crate::error::{ApiError, ApiResult};
use crate::metrics::RequestTimer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfoRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// `YYYY-MM-DD`, required for dated layers
    pub time: Option<String>,
    pub layer_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfoResponse {
    pub value: Option<f64>,
    pub location_name: String,
}

/// A validated map-info query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQuery {
    pub lat: f64,
    pub lng: f64,
    pub raster: RasterId,
}

impl MapInfoRequest {
    pub fn validate(&self) -> Result<PointQuery, AqError> {
        let lat = self.lat.ok_or_else(|| AqError::MissingParameter("lat".into()))?;
        let lng = self.lng.ok_or_else(|| AqError::MissingParameter("lng".into()))?;
        let (lat, lng) = validate_coordinate(lat, lng)?;

        let layer_name = self
            .layer_name
            .as_deref()
            .ok_or_else(|| AqError::MissingParameter("layerName".into()))?;
        let layer = RasterLayer::from_layer_name(layer_name)?;

        let date = match (layer, self.time.as_deref()) {
            (RasterLayer::Pm25, Some(time)) => Some(parse_api_date(time)?),
            _ => None,
        };

        Ok(PointQuery {
            lat,
            lng,
            raster: RasterId::for_layer(layer, date)?,
        })
    }
}

/// Reject non-finite and out-of-range coordinates.
pub fn validate_coordinate(lat: f64, lng: f64) -> Result<(f64, f64), AqError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AqError::invalid("lat", "must be between -90 and 90"));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(AqError::invalid("lng", "must be between -180 and 180"));
    }
    Ok((lat, lng))
}

/// POST /api/map-info
pub async fn map_info_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<MapInfoRequest>, JsonRejection>,
) -> Response {
    let timer = RequestTimer::start("map_info");
    let result = map_info(&state, payload).await;
    timer.finish(result.is_ok());

    match result {
        Ok(info) => Json(info).into_response(),
        Err(e) => e.public("Failed to query map value"),
    }
}

async fn map_info(
    state: &AppState,
    payload: Result<Json<MapInfoRequest>, JsonRejection>,
) -> ApiResult<MapInfoResponse> {
    let Json(request) = payload.map_err(ApiError::from)?;
    let query = request.validate()?;

    let (value, place) = tokio::join!(
        state.point_source.value_at(query.raster, query.lat, query.lng),
        state.geocoder.reverse(query.lat, query.lng),
    );

    let location_name = match place {
        Ok(Some(name)) => name,
        Ok(None) => state.config.location_placeholder.clone(),
        Err(e) => {
            warn!(error = %e, "Reverse geocoding failed");
            state.config.location_placeholder.clone()
        }
    };

    let value = value?;
    debug!(raster = %query.raster, ?value, "Map info");
    Ok(MapInfoResponse {
        value,
        location_name,
    })
}
