//! Seven-day PM2.5 chart of a map point.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use aggregation::{build_chart_series, ChartPoint};
use aq_common::{parse_api_date, AqError, ChartWindow, RasterId};

use super::map_info::validate_coordinate;
use crate::error::{ApiError, ApiResult};
use crate::metrics::RequestTimer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub center_date_str: Option<String>,
}

/// POST /api/chart-data
pub async fn chart_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChartRequest>, JsonRejection>,
) -> Response {
    let timer = RequestTimer::start("chart");
    let result = chart(&state, payload).await;
    timer.finish(result.is_ok());

    match result {
        Ok(points) => Json(points).into_response(),
        Err(e) => e.public("Failed to fetch chart data"),
    }
}

async fn chart(
    state: &AppState,
    payload: Result<Json<ChartRequest>, JsonRejection>,
) -> ApiResult<Vec<ChartPoint>> {
    let Json(request) = payload.map_err(ApiError::from)?;

    let lat = request.lat.ok_or_else(|| AqError::MissingParameter("lat".into()))?;
    let lng = request.lng.ok_or_else(|| AqError::MissingParameter("lng".into()))?;
    let (lat, lng) = validate_coordinate(lat, lng)?;
    let center = request
        .center_date_str
        .as_deref()
        .ok_or_else(|| AqError::MissingParameter("centerDateStr".into()))?;
    let center = parse_api_date(center)?;

    let source = Arc::clone(&state.point_source);
    let points = build_chart_series(ChartWindow::week(center), |date| {
        let source = Arc::clone(&source);
        async move { source.value_at(RasterId::pm25(date), lat, lng).await }
    })
    .await?;

    Ok(points)
}
