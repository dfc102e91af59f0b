//! Station list with daily aggregates or a single hour.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;

use aggregation::{build_station, project_hour};
use aq_common::station::HOURS_PER_DAY;
use aq_common::{parse_api_date, AqError, Station};

use crate::error::ApiResult;
use crate::metrics::RequestTimer;
use crate::state::AppState;

const PROVIDER_FAILURE: &str = "Failed to fetch data from Open-Meteo";

#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
}

/// GET /api/stations/:date
pub async fn stations_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(date): Path<String>,
) -> Response {
    let timer = RequestTimer::start("stations");
    let result = daily_stations(&state, &date).await;
    timer.finish(result.is_ok());

    match result {
        Ok(stations) => Json(StationsResponse { stations }).into_response(),
        Err(e) => e.public(PROVIDER_FAILURE),
    }
}

/// GET /api/stations/:date/hours/:hour
pub async fn station_hour_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((date, hour)): Path<(String, String)>,
) -> Response {
    let timer = RequestTimer::start("station_hour");
    let result = hourly_stations(&state, &date, &hour).await;
    timer.finish(result.is_ok());

    match result {
        Ok(stations) => Json(StationsResponse { stations }).into_response(),
        Err(e) => e.public(PROVIDER_FAILURE),
    }
}

/// Every station of the list with the daily aggregates of `date`.
async fn daily_stations(state: &AppState, date: &str) -> ApiResult<Vec<Station>> {
    let day = parse_api_date(date)?;
    let records = state
        .air_quality
        .fetch_day(&state.station_coords(), day)
        .await?;

    let stations: Vec<Station> = state
        .stations
        .iter()
        .zip(records)
        .map(|(base, hourly)| build_station(base, day, hourly))
        .collect();

    info!(
        date = %day,
        stations = stations.len(),
        active = stations.iter().filter(|s| s.environmental_data.aqi.is_some()).count(),
        "Built station day"
    );
    Ok(stations)
}

async fn hourly_stations(state: &AppState, date: &str, hour: &str) -> ApiResult<Vec<Station>> {
    let hour = parse_hour(hour)?;
    let day = parse_api_date(date)?;
    let stations = daily_stations(state, date).await?;
    Ok(stations
        .iter()
        .map(|station| project_hour(station, day, hour))
        .collect())
}

fn parse_hour(value: &str) -> Result<usize, AqError> {
    match value.parse::<usize>() {
        Ok(hour) if hour < HOURS_PER_DAY => Ok(hour),
        _ => Err(AqError::invalid("hour", "expected an integer from 0 to 23")),
    }
}
