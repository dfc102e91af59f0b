//! Raw raster pass-through for the map client.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use aq_common::raster::is_safe_file_name;
use aq_common::{parse_api_date, AqError, RasterId};

use crate::error::ApiResult;
use crate::metrics::RequestTimer;
use crate::state::AppState;

const RASTER_FAILURE: &str = "Failed to fetch raster";

#[derive(Debug, Deserialize)]
pub struct RasterQuery {
    /// `YYYY-MM-DD` of a PM2.5 raster
    pub date: Option<String>,
    /// Explicit file name, e.g. `DEM_VN_3km.tif`
    pub file: Option<String>,
}

impl RasterQuery {
    /// File name to fetch. `file` wins when both are given.
    pub fn file_name(&self) -> Result<String, AqError> {
        match (&self.file, &self.date) {
            (Some(file), _) => checked_file_name(file),
            (None, Some(date)) => Ok(RasterId::pm25(parse_api_date(date)?).file_name()),
            (None, None) => Err(AqError::MissingParameter("date or file".into())),
        }
    }
}

fn checked_file_name(name: &str) -> Result<String, AqError> {
    if is_safe_file_name(name) {
        Ok(name.to_string())
    } else {
        Err(AqError::invalid("file", "not a raster file name"))
    }
}

/// GET /api/raster-data?date=YYYY-MM-DD | ?file=NAME
pub async fn raster_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<RasterQuery>,
) -> Response {
    let timer = RequestTimer::start("raster_data");
    let result = match query.file_name() {
        Ok(name) => stream_raster(&state, &name).await,
        Err(e) => Err(e.into()),
    };
    timer.finish(result.is_ok());

    result.unwrap_or_else(|e| e.public(RASTER_FAILURE))
}

/// GET /api/tiff-proxy/:file
pub async fn tiff_proxy_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(file): Path<String>,
) -> Response {
    let timer = RequestTimer::start("tiff_proxy");
    let result = match checked_file_name(&file) {
        Ok(name) => stream_raster(&state, &name).await,
        Err(e) => Err(e.into()),
    };
    timer.finish(result.is_ok());

    result.unwrap_or_else(|e| e.public(RASTER_FAILURE))
}

async fn stream_raster(state: &AppState, name: &str) -> ApiResult<Response> {
    let object = state.raster_cache.store().get_stream(name).await?;
    info!(raster = name, size = object.size, "Streaming raster");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/tiff".to_string()),
            (header::CONTENT_LENGTH, object.size.to_string()),
        ],
        Body::from_stream(object.stream),
    )
        .into_response())
}
