//! Category tables used to color markers and raster legends.

use axum::Json;
use serde::Serialize;

use aq_common::category::{ALL_TABLES, NO_DATA_COLOR};
use aq_common::CategoryTable;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendsResponse {
    pub no_data_color: &'static str,
    pub tables: Vec<CategoryTable>,
}

/// GET /api/legends
pub async fn legends_handler() -> Json<LegendsResponse> {
    Json(LegendsResponse {
        no_data_color: NO_DATA_COLOR,
        tables: ALL_TABLES.iter().map(|table| **table).collect(),
    })
}
