//! Air-quality map API service library.
//!
//! HTTP backend of the air-quality dashboard: station lists built from the
//! hourly provider, point values sampled from PM2.5 and elevation rasters,
//! seven-day charts and raw raster pass-through.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod point_source;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Stations
        .route("/api/stations/:date", get(handlers::stations_handler))
        .route(
            "/api/stations/:date/hours/:hour",
            get(handlers::station_hour_handler),
        )
        // Point queries
        .route("/api/map-info", post(handlers::map_info_handler))
        .route("/api/chart-data", post(handlers::chart_handler))
        // Rasters
        .route("/api/raster-data", get(handlers::raster_data_handler))
        .route("/api/tiff-proxy/:file", get(handlers::tiff_proxy_handler))
        .route("/api/legends", get(handlers::legends_handler))
        // Health and metrics
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/metrics", get(handlers::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
