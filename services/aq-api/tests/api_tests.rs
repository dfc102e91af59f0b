//! End-to-end tests of the router against mock upstreams and a local raster directory.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aq_api::build_router;
use aq_api::config::{AqConfig, PointSourceMode};
use aq_api::state::AppState;
use test_utils::{
    bbox, dates, feature_info, points, provider_location, provider_location_empty,
    reverse_geocode, temp_test_dir, write_rasters, GeoTiffBuilder, STATIONS_JSON,
};
use upstream::RetryPolicy;

struct TestApp {
    router: Router,
    server: MockServer,
    _dir: TempDir,
}

/// A national 8x16 raster with one value everywhere.
fn flat_raster(value: f32) -> Vec<u8> {
    GeoTiffBuilder::new(8, 16, bbox::VIETNAM)
        .values(vec![value; 128])
        .build()
}

fn pm25_name(date: &str) -> String {
    format!("PM25_{}_3km.tif", date.replace('-', ""))
}

async fn test_app(mode: PointSourceMode) -> TestApp {
    let server = MockServer::start().await;
    let dir = temp_test_dir();

    // every day of the week except 2024-05-03
    let mut rasters: Vec<(String, Vec<u8>)> = dates::WEEK
        .iter()
        .enumerate()
        .filter(|(_, date)| **date != "2024-05-03")
        .map(|(i, date)| (pm25_name(date), flat_raster(10.0 + i as f32)))
        .collect();
    rasters.push((
        "DEM_VN_3km.tif".to_string(),
        GeoTiffBuilder::new(8, 16, bbox::VIETNAM)
            .values(vec![150.0; 128])
            .as_u16()
            .build(),
    ));
    let borrowed: Vec<(&str, Vec<u8>)> = rasters
        .iter()
        .map(|(name, data)| (name.as_str(), data.clone()))
        .collect();
    write_rasters(dir.path(), &borrowed);

    let stations_path = dir.path().join("all_stations.json");
    std::fs::write(&stations_path, STATIONS_JSON).unwrap();

    let mut config = AqConfig::default();
    config.stations_path = stations_path.to_string_lossy().into_owned();
    config.point_source = mode;
    config.retry = RetryPolicy::none();
    config.rasters.base = dir.path().to_string_lossy().into_owned();
    config.air_quality.url = format!("{}/v1/air-quality", server.uri());
    config.geocoder.url = server.uri();
    config.wms.url = format!("{}/geoserver/air_quality/wms", server.uri());

    let metrics = PrometheusBuilder::new().build_recorder().handle();
    let state = AppState::new(config, metrics).await.unwrap();

    TestApp {
        router: build_router(Arc::new(state)),
        server,
        _dir: dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn mount_provider(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .and(query_param("start_date", dates::CENTER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            provider_location(dates::CENTER),
            provider_location_empty(dates::CENTER),
        ])))
        .mount(server)
        .await;
}

async fn mount_geocoder(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(reverse_geocode("Hoàn Kiếm, Hà Nội")),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_stations_for_a_day() {
    let app = test_app(PointSourceMode::Geotiff).await;
    mount_provider(&app.server).await;

    let (status, body) = get_json(&app.router, "/api/stations/2024-05-01").await;
    assert_eq!(status, StatusCode::OK);

    let stations = body["stations"].as_array().unwrap();
    assert_eq!(stations.len(), 3);

    let hanoi = &stations[0];
    assert_eq!(hanoi["id"], "1");
    assert_eq!(hanoi["address"], "Hanoi");
    assert_eq!(hanoi["status"], "active");
    assert_eq!(hanoi["lastUpdate"], "2024-05-01");
    assert_eq!(hanoi["environmentalData"]["aqi"], 63.0);
    assert_eq!(hanoi["environmentalData"]["pm25"], 21.8);
    assert_eq!(
        hanoi["environmentalData"]["hourly"]["us_aqi"].as_array().unwrap().len(),
        24
    );

    // all-null day and a station the provider skipped
    for station in &stations[1..] {
        assert_eq!(station["status"], "maintenance");
        assert!(station["environmentalData"]["aqi"].is_null());
    }
    assert_eq!(stations[2]["address"], "Vietnam");
}

#[tokio::test]
async fn test_station_hour_projection() {
    let app = test_app(PointSourceMode::Geotiff).await;
    mount_provider(&app.server).await;

    let (status, body) = get_json(&app.router, "/api/stations/2024-05-01/hours/5").await;
    assert_eq!(status, StatusCode::OK);

    let hanoi = &body["stations"][0];
    assert_eq!(hanoi["lastUpdate"], "2024-05-01 05:00");
    assert_eq!(hanoi["environmentalData"]["aqi"], 45.0);
    // pm2_5 is missing at hour 5
    assert!(hanoi["environmentalData"].get("pm25").is_none());
    assert!(hanoi["environmentalData"].get("hourly").is_none());

    let (status, body) = get_json(&app.router, "/api/stations/2024-05-01/hours/24").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("hour"));
}

#[tokio::test]
async fn test_stations_bad_date_and_provider_failure() {
    let app = test_app(PointSourceMode::Geotiff).await;
    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&app.server)
        .await;

    let (status, _) = get_json(&app.router, "/api/stations/05-01-2024").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&app.router, "/api/stations/2024-05-01").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch data from Open-Meteo");
}

#[tokio::test]
async fn test_map_info_samples_raster() {
    let app = test_app(PointSourceMode::Geotiff).await;
    mount_geocoder(&app.server, 200).await;
    let (lat, lng) = points::HANOI;

    let (status, body) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": lat, "lng": lng, "time": "2024-05-01", "layerName": "PM25"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 2024-05-01 is the fourth day of the week
    assert_eq!(body["value"], 13.0);
    assert_eq!(body["locationName"], "Hoàn Kiếm, Hà Nội");

    let (status, body) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": lat, "lng": lng, "layerName": "DEM"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], 150.0);
}

#[tokio::test]
async fn test_map_info_outside_raster_and_geocoder_down() {
    let app = test_app(PointSourceMode::Geotiff).await;
    mount_geocoder(&app.server, 503).await;
    let (lat, lng) = points::TOKYO;

    let (status, body) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": lat, "lng": lng, "time": "2024-05-01", "layerName": "PM25"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_null());
    assert_eq!(body["locationName"], "Đang xác định...");
}

#[tokio::test]
async fn test_map_info_missing_raster_is_no_data() {
    let app = test_app(PointSourceMode::Geotiff).await;
    mount_geocoder(&app.server, 200).await;

    let (status, body) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": 21.0, "lng": 105.8, "time": "2024-05-03", "layerName": "PM25"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_null());
}

#[tokio::test]
async fn test_map_info_rejects_bad_requests() {
    let app = test_app(PointSourceMode::Geotiff).await;

    let (status, body) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": 21.0, "lng": 105.8, "time": "2024-05-01", "layerName": "NO2"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown layer: NO2");

    let (status, _) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": 95.0, "lng": 105.8, "layerName": "DEM"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/map-info")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"lat\": "))
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_chart_week_with_one_missing_day() {
    let app = test_app(PointSourceMode::Geotiff).await;

    let (status, body) = post_json(
        &app.router,
        "/api/chart-data",
        json!({"lat": 21.0, "lng": 105.8, "centerDateStr": "2024-05-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 7);
    let labels: Vec<&str> = points.iter().map(|p| p["date"].as_str().unwrap()).collect();
    assert_eq!(
        labels,
        ["28/04", "29/04", "30/04", "01/05", "02/05", "03/05", "04/05"]
    );
    assert_eq!(points[0]["value"], 10.0);
    assert_eq!(points[4]["value"], 14.0);
    assert!(points[5]["value"].is_null());
    assert_eq!(points.iter().filter(|p| p["value"].is_null()).count(), 1);
}

#[tokio::test]
async fn test_chart_through_wms_isolates_failures() {
    let app = test_app(PointSourceMode::Wms).await;
    Mock::given(method("GET"))
        .and(path("/geoserver/air_quality/wms"))
        .and(query_param("time", "2024-04-30"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geoserver/air_quality/wms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feature_info(35.5)))
        .mount(&app.server)
        .await;

    let (status, body) = post_json(
        &app.router,
        "/api/chart-data",
        json!({"lat": 21.0, "lng": 105.8, "centerDateStr": "2024-05-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 7);
    assert!(points[2]["value"].is_null());
    for (i, point) in points.iter().enumerate().filter(|(i, _)| *i != 2) {
        assert_eq!(point["value"], 35.5, "day {}", i);
    }
}

#[tokio::test]
async fn test_chart_at_calendar_edge_is_bad_request() {
    let app = test_app(PointSourceMode::Geotiff).await;

    for center in ["+262142-12-31", "-262143-01-01"] {
        let (status, body) = post_json(
            &app.router,
            "/api/chart-data",
            json!({"lat": 21.0, "lng": 105.8, "centerDateStr": center}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "center {}", center);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_wms_nodata_sentinel_is_null() {
    let app = test_app(PointSourceMode::Wms).await;
    mount_geocoder(&app.server, 200).await;
    Mock::given(method("GET"))
        .and(path("/geoserver/air_quality/wms"))
        .and(query_param("time", "2024-05-02"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feature_info(-9999.0)))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geoserver/air_quality/wms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feature_info(35.5)))
        .mount(&app.server)
        .await;

    let (status, body) = post_json(
        &app.router,
        "/api/map-info",
        json!({"lat": 21.0, "lng": 105.8, "time": "2024-05-02", "layerName": "PM25"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_null());

    let (status, body) = post_json(
        &app.router,
        "/api/chart-data",
        json!({"lat": 21.0, "lng": 105.8, "centerDateStr": "2024-05-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let points = body.as_array().unwrap();
    assert!(points[4]["value"].is_null());
    assert_eq!(points[3]["value"], 35.5);
}

#[tokio::test]
async fn test_chart_requires_center_date() {
    let app = test_app(PointSourceMode::Geotiff).await;
    let (status, body) =
        post_json(&app.router, "/api/chart-data", json!({"lat": 21.0, "lng": 105.8})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("centerDateStr"));
}

#[tokio::test]
async fn test_raster_pass_through() {
    let app = test_app(PointSourceMode::Geotiff).await;
    let expected = flat_raster(13.0);

    let request = Request::builder()
        .uri("/api/raster-data?date=2024-05-01")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/tiff");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.as_ref(), expected.as_slice());

    let request = Request::builder()
        .uri("/api/tiff-proxy/DEM_VN_3km.tif")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());
}

#[tokio::test]
async fn test_raster_errors() {
    let app = test_app(PointSourceMode::Geotiff).await;

    let (status, _) = get_json(&app.router, "/api/raster-data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app.router, "/api/raster-data?file=..%2Fall_stations.json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&app.router, "/api/raster-data?date=2024-05-03").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("PM25_20240503_3km.tif"));

    let (status, _) = get_json(&app.router, "/api/tiff-proxy/PM25_19990101_3km.tif").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legends_health_and_readiness() {
    let app = test_app(PointSourceMode::Geotiff).await;

    let (status, body) = get_json(&app.router, "/api/legends").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tables"].as_array().unwrap().len(), 4);

    let (status, body) = get_json(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_json(&app.router, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["stations"], 3);
    assert_eq!(body["point_source"], "geotiff");

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}
