//! Common test fixtures for aq-map tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios: the Vietnam raster extent, provider responses and station lists.

/// Common bounding box definitions for testing, as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Extent of the national PM2.5 and DEM rasters
    pub const VIETNAM: (f64, f64, f64, f64) = (102.0, 8.0, 110.0, 24.0);

    /// A small box around Hanoi
    pub const HANOI: (f64, f64, f64, f64) = (105.0, 20.5, 106.5, 21.5);

    /// 10 x 10 degree box with 1 degree pixels on a 10 x 10 raster
    pub const SIMPLE_10X10: (f64, f64, f64, f64) = (100.0, 20.0, 110.0, 30.0);
}

/// Well-known coordinates as (lat, lng).
pub mod points {
    pub const HANOI: (f64, f64) = (21.0285, 105.8542);
    pub const HO_CHI_MINH_CITY: (f64, f64) = (10.8231, 106.6297);
    pub const DA_NANG: (f64, f64) = (16.0544, 108.2022);
    /// Outside every raster in the fixtures
    pub const TOKYO: (f64, f64) = (35.6762, 139.6503);
}

/// Dates with raster/provider data in the fixtures.
pub mod dates {
    pub const CENTER: &str = "2024-05-01";
    pub const WEEK: [&str; 7] = [
        "2024-04-28",
        "2024-04-29",
        "2024-04-30",
        "2024-05-01",
        "2024-05-02",
        "2024-05-03",
        "2024-05-04",
    ];
}

/// A three-station list in `all_stations.json` format.
pub const STATIONS_JSON: &str = r#"[
    {"id": 1, "name": "Nguyen Van Cu / Hanoi", "geo": [21.0491, 105.8831]},
    {"id": 2, "name": "District 1 / Ho Chi Minh City", "geo": [10.7820, 106.7000]},
    {"id": "dn-3", "name": "Son Tra", "geo": [16.0600, 108.2400]}
]"#;

/// One coordinate's entry of an air-quality provider response.
///
/// AQI ramps 40..63, PM2.5 ramps 10.0..33.0 with hour 5 missing.
pub fn provider_location(date: &str) -> serde_json::Value {
    let series = |start: f64, step: f64, gaps: &[usize]| {
        serde_json::to_value(crate::hourly_series(start, step, gaps)).unwrap_or_default()
    };
    serde_json::json!({
        "latitude": 21.05,
        "longitude": 105.88,
        "hourly_units": {"us_aqi": "USAQI", "pm2_5": "μg/m³"},
        "hourly": {
            "time": crate::hourly_time_axis(date, 24),
            "us_aqi": series(40.0, 1.0, &[]),
            "pm2_5": series(10.0, 1.0, &[5]),
            "pm10": series(20.0, 0.5, &[]),
            "carbon_monoxide": series(200.0, 2.0, &[]),
            "nitrogen_dioxide": series(15.0, 0.1, &[]),
            "sulphur_dioxide": series(5.0, 0.0, &[]),
            "ozone": series(60.0, 0.5, &[])
        }
    })
}

/// A provider entry with every hourly value missing.
pub fn provider_location_empty(date: &str) -> serde_json::Value {
    let nulls = serde_json::Value::Array(vec![serde_json::Value::Null; 24]);
    serde_json::json!({
        "latitude": 10.78,
        "longitude": 106.70,
        "hourly": {
            "time": crate::hourly_time_axis(date, 24),
            "us_aqi": nulls.clone(),
            "pm2_5": nulls.clone(),
            "pm10": nulls.clone(),
            "carbon_monoxide": nulls.clone(),
            "nitrogen_dioxide": nulls.clone(),
            "sulphur_dioxide": nulls.clone(),
            "ozone": nulls
        }
    })
}

/// GeoServer `GetFeatureInfo` JSON for one pixel.
pub fn feature_info(gray_index: f64) -> serde_json::Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "",
            "geometry": null,
            "properties": {"GRAY_INDEX": gray_index}
        }],
        "crs": null
    })
}

/// Nominatim reverse geocoding response.
pub fn reverse_geocode(display_name: &str) -> serde_json::Value {
    serde_json::json!({
        "place_id": 1,
        "lat": "21.0285",
        "lon": "105.8542",
        "display_name": display_name
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stations_json_parses() {
        let value: serde_json::Value = serde_json::from_str(STATIONS_JSON).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_provider_location_shape() {
        let loc = provider_location(dates::CENTER);
        assert_eq!(loc["hourly"]["time"].as_array().unwrap().len(), 24);
        assert!(loc["hourly"]["pm2_5"][5].is_null());
        assert_eq!(loc["hourly"]["us_aqi"][23], 63.0);
    }

    #[test]
    fn test_points_inside_vietnam() {
        let (min_lon, min_lat, max_lon, max_lat) = bbox::VIETNAM;
        for (lat, lng) in [points::HANOI, points::HO_CHI_MINH_CITY, points::DA_NANG] {
            assert!(lng >= min_lon && lng <= max_lon && lat >= min_lat && lat <= max_lat);
        }
    }
}
