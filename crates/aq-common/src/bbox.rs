//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in EPSG:4326 degrees.
///
/// `x` is longitude and `y` is latitude, matching the WMS 1.1.1 axis order
/// used by GeoServer and the GeoTIFF model space of the rasters we serve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A square box of `half_size` degrees around a point.
    pub fn around_point(lng: f64, lat: f64, half_size: f64) -> Self {
        Self::new(lng - half_size, lat - half_size, lng + half_size, lat + half_size)
    }

    /// Format as a WMS BBOX parameter.
    pub fn to_wms_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wms_bbox_axis_order() {
        let bbox = BoundingBox::new(102.0, 8.0, 110.0, 23.5);
        assert_eq!(bbox.to_wms_string(), "102,8,110,23.5");
    }

    #[test]
    fn test_around_point() {
        let bbox = BoundingBox::around_point(105.85, 21.02, 0.01);
        assert!((bbox.width() - 0.02).abs() < 1e-9);
        assert!((bbox.height() - 0.02).abs() < 1e-9);
        assert!(bbox.contains_point(105.85, 21.02));
    }
}
