//! Affine georeferencing of north-up GeoTIFF rasters.
//!
//! Only PixelIsArea rasters without rotation are supported, which covers the
//! daily PM2.5 mosaics and the DEM: GDAL writes them with a single tiepoint at
//! pixel (0, 0) and a pixel scale.

use aq_common::BoundingBox;

use crate::error::{GeoTiffError, GeoTiffResult};

/// GeoTIFF tag numbers (not all are named by the `tiff` crate in every version).
pub mod tags {
    pub const MODEL_PIXEL_SCALE: u16 = 33550;
    pub const MODEL_TIEPOINT: u16 = 33922;
    pub const MODEL_TRANSFORMATION: u16 = 34264;
    pub const GDAL_NODATA: u16 = 42113;
}

/// Affine transform from pixel space to model (lon/lat) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoReference {
    /// Longitude of the left edge of column 0
    pub origin_x: f64,
    /// Latitude of the top edge of row 0
    pub origin_y: f64,
    /// Degrees of longitude per column (> 0)
    pub pixel_width: f64,
    /// Degrees of latitude per row (> 0, rows go south)
    pub pixel_height: f64,
}

impl GeoReference {
    /// Build from `ModelTiepointTag` (I, J, K, X, Y, Z, ...) and `ModelPixelScaleTag` (Sx, Sy, Sz).
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64]) -> GeoTiffResult<Self> {
        if tiepoint.len() < 6 {
            return Err(GeoTiffError::InvalidGeoreference(format!(
                "ModelTiepoint needs 6 values, got {}",
                tiepoint.len()
            )));
        }
        if scale.len() < 2 {
            return Err(GeoTiffError::InvalidGeoreference(format!(
                "ModelPixelScale needs 2 values, got {}",
                scale.len()
            )));
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);

        Self::checked(x - i * sx, y + j * sy, sx, sy)
    }

    /// Build from a 4x4 row-major `ModelTransformationTag`.
    pub fn from_transformation(matrix: &[f64]) -> GeoTiffResult<Self> {
        if matrix.len() < 16 {
            return Err(GeoTiffError::InvalidGeoreference(format!(
                "ModelTransformation needs 16 values, got {}",
                matrix.len()
            )));
        }
        if matrix[1] != 0.0 || matrix[4] != 0.0 {
            return Err(GeoTiffError::InvalidGeoreference(
                "rotated rasters are not supported".to_string(),
            ));
        }

        Self::checked(matrix[3], matrix[7], matrix[0], -matrix[5])
    }

    fn checked(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> GeoTiffResult<Self> {
        let finite = [origin_x, origin_y, pixel_width, pixel_height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || pixel_width <= 0.0 || pixel_height <= 0.0 {
            return Err(GeoTiffError::InvalidGeoreference(format!(
                "pixel size ({}, {}) at origin ({}, {})",
                pixel_width, pixel_height, origin_x, origin_y
            )));
        }

        Ok(Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        })
    }

    /// Extent covered by a `width` x `height` raster.
    pub fn bbox(&self, width: u32, height: u32) -> BoundingBox {
        BoundingBox::new(
            self.origin_x,
            self.origin_y - f64::from(height) * self.pixel_height,
            self.origin_x + f64::from(width) * self.pixel_width,
            self.origin_y,
        )
    }
}

/// Pixel holding a coordinate, or `None` when the coordinate is outside `bbox`.
///
/// ```text
/// x = floor(width  * (lng - min_lng) / (max_lng - min_lng))
/// y = floor(height * (max_lat - lat) / (max_lat - min_lat))
/// ```
///
/// A coordinate on the east or south edge maps past the last pixel and is
/// clamped onto it.
pub fn pixel_for(bbox: &BoundingBox, width: u32, height: u32, lat: f64, lng: f64) -> Option<(u32, u32)> {
    if width == 0 || height == 0 || !bbox.contains_point(lng, lat) {
        return None;
    }

    let fx = f64::from(width) * (lng - bbox.min_x) / bbox.width();
    let fy = f64::from(height) * (bbox.max_y - lat) / bbox.height();
    if !fx.is_finite() || !fy.is_finite() {
        return None;
    }

    let x = (fx.floor() as u32).min(width - 1);
    let y = (fy.floor() as u32).min(height - 1);
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiepoint_bbox() {
        // 0.03 degree (~3km) grid anchored at 102E, 23.5N
        let georef =
            GeoReference::from_tiepoint(&[0.0, 0.0, 0.0, 102.0, 23.5, 0.0], &[0.03, 0.03, 0.0])
                .unwrap();
        let bbox = georef.bbox(300, 500);
        assert!((bbox.min_x - 102.0).abs() < 1e-9);
        assert!((bbox.max_x - 111.0).abs() < 1e-9);
        assert!((bbox.max_y - 23.5).abs() < 1e-9);
        assert!((bbox.min_y - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_tiepoint_not_at_origin() {
        let georef =
            GeoReference::from_tiepoint(&[10.0, 20.0, 0.0, 101.0, 22.0, 0.0], &[0.1, 0.1, 0.0])
                .unwrap();
        assert!((georef.origin_x - 100.0).abs() < 1e-9);
        assert!((georef.origin_y - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_transformation_matrix() {
        let matrix = [
            0.5, 0.0, 0.0, 100.0, //
            0.0, -0.25, 0.0, 25.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        let georef = GeoReference::from_transformation(&matrix).unwrap();
        let bbox = georef.bbox(4, 8);
        assert_eq!(bbox, BoundingBox::new(100.0, 23.0, 102.0, 25.0));
    }

    #[test]
    fn test_rotated_transformation_rejected() {
        let matrix = [
            0.5, 0.1, 0.0, 100.0, //
            0.0, -0.25, 0.0, 25.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        assert!(GeoReference::from_transformation(&matrix).is_err());
    }

    #[test]
    fn test_short_transformation_rejected() {
        let two_rows = [
            0.5, 0.0, 0.0, 100.0, //
            0.0, -0.25, 0.0, 25.0,
        ];
        let err = GeoReference::from_transformation(&two_rows).unwrap_err();
        assert!(err.to_string().contains("needs 16 values, got 8"));
    }

    #[test]
    fn test_zero_scale_rejected() {
        assert!(GeoReference::from_tiepoint(&[0.0; 6], &[0.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_pixel_for() {
        let bbox = BoundingBox::new(100.0, 20.0, 110.0, 30.0);
        // 10 x 10 grid, 1 degree pixels
        assert_eq!(pixel_for(&bbox, 10, 10, 29.5, 100.5), Some((0, 0)));
        assert_eq!(pixel_for(&bbox, 10, 10, 20.5, 109.5), Some((9, 9)));
        assert_eq!(pixel_for(&bbox, 10, 10, 25.0, 105.0), Some((5, 5)));
        // east/south edges clamp onto the last pixel
        assert_eq!(pixel_for(&bbox, 10, 10, 20.0, 110.0), Some((9, 9)));
        // outside
        assert_eq!(pixel_for(&bbox, 10, 10, 19.99, 105.0), None);
        assert_eq!(pixel_for(&bbox, 10, 10, 25.0, 110.01), None);
    }
}
