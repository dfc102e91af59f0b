//! GeoTIFF georeferencing and single-pixel sampling.
//!
//! Rasters are north-up, single-band (or band 0 of a multi-band file) grids in
//! EPSG:4326. Only the strip or tile holding the requested pixel is decoded.
//!
//! # Example
//!
//! ```ignore
//! use geotiff_parser::GeoTiffReader;
//!
//! let mut reader = GeoTiffReader::new(bytes)?;
//! let value = reader.sample(21.03, 105.85)?; // Hanoi
//! ```

pub mod error;
pub mod georef;

pub use error::{GeoTiffError, GeoTiffResult};
pub use georef::{pixel_for, GeoReference};

use std::io::Cursor;

use aq_common::BoundingBox;
use bytes::Bytes;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, warn};

/// Values strictly below this are treated as missing.
pub const NODATA_THRESHOLD: f64 = -999.0;

/// NaN or a fill value below [`NODATA_THRESHOLD`], whatever the raster's own tag says.
pub fn is_missing_value(value: f64) -> bool {
    value.is_nan() || value < NODATA_THRESHOLD
}

/// Size, extent and no-data value of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterMetadata {
    pub width: u32,
    pub height: u32,
    pub bbox: BoundingBox,
    /// Value from the `GDAL_NODATA` tag, if any.
    pub nodata: Option<f64>,
}

impl RasterMetadata {
    /// Whether a raw pixel value stands for missing data.
    pub fn is_nodata(&self, value: f64) -> bool {
        is_missing_value(value) || self.nodata.map_or(false, |nodata| value == nodata)
    }
}

/// Reader over an in-memory GeoTIFF.
pub struct GeoTiffReader {
    decoder: Decoder<Cursor<Bytes>>,
    metadata: RasterMetadata,
}

impl std::fmt::Debug for GeoTiffReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoTiffReader")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl GeoTiffReader {
    /// Parse the header and georeferencing of a GeoTIFF.
    pub fn new(data: Bytes) -> GeoTiffResult<Self> {
        let mut decoder = Decoder::new(Cursor::new(data))?;
        let (width, height) = decoder.dimensions()?;

        let georef = read_georeference(&mut decoder)?;
        let nodata = read_nodata(&mut decoder)?;
        let metadata = RasterMetadata {
            width,
            height,
            bbox: georef.bbox(width, height),
            nodata,
        };

        debug!(
            width,
            height,
            bbox = %metadata.bbox.to_wms_string(),
            nodata = ?nodata,
            "Opened GeoTIFF"
        );

        Ok(Self { decoder, metadata })
    }

    pub fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    /// Pixel holding a coordinate, `None` when outside the raster.
    pub fn pixel_for(&self, lat: f64, lng: f64) -> Option<(u32, u32)> {
        let m = &self.metadata;
        pixel_for(&m.bbox, m.width, m.height, lat, lng)
    }

    /// Raw band 0 value of one pixel.
    pub fn read_pixel(&mut self, x: u32, y: u32) -> GeoTiffResult<f64> {
        let (width, height) = (self.metadata.width, self.metadata.height);
        if x >= width || y >= height {
            return Err(GeoTiffError::PixelOutOfRange {
                x,
                y,
                width,
                height,
            });
        }

        let (chunk_w, chunk_h) = self.decoder.chunk_dimensions();
        if chunk_w == 0 || chunk_h == 0 {
            return Err(GeoTiffError::InvalidGeoreference(format!(
                "chunk size {}x{}",
                chunk_w, chunk_h
            )));
        }
        let chunks_across = (width + chunk_w - 1) / chunk_w;
        let chunk_index = (y / chunk_h) * chunks_across + x / chunk_w;

        let (data_w, data_h) = self.decoder.chunk_data_dimensions(chunk_index);
        let chunk = self.decoder.read_chunk(chunk_index)?;

        let pixels = data_w as usize * data_h as usize;
        let len = decoded_len(&chunk);
        if pixels == 0 || len < pixels {
            return Err(GeoTiffError::UnsupportedSampleFormat(format!(
                "chunk {} holds {} samples for {}x{} pixels",
                chunk_index, len, data_w, data_h
            )));
        }
        let samples_per_pixel = len / pixels;
        let offset =
            ((y % chunk_h) as usize * data_w as usize + (x % chunk_w) as usize) * samples_per_pixel;

        sample_at(&chunk, offset).ok_or_else(|| {
            GeoTiffError::UnsupportedSampleFormat(format!("no sample at offset {}", offset))
        })
    }

    /// Value at a coordinate, `None` outside the raster or on missing data.
    pub fn sample(&mut self, lat: f64, lng: f64) -> GeoTiffResult<Option<f64>> {
        let Some((x, y)) = self.pixel_for(lat, lng) else {
            return Ok(None);
        };
        let value = self.read_pixel(x, y)?;
        if self.metadata.is_nodata(value) {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

/// Sample a coordinate from raw GeoTIFF bytes.
///
/// Decode failures are logged and reported as missing data.
pub fn sample_bytes(data: Bytes, lat: f64, lng: f64) -> Option<f64> {
    let result = GeoTiffReader::new(data).and_then(|mut reader| reader.sample(lat, lng));
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, lat, lng, "GeoTIFF sampling failed");
            None
        }
    }
}

fn read_georeference(decoder: &mut Decoder<Cursor<Bytes>>) -> GeoTiffResult<GeoReference> {
    let scale = read_f64_tag(decoder, georef::tags::MODEL_PIXEL_SCALE)?;
    let tiepoint = read_f64_tag(decoder, georef::tags::MODEL_TIEPOINT)?;

    if let (Some(tiepoint), Some(scale)) = (tiepoint, scale) {
        return GeoReference::from_tiepoint(&tiepoint, &scale);
    }

    match read_f64_tag(decoder, georef::tags::MODEL_TRANSFORMATION)? {
        Some(matrix) => GeoReference::from_transformation(&matrix),
        None => Err(GeoTiffError::MissingGeoreference),
    }
}

fn read_f64_tag(decoder: &mut Decoder<Cursor<Bytes>>, code: u16) -> GeoTiffResult<Option<Vec<f64>>> {
    match decoder.find_tag(Tag::from_u16_exhaustive(code))? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

/// `GDAL_NODATA` is an ASCII tag, e.g. `"-9999"` or `"nan"`.
fn read_nodata(decoder: &mut Decoder<Cursor<Bytes>>) -> GeoTiffResult<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::from_u16_exhaustive(georef::tags::GDAL_NODATA))? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    let parsed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace()).parse::<f64>();
    match parsed {
        Ok(nodata) => Ok(Some(nodata)),
        Err(_) => {
            warn!(nodata = %text, "Ignoring unparseable GDAL_NODATA");
            Ok(None)
        }
    }
}

fn decoded_len(chunk: &DecodingResult) -> usize {
    match chunk {
        DecodingResult::U8(v) => v.len(),
        DecodingResult::U16(v) => v.len(),
        DecodingResult::U32(v) => v.len(),
        DecodingResult::U64(v) => v.len(),
        DecodingResult::I8(v) => v.len(),
        DecodingResult::I16(v) => v.len(),
        DecodingResult::I32(v) => v.len(),
        DecodingResult::I64(v) => v.len(),
        DecodingResult::F32(v) => v.len(),
        DecodingResult::F64(v) => v.len(),
        #[allow(unreachable_patterns)]
        _ => 0,
    }
}

fn sample_at(chunk: &DecodingResult, offset: usize) -> Option<f64> {
    match chunk {
        DecodingResult::U8(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::U16(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::U32(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::U64(v) => v.get(offset).map(|&s| s as f64),
        DecodingResult::I8(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::I16(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::I32(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::I64(v) => v.get(offset).map(|&s| s as f64),
        DecodingResult::F32(v) => v.get(offset).map(|&s| f64::from(s)),
        DecodingResult::F64(v) => v.get(offset).copied(),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}
