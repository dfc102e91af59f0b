//! Error types for GeoTIFF parsing operations.

use thiserror::Error;

/// Result type for GeoTIFF parser operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Error types for GeoTIFF parsing.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// The TIFF container could not be decoded
    #[error("TIFF decode error: {0}")]
    Decode(#[from] tiff::TiffError),

    /// Neither tiepoint+scale nor a transformation matrix is present
    #[error("Missing georeferencing tags (ModelTiepoint/ModelPixelScale or ModelTransformation)")]
    MissingGeoreference,

    /// Georeferencing tags are present but unusable
    #[error("Invalid georeferencing: {0}")]
    InvalidGeoreference(String),

    /// Sample type the sampler does not understand
    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    /// Pixel index past the raster size
    #[error("Pixel ({x}, {y}) outside raster of {width}x{height}")]
    PixelOutOfRange { x: u32, y: u32, width: u32, height: u32 },
}

impl From<GeoTiffError> for aq_common::AqError {
    fn from(err: GeoTiffError) -> Self {
        aq_common::AqError::RasterDecode(err.to_string())
    }
}
