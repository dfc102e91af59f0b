//! Test data generators for synthetic rasters and hourly series.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use std::io::Cursor;

use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

// baseline TIFF tags and field types for the hand-written tiled layout
const IMAGE_WIDTH: u16 = 256;
const IMAGE_LENGTH: u16 = 257;
const BITS_PER_SAMPLE: u16 = 258;
const COMPRESSION: u16 = 259;
const PHOTOMETRIC: u16 = 262;
const SAMPLES_PER_PIXEL: u16 = 277;
const PLANAR_CONFIGURATION: u16 = 284;
const TILE_WIDTH: u16 = 322;
const TILE_LENGTH: u16 = 323;
const TILE_OFFSETS: u16 = 324;
const TILE_BYTE_COUNTS: u16 = 325;
const SAMPLE_FORMAT: u16 = 339;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a sampled pixel is the expected one.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// How a synthetic GeoTIFF is georeferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Georeferencing {
    /// ModelTiepoint + ModelPixelScale (what GDAL writes)
    Tiepoint,
    /// ModelTransformation matrix
    Transformation,
    /// No georeferencing tags at all
    None,
}

/// Builder for in-memory single-band GeoTIFFs in EPSG:4326.
///
/// # Example
///
/// ```
/// use test_utils::GeoTiffBuilder;
///
/// let tiff = GeoTiffBuilder::new(4, 4, (100.0, 20.0, 104.0, 24.0))
///     .values(vec![1.0; 16])
///     .build();
/// assert!(tiff.len() > 16 * 4);
/// ```
#[derive(Debug, Clone)]
pub struct GeoTiffBuilder {
    width: u32,
    height: u32,
    /// (min_lon, min_lat, max_lon, max_lat)
    bbox: (f64, f64, f64, f64),
    values: Vec<f32>,
    nodata: Option<String>,
    rows_per_strip: Option<u32>,
    tile_size: Option<(u32, u32)>,
    georeferencing: Georeferencing,
    as_u16: bool,
}

impl GeoTiffBuilder {
    /// A raster filled with [`create_test_grid`] values.
    pub fn new(width: u32, height: u32, bbox: (f64, f64, f64, f64)) -> Self {
        Self {
            width,
            height,
            bbox,
            values: create_test_grid(width as usize, height as usize),
            nodata: None,
            rows_per_strip: None,
            tile_size: None,
            georeferencing: Georeferencing::Tiepoint,
            as_u16: false,
        }
    }

    /// Row-major pixel values, `width * height` of them.
    pub fn values(mut self, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            (self.width * self.height) as usize,
            "value count must match raster size"
        );
        self.values = values;
        self
    }

    /// Set one pixel.
    pub fn pixel(mut self, x: u32, y: u32, value: f32) -> Self {
        let idx = (y * self.width + x) as usize;
        self.values[idx] = value;
        self
    }

    /// Write a `GDAL_NODATA` tag.
    pub fn nodata(mut self, nodata: &str) -> Self {
        self.nodata = Some(nodata.to_string());
        self
    }

    /// Split the image into strips of `rows` rows.
    pub fn rows_per_strip(mut self, rows: u32) -> Self {
        self.rows_per_strip = Some(rows);
        self
    }

    /// Store the image as `width` x `height` tiles instead of strips.
    ///
    /// Edge tiles are zero padded, as the TIFF layout requires.
    pub fn tiled(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "tile size must be positive");
        self.tile_size = Some((width, height));
        self
    }

    pub fn georeferencing(mut self, georeferencing: Georeferencing) -> Self {
        self.georeferencing = georeferencing;
        self
    }

    /// Encode samples as 16-bit unsigned integers (DEM style).
    pub fn as_u16(mut self) -> Self {
        self.as_u16 = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        if let Some((tile_w, tile_h)) = self.tile_size {
            return self.build_tiled(tile_w, tile_h);
        }

        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).expect("tiff encoder");

            macro_rules! write_image {
                ($colortype:ty, $data:expr) => {{
                    let mut image = encoder
                        .new_image::<$colortype>(self.width, self.height)
                        .expect("new image");
                    for (tag, values) in self.georef_tags() {
                        image
                            .encoder()
                            .write_tag(Tag::Unknown(tag), &values[..])
                            .expect("georeferencing");
                    }
                    if let Some(nodata) = &self.nodata {
                        image
                            .encoder()
                            .write_tag(Tag::Unknown(GDAL_NODATA), nodata.as_str())
                            .expect("nodata");
                    }
                    if let Some(rows) = self.rows_per_strip {
                        image.rows_per_strip(rows).expect("rows per strip");
                    }
                    image.write_data($data).expect("image data");
                }};
            }

            if self.as_u16 {
                write_image!(colortype::Gray16, &self.u16_values());
            } else {
                write_image!(colortype::Gray32Float, &self.values);
            }
        }
        buf.into_inner()
    }

    /// GeoTIFF model tags for the configured georeferencing.
    fn georef_tags(&self) -> Vec<(u16, Vec<f64>)> {
        let (min_lon, min_lat, max_lon, max_lat) = self.bbox;
        let sx = (max_lon - min_lon) / f64::from(self.width);
        let sy = (max_lat - min_lat) / f64::from(self.height);

        match self.georeferencing {
            Georeferencing::Tiepoint => vec![
                (MODEL_PIXEL_SCALE, vec![sx, sy, 0.0]),
                (MODEL_TIEPOINT, vec![0.0, 0.0, 0.0, min_lon, max_lat, 0.0]),
            ],
            Georeferencing::Transformation => vec![(
                MODEL_TRANSFORMATION,
                vec![
                    sx, 0.0, 0.0, min_lon, //
                    0.0, -sy, 0.0, max_lat, //
                    0.0, 0.0, 0.0, 0.0, //
                    0.0, 0.0, 0.0, 1.0,
                ],
            )],
            Georeferencing::None => Vec::new(),
        }
    }

    fn u16_values(&self) -> Vec<u16> {
        self.values
            .iter()
            .map(|v| v.clamp(0.0, f32::from(u16::MAX)) as u16)
            .collect()
    }

    /// Little-endian tiled TIFF, written by hand since the encoder only writes strips.
    fn build_tiled(&self, tile_w: u32, tile_h: u32) -> Vec<u8> {
        let tiles_across = (self.width + tile_w - 1) / tile_w;
        let tiles_down = (self.height + tile_h - 1) / tile_h;
        let u16_values = self.as_u16.then(|| self.u16_values());

        // header, IFD offset patched in at the end
        let mut out = vec![b'I', b'I', 42, 0, 0, 0, 0, 0];
        let mut offsets = Vec::new();
        let mut byte_counts = Vec::new();
        for ty in 0..tiles_down {
            for tx in 0..tiles_across {
                let start = out.len();
                offsets.push(start as u32);
                for row in 0..tile_h {
                    for col in 0..tile_w {
                        let (x, y) = (tx * tile_w + col, ty * tile_h + row);
                        let idx = (x < self.width && y < self.height)
                            .then(|| (y * self.width + x) as usize);
                        match &u16_values {
                            Some(values) => out.extend_from_slice(
                                &idx.map_or(0, |i| values[i]).to_le_bytes(),
                            ),
                            None => out.extend_from_slice(
                                &idx.map_or(0.0, |i| self.values[i]).to_le_bytes(),
                            ),
                        }
                    }
                }
                byte_counts.push((out.len() - start) as u32);
            }
        }

        let (bits, sample_format) = if self.as_u16 { (16, 1) } else { (32, 3) };
        let mut entries = vec![
            IfdEntry::long(IMAGE_WIDTH, &[self.width]),
            IfdEntry::long(IMAGE_LENGTH, &[self.height]),
            IfdEntry::short(BITS_PER_SAMPLE, bits),
            IfdEntry::short(COMPRESSION, 1),
            IfdEntry::short(PHOTOMETRIC, 1),
            IfdEntry::short(SAMPLES_PER_PIXEL, 1),
            IfdEntry::short(PLANAR_CONFIGURATION, 1),
            IfdEntry::long(TILE_WIDTH, &[tile_w]),
            IfdEntry::long(TILE_LENGTH, &[tile_h]),
            IfdEntry::long(TILE_OFFSETS, &offsets),
            IfdEntry::long(TILE_BYTE_COUNTS, &byte_counts),
            IfdEntry::short(SAMPLE_FORMAT, sample_format),
        ];
        entries.extend(
            self.georef_tags()
                .into_iter()
                .map(|(tag, values)| IfdEntry::double(tag, &values)),
        );
        if let Some(nodata) = &self.nodata {
            entries.push(IfdEntry::ascii(GDAL_NODATA, nodata));
        }
        write_ifd(out, entries)
    }
}

/// One IFD field with its little-endian value bytes.
struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    data: Vec<u8>,
}

impl IfdEntry {
    fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            field_type: TYPE_SHORT,
            count: 1,
            data: value.to_le_bytes().to_vec(),
        }
    }

    fn long(tag: u16, values: &[u32]) -> Self {
        Self {
            tag,
            field_type: TYPE_LONG,
            count: values.len() as u32,
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    fn double(tag: u16, values: &[f64]) -> Self {
        Self {
            tag,
            field_type: TYPE_DOUBLE,
            count: values.len() as u32,
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    fn ascii(tag: u16, value: &str) -> Self {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        Self {
            tag,
            field_type: TYPE_ASCII,
            count: data.len() as u32,
            data,
        }
    }
}

/// Append the out-of-line values and a single IFD, then point the header at it.
fn write_ifd(mut out: Vec<u8>, mut entries: Vec<IfdEntry>) -> Vec<u8> {
    entries.sort_by_key(|e| e.tag);

    let mut fields = Vec::with_capacity(entries.len());
    for entry in &entries {
        let mut field = [0u8; 4];
        if entry.data.len() <= 4 {
            field[..entry.data.len()].copy_from_slice(&entry.data);
        } else {
            if out.len() % 2 == 1 {
                out.push(0);
            }
            field = (out.len() as u32).to_le_bytes();
            out.extend_from_slice(&entry.data);
        }
        fields.push(field);
    }

    if out.len() % 2 == 1 {
        out.push(0);
    }
    let ifd_offset = out.len() as u32;
    out[4..8].copy_from_slice(&ifd_offset.to_le_bytes());

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (entry, field) in entries.iter().zip(fields) {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.field_type.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        out.extend_from_slice(&field);
    }
    // no next IFD
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

/// A 24-entry hourly series with `None` at the given hours.
///
/// Values ramp from `start` by `step` per hour.
pub fn hourly_series(start: f64, step: f64, gaps: &[usize]) -> Vec<Option<f64>> {
    (0..24)
        .map(|h| {
            if gaps.contains(&h) {
                None
            } else {
                Some(start + step * h as f64)
            }
        })
        .collect()
}

/// Provider time axis `YYYY-MM-DDTHH:00` for one day.
pub fn hourly_time_axis(date: &str, hours: usize) -> Vec<String> {
    (0..hours).map(|h| format!("{}T{:02}:00", date, h)).collect()
}
