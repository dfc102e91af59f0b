//! Storage abstractions for the air-quality map services.
//!
//! Provides:
//! - Raster host access (static HTTP file server or local directory)
//! - An in-memory LRU cache of raster bytes

pub mod error;
pub mod raster_cache;
pub mod raster_store;

pub use error::{StorageError, StorageResult};
pub use raster_cache::{CacheOutcome, CacheStats, RasterCache};
pub use raster_store::{ByteStream, RasterObject, RasterStore, RasterStoreConfig};
