//! Path utilities for workspace files and temporary raster directories.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path of a file under the workspace `config/` directory.
pub fn config_file(name: &str) -> PathBuf {
    workspace_root().join("config").join(name)
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("aq_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Write raster files into a directory, as a local raster host would serve them.
pub fn write_rasters(dir: &Path, rasters: &[(&str, Vec<u8>)]) {
    for (name, bytes) in rasters {
        std::fs::write(dir.join(name), bytes).expect("Failed to write test raster");
    }
}
