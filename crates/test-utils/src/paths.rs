//! Path utilities for locating map artifacts and writing temporary ones.

use std::path::PathBuf;

use dustmap_store::{MapWriter, PixelTable, StoreConfig, ZarrCompression};

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a real map artifact.
///
/// This function checks the following locations in order:
/// 1. The directory named by `DUSTMAP_TEST_MAP` (if set)
/// 2. `testdata/<name>` under the workspace root
///
/// # Returns
///
/// `Some(PathBuf)` if the directory is found, `None` otherwise.
pub fn find_test_map(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(path) = std::env::var("DUSTMAP_TEST_MAP") {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(workspace_root().join("testdata").join(name));

    candidates.into_iter().find(|path| path.is_dir())
}

/// Writes `table` to an uncompressed artifact in a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped.
///
/// # Returns
///
/// The temporary directory and the path of the artifact inside it.
pub fn write_temp_map(table: &PixelTable, map_name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("dustmap_test_")
        .tempdir()
        .expect("Failed to create temporary test directory");
    let path = dir.path().join("map.zarr");

    let config = StoreConfig {
        compression: ZarrCompression::None,
        chunk_rows: 16,
        ..Default::default()
    };
    MapWriter::new(config)
        .write(&path, table, map_name)
        .expect("Failed to write test map");

    (dir, path)
}
