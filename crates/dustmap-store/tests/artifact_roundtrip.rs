//! Integration test: write a map artifact and load it back with MapReader.

use dustmap_store::{MapReader, MapWriter, PixelTable, StoreConfig, StoreError, ZarrCompression};

/// Build a small table with predictable values.
/// best[pixel][bin] = pixel + bin / 100, samples offset by sample / 10.
fn create_test_table(n_pix: usize, n_samples: usize, n_bins: usize) -> PixelTable {
    let mut table = PixelTable {
        n_bins,
        n_samples,
        distmod: (0..n_bins).map(|j| 4.0 + 0.5 * j as f64).collect(),
        ..Default::default()
    };

    for pix in 0..n_pix {
        table.nside.push(if pix < 6 { 1 } else { 2 });
        table.healpix_index.push(if pix < 6 { pix as u64 } else { 24 + pix as u64 });
        for bin in 0..n_bins {
            table.best.push(pix as f32 + bin as f32 / 100.0);
            table.gr.push(1.0 + bin as f32 / 1000.0);
        }
        for sample in 0..n_samples {
            for bin in 0..n_bins {
                table
                    .samples
                    .push(pix as f32 + bin as f32 / 100.0 + sample as f32 / 10.0);
            }
        }
        table.n_stars.push(100 + pix as u32);
        table.dm_reliable_min.push(5.0);
        table.dm_reliable_max.push(15.0 + pix as f32 / 10.0);
        table.ebv_sfd.push(pix as f32 * 0.01);
    }

    table
}

fn write_and_read(config: StoreConfig, table: &PixelTable) -> dustmap_store::LoadedMap {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let map_path = temp_dir.path().join("map.zarr");

    let writer = MapWriter::new(config);
    let result = writer
        .write(&map_path, table, "roundtrip-test")
        .expect("Failed to write map");
    assert_eq!(result.n_pix, table.len());
    assert!(result.bytes_written > 0);

    MapReader::open(&map_path).expect("Failed to read map")
}

#[test]
fn test_roundtrip_uncompressed() {
    let table = create_test_table(10, 4, 31);
    let config = StoreConfig {
        compression: ZarrCompression::None,
        chunk_rows: 3,
        ..Default::default()
    };

    let loaded = write_and_read(config, &table);

    assert_eq!(loaded.metadata.map_name, "roundtrip-test");
    assert_eq!(loaded.metadata.format_version, dustmap_store::FORMAT_VERSION);
    assert_eq!(loaded.metadata.n_pix, 10);
    assert_eq!(loaded.metadata.n_bins, 31);
    assert_eq!(loaded.metadata.n_samples, 4);
    assert_eq!(loaded.table, table);
}

#[test]
fn test_roundtrip_compressed() {
    let table = create_test_table(25, 3, 7);
    let config = StoreConfig {
        compression: ZarrCompression::BloscZstd,
        compression_level: 5,
        chunk_rows: 8,
        ..Default::default()
    };

    let loaded = write_and_read(config, &table);
    assert_eq!(loaded.table, table);
    assert_eq!(loaded.table.samples(24).count(), 3);
}

#[test]
fn test_invalid_table_is_not_written() {
    let mut table = create_test_table(4, 2, 5);
    table.n_stars.pop();

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let map_path = temp_dir.path().join("bad.zarr");

    let err = MapWriter::new(StoreConfig::default())
        .write(&map_path, &table, "bad")
        .unwrap_err();
    assert!(matches!(err, StoreError::ShapeMismatch { .. }));
    assert!(!map_path.join("best").exists());
}

#[test]
fn test_missing_directory_fails() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = MapReader::open(&temp_dir.path().join("does-not-exist")).unwrap_err();
    assert!(matches!(err, StoreError::OpenFailed(_)));
}

#[test]
fn test_missing_column_fails() {
    let table = create_test_table(4, 2, 5);
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let map_path = temp_dir.path().join("map.zarr");

    MapWriter::new(StoreConfig {
        compression: ZarrCompression::None,
        ..Default::default()
    })
    .write(&map_path, &table, "partial")
    .expect("Failed to write map");

    std::fs::remove_dir_all(map_path.join("GR")).expect("Failed to remove column");

    let err = MapReader::open(&map_path).unwrap_err();
    assert!(matches!(err, StoreError::OpenFailed(_)), "got {:?}", err);
}
