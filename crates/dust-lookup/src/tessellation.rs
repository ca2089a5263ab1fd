//! Per-resolution sorted index over the tessellation pixels.
//!
//! Built once from the `nside` and `healpix_index` columns of the map. Each
//! resolution level keeps its pixel identifiers strictly increasing next to
//! a parallel array of rows in the statistical table, so a point lookup is
//! one binary search per level.

use sky_healpix::Nested;

use crate::error::{LookupError, Result};

/// All pixels of one resolution level.
#[derive(Debug, Clone)]
pub struct ResolutionLevel {
    grid: Nested,
    /// Strictly increasing pixel identifiers.
    pixels: Vec<u64>,
    /// `rows[i]` is the table row of `pixels[i]`.
    rows: Vec<usize>,
}

impl ResolutionLevel {
    pub fn grid(&self) -> &Nested {
        &self.grid
    }

    pub fn nside(&self) -> u32 {
        self.grid.nside()
    }

    pub fn pixels(&self) -> &[u64] {
        &self.pixels
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Table row of `pixel`, if this level stores it.
    pub fn find(&self, pixel: u64) -> Option<usize> {
        let pos = self.pixels.partition_point(|&p| p < pixel);
        if pos < self.pixels.len() && self.pixels[pos] == pixel {
            Some(self.rows[pos])
        } else {
            None
        }
    }
}

/// Sorted multi-resolution index. Levels are ordered by ascending nside.
#[derive(Debug, Clone, Default)]
pub struct TessellationIndex {
    levels: Vec<ResolutionLevel>,
    n_rows: usize,
}

impl TessellationIndex {
    /// Build the index from per-row resolution and identifier columns.
    ///
    /// Fails on mismatched column lengths, invalid nside values, identifiers
    /// outside their level, or a pixel stored twice within one level.
    pub fn build(nside: &[u32], healpix_index: &[u64]) -> Result<Self> {
        if nside.len() != healpix_index.len() {
            return Err(LookupError::ColumnLengthMismatch {
                nside: nside.len(),
                pixels: healpix_index.len(),
            });
        }

        for (row, (&ns, &pixel)) in nside.iter().zip(healpix_index).enumerate() {
            let grid =
                Nested::new(ns).map_err(|_| LookupError::InvalidNside { row, nside: ns })?;
            grid.check_pixel(pixel)
                .map_err(|_| LookupError::PixelOutOfRange {
                    row,
                    pixel,
                    nside: ns,
                })?;
        }

        // Stable sort keeps equal keys in row order, so duplicate reports
        // name the earlier row first.
        let mut order: Vec<usize> = (0..nside.len()).collect();
        order.sort_by_key(|&row| (nside[row], healpix_index[row]));
        let sorted_nside: Vec<u32> = order.iter().map(|&row| nside[row]).collect();

        let mut levels = Vec::new();
        let mut start = 0;
        while start < order.len() {
            let level_nside = sorted_nside[start];
            let end = sorted_nside.partition_point(|&ns| ns <= level_nside);

            let rows = order[start..end].to_vec();
            let pixels: Vec<u64> = rows.iter().map(|&row| healpix_index[row]).collect();

            if let Some(i) = pixels.windows(2).position(|w| w[0] == w[1]) {
                return Err(LookupError::DuplicatePixel {
                    nside: level_nside,
                    pixel: pixels[i],
                    first_row: rows[i],
                    second_row: rows[i + 1],
                });
            }

            let grid = Nested::new(level_nside).map_err(|_| LookupError::InvalidNside {
                row: rows[0],
                nside: level_nside,
            })?;
            levels.push(ResolutionLevel { grid, pixels, rows });
            start = end;
        }

        tracing::debug!(
            levels = levels.len(),
            pixels = nside.len(),
            "Built tessellation index"
        );

        Ok(Self {
            levels,
            n_rows: nside.len(),
        })
    }

    /// Resolution levels in ascending nside order.
    pub fn levels(&self) -> &[ResolutionLevel] {
        &self.levels
    }

    /// The level with the given nside, if present.
    pub fn level(&self, nside: u32) -> Option<&ResolutionLevel> {
        self.levels
            .binary_search_by_key(&nside, |level| level.nside())
            .ok()
            .map(|i| &self.levels[i])
    }

    /// Total number of indexed pixels.
    pub fn pixel_count(&self) -> usize {
        self.n_rows
    }

    /// Table row of (`nside`, `pixel`), if stored.
    pub fn find(&self, nside: u32, pixel: u64) -> Option<usize> {
        self.level(nside).and_then(|level| level.find(pixel))
    }

    /// Number of stored pixels that also have an ancestor stored at a
    /// coarser level. Lookups there resolve to the finer pixel.
    pub fn overlapping_pixels(&self) -> usize {
        self.levels
            .iter()
            .enumerate()
            .map(|(i, fine)| {
                fine.pixels()
                    .iter()
                    .filter(|&&pixel| {
                        self.levels[..i].iter().any(|coarse| {
                            fine.grid()
                                .ancestor(pixel, coarse.grid())
                                .and_then(|parent| coarse.find(parent))
                                .is_some()
                        })
                    })
                    .count()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_partitions_levels() {
        let nside = [4, 2, 2, 4, 2];
        let pixels = [15, 30, 10, 5, 20];
        let index = TessellationIndex::build(&nside, &pixels).unwrap();

        assert_eq!(index.levels().len(), 2);
        assert_eq!(index.pixel_count(), 5);

        let coarse = &index.levels()[0];
        assert_eq!(coarse.nside(), 2);
        assert_eq!(coarse.pixels(), &[10, 20, 30]);
        assert_eq!(coarse.rows(), &[2, 4, 1]);

        let fine = &index.levels()[1];
        assert_eq!(fine.nside(), 4);
        assert_eq!(fine.pixels(), &[5, 15]);
        assert_eq!(fine.rows(), &[3, 0]);
    }

    #[test]
    fn test_overlapping_pixels() {
        let disjoint = TessellationIndex::build(&[2, 2, 2, 4, 4], &[10, 20, 30, 5, 15]).unwrap();
        assert_eq!(disjoint.overlapping_pixels(), 0);

        // Pixel 9 at nside 4 is a child of pixel 2 at nside 2.
        let nested = TessellationIndex::build(&[2, 4, 4], &[2, 9, 40]).unwrap();
        assert_eq!(nested.overlapping_pixels(), 1);
    }

    #[test]
    fn test_find() {
        let index = TessellationIndex::build(&[2, 2, 2, 4, 4], &[10, 20, 30, 5, 15]).unwrap();
        assert_eq!(index.find(2, 20), Some(1));
        assert_eq!(index.find(4, 15), Some(4));
        assert_eq!(index.find(2, 25), None);
        assert_eq!(index.find(2, 31), None);
        assert_eq!(index.find(2, 0), None);
        assert_eq!(index.find(8, 5), None);
    }

    #[test]
    fn test_duplicate_pixel_is_fatal() {
        let err = TessellationIndex::build(&[2, 4, 2], &[7, 7, 7]).unwrap_err();
        match err {
            LookupError::DuplicatePixel {
                nside,
                pixel,
                first_row,
                second_row,
            } => {
                assert_eq!(nside, 2);
                assert_eq!(pixel, 7);
                assert_eq!(first_row, 0);
                assert_eq!(second_row, 2);
            }
            other => panic!("expected DuplicatePixel, got {:?}", other),
        }
    }

    #[test]
    fn test_same_identifier_on_different_levels_is_allowed() {
        let index = TessellationIndex::build(&[1, 2], &[3, 3]).unwrap();
        assert_eq!(index.find(1, 3), Some(0));
        assert_eq!(index.find(2, 3), Some(1));
    }

    #[test]
    fn test_invalid_rows_are_fatal() {
        assert!(matches!(
            TessellationIndex::build(&[2, 3], &[0, 0]),
            Err(LookupError::InvalidNside { row: 1, nside: 3 })
        ));
        assert!(matches!(
            TessellationIndex::build(&[1], &[12]),
            Err(LookupError::PixelOutOfRange {
                row: 0,
                pixel: 12,
                nside: 1
            })
        ));
        assert!(matches!(
            TessellationIndex::build(&[1, 1], &[0]),
            Err(LookupError::ColumnLengthMismatch { nside: 2, pixels: 1 })
        ));
    }

    #[test]
    fn test_empty_index() {
        let index = TessellationIndex::build(&[], &[]).unwrap();
        assert!(index.levels().is_empty());
        assert_eq!(index.find(1, 0), None);
    }
}
