//! In-memory columnar table of per-pixel statistics.

use crate::error::{Result, StoreError};

/// Per-pixel statistical records of a dust map, stored column by column.
///
/// Row `i` of every column describes the same pixel. Profile-shaped columns
/// are flattened row-major: `best[i * n_bins + j]` is the best-fit
/// reddening of pixel `i` at distance bin `j`, and `samples` is laid out as
/// `[pixel][sample][bin]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PixelTable {
    /// HEALPix nside of each pixel.
    pub nside: Vec<u32>,
    /// Nested HEALPix index of each pixel at its own nside.
    pub healpix_index: Vec<u64>,
    /// Distance bins per profile (map-wide).
    pub n_bins: usize,
    /// Posterior samples per pixel (map-wide).
    pub n_samples: usize,
    /// Distance modulus of each bin.
    pub distmod: Vec<f64>,
    /// Best-fit reddening profile, `[n_pix, n_bins]`.
    pub best: Vec<f32>,
    /// Posterior sample profiles, `[n_pix, n_samples, n_bins]`.
    pub samples: Vec<f32>,
    /// Gelman-Rubin convergence diagnostic, `[n_pix, n_bins]`.
    pub gr: Vec<f32>,
    /// Number of stars used in the fit.
    pub n_stars: Vec<u32>,
    /// Minimum reliable distance modulus.
    pub dm_reliable_min: Vec<f32>,
    /// Maximum reliable distance modulus.
    pub dm_reliable_max: Vec<f32>,
    /// Precomputed 2D reddening used by scalar-field queries.
    pub ebv_sfd: Vec<f32>,
}

impl PixelTable {
    /// Number of pixels (rows).
    pub fn len(&self) -> usize {
        self.nside.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nside.is_empty()
    }

    /// Best-fit profile of `row`.
    pub fn best(&self, row: usize) -> &[f32] {
        let start = row * self.n_bins;
        &self.best[start..start + self.n_bins]
    }

    /// Convergence diagnostic profile of `row`.
    pub fn gr(&self, row: usize) -> &[f32] {
        let start = row * self.n_bins;
        &self.gr[start..start + self.n_bins]
    }

    /// All sample profiles of `row`, one slice of `n_bins` per sample.
    pub fn samples(&self, row: usize) -> impl Iterator<Item = &[f32]> + '_ {
        let block = self.n_samples * self.n_bins;
        let start = row * block;
        self.samples[start..start + block].chunks_exact(self.n_bins)
    }

    /// Check that every column is consistent with the map shape.
    ///
    /// A table that fails here must not be indexed or served.
    pub fn validate(&self) -> Result<()> {
        let n_pix = self.len();
        if n_pix == 0 {
            return Err(StoreError::EmptyMap);
        }
        if self.n_bins == 0 {
            return Err(StoreError::ZeroDistanceBins);
        }
        if self.n_samples == 0 {
            return Err(StoreError::ZeroSamples);
        }

        let columns: [(&str, usize, usize); 10] = [
            ("healpix_index", self.healpix_index.len(), n_pix),
            ("distmod", self.distmod.len(), self.n_bins),
            ("best", self.best.len(), n_pix * self.n_bins),
            ("samples", self.samples.len(), n_pix * self.n_samples * self.n_bins),
            ("GR", self.gr.len(), n_pix * self.n_bins),
            ("n_stars", self.n_stars.len(), n_pix),
            ("DM_reliable_min", self.dm_reliable_min.len(), n_pix),
            ("DM_reliable_max", self.dm_reliable_max.len(), n_pix),
            ("EBV_SFD", self.ebv_sfd.len(), n_pix),
            ("nside", self.nside.len(), n_pix),
        ];
        for (column, actual, expected) in columns {
            if actual != expected {
                return Err(StoreError::shape_mismatch(column, expected, actual));
            }
        }

        if self.distmod.iter().any(|dm| !dm.is_finite()) {
            return Err(StoreError::invalid_metadata("distmod contains non-finite values"));
        }
        if self.distmod.windows(2).any(|w| w[1] <= w[0]) {
            return Err(StoreError::invalid_metadata(
                "distmod must be strictly increasing",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pixel_table() -> PixelTable {
        PixelTable {
            nside: vec![1, 1],
            healpix_index: vec![0, 5],
            n_bins: 3,
            n_samples: 2,
            distmod: vec![4.0, 4.5, 5.0],
            best: vec![0.1, 0.2, 0.3, 1.1, 1.2, 1.3],
            samples: vec![
                0.0, 0.1, 0.2, //
                0.2, 0.3, 0.4, //
                1.0, 1.1, 1.2, //
                1.2, 1.3, 1.4,
            ],
            gr: vec![1.0; 6],
            n_stars: vec![10, 20],
            dm_reliable_min: vec![5.0, 6.0],
            dm_reliable_max: vec![14.0, 15.0],
            ebv_sfd: vec![0.3, 1.3],
        }
    }

    #[test]
    fn test_row_accessors() {
        let table = two_pixel_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.best(1), &[1.1, 1.2, 1.3]);
        assert_eq!(table.gr(0).len(), 3);

        let samples: Vec<&[f32]> = table.samples(1).collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0], &[1.0, 1.1, 1.2]);
        assert_eq!(samples[1], &[1.2, 1.3, 1.4]);
    }

    #[test]
    fn test_validate_ok() {
        assert!(two_pixel_table().validate().is_ok());
    }

    #[test]
    fn test_validate_shape_mismatch() {
        let mut table = two_pixel_table();
        table.best.pop();
        match table.validate() {
            Err(StoreError::ShapeMismatch { column, expected, actual }) => {
                assert_eq!(column, "best");
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_degenerate_maps() {
        assert!(matches!(
            PixelTable::default().validate(),
            Err(StoreError::EmptyMap)
        ));

        let mut table = two_pixel_table();
        table.n_bins = 0;
        assert!(matches!(table.validate(), Err(StoreError::ZeroDistanceBins)));

        let mut table = two_pixel_table();
        table.n_samples = 0;
        assert!(matches!(table.validate(), Err(StoreError::ZeroSamples)));
    }

    #[test]
    fn test_validate_distmod_order() {
        let mut table = two_pixel_table();
        table.distmod = vec![4.0, 4.0, 5.0];
        assert!(matches!(
            table.validate(),
            Err(StoreError::InvalidMetadata(_))
        ));
    }
}
