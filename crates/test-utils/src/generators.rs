//! Generators for synthetic dust maps.
//!
//! Values are deterministic functions of the row index so tests can predict
//! what a lookup returns without reading the table back.

use dustmap_store::PixelTable;
use sky_healpix::npix;

/// Evenly spaced distance moduli from 4 to 19, the standard grid.
///
/// # Example
///
/// ```
/// use test_utils::standard_distmod;
///
/// let distmod = standard_distmod(31);
/// assert_eq!(distmod[0], 4.0);
/// assert_eq!(distmod[30], 19.0);
/// ```
pub fn standard_distmod(n_bins: usize) -> Vec<f64> {
    if n_bins < 2 {
        return vec![4.0; n_bins];
    }
    let step = 15.0 / (n_bins - 1) as f64;
    (0..n_bins).map(|j| 4.0 + step * j as f64).collect()
}

/// Best-fit reddening of `row` in `bin`: grows with distance, unique per row.
pub fn best_value(row: usize, bin: usize) -> f32 {
    (0.002 + 0.001 * row as f32) * (bin + 1) as f32
}

/// Posterior sample `sample` of `row` in `bin`, scattered around the best fit.
pub fn sample_value(row: usize, sample: usize, n_samples: usize, bin: usize) -> f32 {
    let offset = sample as f32 - (n_samples as f32 - 1.0) / 2.0;
    best_value(row, bin) * (1.0 + 0.02 * offset)
}

/// GR diagnostic of `row` in `bin`. Every seventh row has not converged.
pub fn gr_value(row: usize, bin: usize) -> f32 {
    if row % 7 == 6 && bin == 0 {
        1.3
    } else {
        1.0 + 0.001 * bin as f32
    }
}

/// 2D SFD reddening of `row`.
pub fn sfd_value(row: usize) -> f32 {
    0.01 * (row % 100) as f32
}

/// Append one pixel with synthetic statistics to `table`.
///
/// The table's `n_bins` and `n_samples` must already be set.
pub fn push_pixel(table: &mut PixelTable, nside: u32, pixel: u64) {
    let row = table.nside.len();
    table.nside.push(nside);
    table.healpix_index.push(pixel);

    for bin in 0..table.n_bins {
        table.best.push(best_value(row, bin));
        table.gr.push(gr_value(row, bin));
    }
    for sample in 0..table.n_samples {
        for bin in 0..table.n_bins {
            table
                .samples
                .push(sample_value(row, sample, table.n_samples, bin));
        }
    }
    table.n_stars.push(10 + row as u32);
    table.dm_reliable_min.push(5.0 + (row % 3) as f32);
    table.dm_reliable_max.push(14.0 + (row % 5) as f32);
    table.ebv_sfd.push(sfd_value(row));
}

/// Empty table with the standard distance grid.
pub fn empty_table(n_samples: usize, n_bins: usize) -> PixelTable {
    PixelTable {
        n_bins,
        n_samples,
        distmod: standard_distmod(n_bins),
        ..Default::default()
    }
}

/// Table holding exactly the given (nside, pixels) levels, rows in order.
///
/// # Example
///
/// ```
/// use test_utils::create_multires_table;
///
/// let table = create_multires_table(&[(2, &[10, 20]), (4, &[5])], 3, 4);
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.nside, vec![2, 2, 4]);
/// ```
pub fn create_multires_table(levels: &[(u32, &[u64])], n_samples: usize, n_bins: usize) -> PixelTable {
    let mut table = empty_table(n_samples, n_bins);
    for &(nside, pixels) in levels {
        for &pixel in pixels {
            push_pixel(&mut table, nside, pixel);
        }
    }
    table
}

/// Table tiling the whole sky at `nside`, except that each pixel listed in
/// `refine` is replaced by its four children at `2 * nside`.
///
/// Rows are emitted fine level last, so the row order does not follow the
/// sort order of the index.
///
/// # Example
///
/// ```
/// use test_utils::create_full_sky_table;
///
/// let table = create_full_sky_table(1, &[0], 2, 3);
/// assert_eq!(table.len(), 11 + 4);
/// ```
pub fn create_full_sky_table(
    nside: u32,
    refine: &[u64],
    n_samples: usize,
    n_bins: usize,
) -> PixelTable {
    let mut table = empty_table(n_samples, n_bins);

    // Coarse pixels in descending order to exercise the index sort.
    for pixel in (0..npix(nside)).rev() {
        if !refine.contains(&pixel) {
            push_pixel(&mut table, nside, pixel);
        }
    }
    for &parent in refine {
        for child in 4 * parent..4 * parent + 4 {
            push_pixel(&mut table, 2 * nside, child);
        }
    }
    table
}
