//! Summary statistics over posterior samples.

/// Minimum reported spread, in magnitudes of E(B-V).
///
/// Added in quadrature to the half-width of the 16-84 percentile range.
pub const SIGMA_FLOOR: f64 = 0.02;

/// Median and spread of a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub median: f64,
    pub sigma: f64,
}

/// Percentile `q` (0-100) of already sorted values, interpolating linearly
/// between the closest ranks.
///
/// Returns NaN for an empty slice.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let pos = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Median and spread of `values`. Sorts in place.
pub fn spread(values: &mut [f64]) -> Spread {
    values.sort_by(f64::total_cmp);

    let p16 = percentile_sorted(values, 16.0);
    let median = percentile_sorted(values, 50.0);
    let p84 = percentile_sorted(values, 84.0);

    Spread {
        median,
        sigma: (0.5 * (p84 - p16)).hypot(SIGMA_FLOOR),
    }
}

/// Round to `decimals` places, ties to even. `None` leaves the value as is.
pub fn round_to(value: f64, decimals: Option<u32>) -> f64 {
    match decimals {
        Some(decimals) => {
            let factor = 10f64.powi(decimals as i32);
            (value * factor).round_ties_even() / factor
        }
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&values, 0.0), 1.0);
        assert_eq!(percentile_sorted(&values, 50.0), 3.0);
        assert_eq!(percentile_sorted(&values, 100.0), 5.0);
        assert!((percentile_sorted(&values, 16.0) - 1.64).abs() < 1e-12);
        assert!((percentile_sorted(&values, 84.0) - 4.36).abs() < 1e-12);
        assert!(percentile_sorted(&[], 50.0).is_nan());
        assert_eq!(percentile_sorted(&[7.0], 84.0), 7.0);
    }

    #[test]
    fn test_spread_has_floor() {
        let mut identical = vec![0.3; 10];
        let s = spread(&mut identical);
        assert_eq!(s.median, 0.3);
        assert!((s.sigma - SIGMA_FLOOR).abs() < 1e-15);
    }

    #[test]
    fn test_spread_unsorted_input() {
        let mut values = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        let s = spread(&mut values);
        assert_eq!(s.median, 3.0);
        let half_width: f64 = 0.5 * (4.36 - 1.64);
        let expected = (half_width * half_width + SIGMA_FLOOR * SIGMA_FLOOR).sqrt();
        assert!((s.sigma - expected).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456789, Some(5)), 0.12346);
        assert_eq!(round_to(0.1f32 as f64, Some(5)), 0.1);
        assert_eq!(round_to(2.5, Some(0)), 2.0);
        assert_eq!(round_to(0.123456789, None), 0.123456789);
    }
}
