//! Handling of unresolved points, scalar inputs, and convergence flags.
//!
//! A point that falls outside every stored pixel is not an error. It keeps
//! its slot in the output with every numeric field zero-filled and
//! `success = 0`, so batch results always line up with the input.

use crate::result::FieldValue;

/// Row index of a point that matched no stored pixel.
pub const UNRESOLVED: Option<usize> = None;

/// Whether the caller passed one point or a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    Scalar,
    Batch,
}

impl QueryShape {
    /// Collapse per-point values back to the caller's shape.
    ///
    /// A scalar query yields its only value without the list wrapper.
    pub fn restore(self, mut values: Vec<FieldValue>) -> FieldValue {
        match self {
            QueryShape::Scalar if values.len() == 1 => values.swap_remove(0),
            _ => FieldValue::List(values),
        }
    }
}

/// Convergence and fill rules applied during extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullPolicy {
    convergence_threshold: f32,
}

impl NullPolicy {
    pub fn new(convergence_threshold: f32) -> Self {
        Self {
            convergence_threshold,
        }
    }

    /// 1 when every GR value lies strictly below the threshold.
    ///
    /// Unresolved points and NaN GR values are never converged.
    pub fn converged_flag(&self, gr: Option<&[f32]>) -> i64 {
        match gr {
            Some(gr) => gr.iter().all(|&g| g < self.convergence_threshold) as i64,
            None => 0,
        }
    }

    /// 1 when the point resolved to a stored pixel.
    pub fn success_flag(row: Option<usize>) -> i64 {
        row.is_some() as i64
    }

    /// Zero-filled profile of `n_bins` values.
    pub fn zero_profile(n_bins: usize) -> FieldValue {
        FieldValue::floats(std::iter::repeat(0.0).take(n_bins))
    }

    /// Zero-filled ensemble of `n_samples` profiles.
    pub fn zero_samples(n_samples: usize, n_bins: usize) -> FieldValue {
        FieldValue::List(
            (0..n_samples)
                .map(|_| Self::zero_profile(n_bins))
                .collect(),
        )
    }
}
