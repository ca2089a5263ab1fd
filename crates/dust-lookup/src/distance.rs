//! Evaluating distance profiles at a given distance.

/// Distance modulus for a distance in kiloparsecs.
pub fn distance_modulus(d_kpc: f64) -> f64 {
    5.0 * d_kpc.log10() + 10.0
}

/// Linear interpolation weights between two adjacent distance bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinWeights {
    lower: usize,
    upper: usize,
    upper_weight: f64,
}

impl BinWeights {
    /// Weights for distance modulus `mu` on the increasing `distmod` grid.
    ///
    /// Values outside the grid clamp to the first or last bin.
    pub fn for_modulus(distmod: &[f64], mu: f64) -> Self {
        let clamp_to = |bin: usize| Self {
            lower: bin,
            upper: bin,
            upper_weight: 0.0,
        };

        let upper = distmod.partition_point(|&dm| dm < mu);
        if upper == 0 || distmod.len() < 2 {
            return clamp_to(0);
        }
        if upper == distmod.len() {
            return clamp_to(distmod.len() - 1);
        }

        let lower = upper - 1;
        Self {
            lower,
            upper,
            upper_weight: (mu - distmod[lower]) / (distmod[upper] - distmod[lower]),
        }
    }

    /// Weights for a distance in kiloparsecs.
    pub fn for_distance(distmod: &[f64], d_kpc: f64) -> Self {
        Self::for_modulus(distmod, distance_modulus(d_kpc))
    }

    /// Evaluate `profile` at the weighted position.
    pub fn apply(&self, profile: &[f32]) -> f64 {
        let lower = profile[self.lower] as f64;
        let upper = profile[self.upper] as f64;
        lower + (upper - lower) * self.upper_weight
    }
}
