//! Plain-text rendering of one line of sight.

use dustmap_store::PixelTable;

const LABEL_WIDTH: usize = 10;
const COLUMN_WIDTH: usize = 6;

const EXPLANATION: &str = "\
# The table contains E(B-V) in magnitudes out to the specified distance moduli.
# Each column corresponds to a different distance modulus, and each row
# corresponds to a different sample. The first sample is the best fit, while
# the following samples are drawn from the posterior distribution of
# distance-reddening profiles.
# 
# See Green et al. (2014) & Green et al. (2015) for a detailed description
# of how the line-of-sight reddening is computed.
# 
# Use the reddening vector in Schlafly & Finkbeiner (2011) to convert to
# extinction in various bands (note that A_B - A_V != 1 for E(B-V) = 1; E(B-V)
# is strictly a parameter name here).

";

/// Render the best fit and every sample of `row` as an ASCII table, one
/// column per distance bin. Samples are numbered from 0.
///
/// An unresolved point renders with zero stars and zero-filled rows.
pub fn render_los_table(
    l: f64,
    b: f64,
    table: &PixelTable,
    row: Option<usize>,
    converged: bool,
) -> String {
    let zeros = vec![0.0f32; table.n_bins];

    let mut out = String::new();
    out.push_str("# Line-of-Sight Reddening Results\n");
    out.push_str("# ===============================\n");
    out.push_str("#\n");
    out.push_str("# Galactic coordinates (in degrees):\n");
    out.push_str(&format!("#     l = {:.4}\n", l));
    out.push_str(&format!("#     b = {:.4}\n", b));
    out.push_str(&format!(
        "# Number of stars: {}\n",
        row.map_or(0, |r| table.n_stars[r])
    ));
    out.push_str(&format!(
        "# Fit converged: {}\n",
        if converged && row.is_some() { "True" } else { "False" }
    ));
    out.push_str("#\n");
    out.push_str(EXPLANATION);

    out.push_str(&format!("{:^width$}| DistanceModulus\n", "SampleNo", width = LABEL_WIDTH));
    out.push_str(&format!("{:width$}|", "", width = LABEL_WIDTH));
    for dm in &table.distmod {
        out.push_str(&format!("{:>width$.2}", dm, width = COLUMN_WIDTH));
    }
    out.push('\n');
    out.push_str(&"-".repeat(LABEL_WIDTH + 1 + COLUMN_WIDTH * table.n_bins));
    out.push('\n');

    let best = row.map_or(zeros.as_slice(), |r| table.best(r));
    push_row(&mut out, "BestFit", best);

    match row {
        Some(r) => {
            for (i, sample) in table.samples(r).enumerate() {
                push_row(&mut out, &i.to_string(), sample);
            }
        }
        None => {
            for i in 0..table.n_samples {
                push_row(&mut out, &i.to_string(), &zeros);
            }
        }
    }

    out
}

fn push_row(out: &mut String, label: &str, values: &[f32]) {
    out.push_str(&format!("{:^width$}|", label, width = LABEL_WIDTH));
    for v in values {
        out.push_str(&format!("{:>width$.3}", v, width = COLUMN_WIDTH));
    }
    out.push('\n');
}
