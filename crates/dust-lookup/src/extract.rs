//! Gathers output fields for resolved rows.
//!
//! Each point contributes one value per field. Values are built point by
//! point, then transposed into per-field columns and restored to the shape
//! of the query input. Map-wide fields such as `distmod` are added once.

use dustmap_store::PixelTable;
use rayon::prelude::*;

use crate::config::LookupConfig;
use crate::distance::BinWeights;
use crate::null_policy::{NullPolicy, QueryShape};
use crate::query::QueryMode;
use crate::result::{fields, FieldValue, QueryResult};
use crate::stats::{round_to, spread};

const FULL_FIELDS: [&str; 8] = [
    fields::BEST,
    fields::SAMPLES,
    fields::GR,
    fields::N_STARS,
    fields::CONVERGED,
    fields::SUCCESS,
    fields::DM_RELIABLE_MIN,
    fields::DM_RELIABLE_MAX,
];

const SUMMARY_FIELDS: [&str; 9] = [
    fields::BEST,
    fields::SAMPLES,
    fields::MEDIAN,
    fields::SIGMA,
    fields::N_STARS,
    fields::CONVERGED,
    fields::SUCCESS,
    fields::DM_RELIABLE_MIN,
    fields::DM_RELIABLE_MAX,
];

const SCALAR_FIELDS: [&str; 1] = [fields::EBV_SFD];

/// Statistical payload extractor over a loaded table.
#[derive(Debug, Clone, Copy)]
pub struct PayloadExtractor<'a> {
    table: &'a PixelTable,
    config: &'a LookupConfig,
    policy: NullPolicy,
}

impl<'a> PayloadExtractor<'a> {
    pub fn new(table: &'a PixelTable, config: &'a LookupConfig) -> Self {
        Self {
            table,
            config,
            policy: NullPolicy::new(config.convergence_threshold),
        }
    }

    /// Names of every field `mode` returns.
    pub fn field_names(mode: QueryMode) -> Vec<&'static str> {
        let mut names = match mode {
            QueryMode::Full => FULL_FIELDS.to_vec(),
            QueryMode::Summary => SUMMARY_FIELDS.to_vec(),
            QueryMode::ScalarField => SCALAR_FIELDS.to_vec(),
        };
        if mode != QueryMode::ScalarField {
            names.push(fields::DISTMOD);
        }
        names.sort_unstable();
        names
    }

    /// Build the result for located `rows`.
    ///
    /// `distances`, when given, holds one distance in kpc per row; profile
    /// fields are then evaluated at that distance instead of returned whole.
    pub fn extract(
        &self,
        rows: &[Option<usize>],
        shape: QueryShape,
        mode: QueryMode,
        distances: Option<&[f64]>,
    ) -> QueryResult {
        let weights = |i: usize| {
            distances.map(|d| BinWeights::for_distance(&self.table.distmod, d[i]))
        };

        let mut result = match mode {
            QueryMode::Full => self.collect(FULL_FIELDS, rows, shape, |i, row| {
                self.full_point(row, weights(i))
            }),
            QueryMode::Summary => self.collect(SUMMARY_FIELDS, rows, shape, |i, row| {
                self.summary_point(row, weights(i))
            }),
            QueryMode::ScalarField => {
                self.collect(SCALAR_FIELDS, rows, shape, |_, row| self.scalar_point(row))
            }
        };

        if mode != QueryMode::ScalarField {
            result.insert(fields::DISTMOD, self.floats(&self.table.distmod));
        }
        result
    }

    fn collect<const N: usize, F>(
        &self,
        names: [&'static str; N],
        rows: &[Option<usize>],
        shape: QueryShape,
        point: F,
    ) -> QueryResult
    where
        F: Fn(usize, Option<usize>) -> [FieldValue; N] + Sync,
    {
        let points: Vec<[FieldValue; N]> = if rows.len() >= self.config.parallel_threshold {
            rows.par_iter()
                .enumerate()
                .map(|(i, &row)| point(i, row))
                .collect()
        } else {
            rows.iter()
                .enumerate()
                .map(|(i, &row)| point(i, row))
                .collect()
        };

        let mut columns: [Vec<FieldValue>; N] =
            std::array::from_fn(|_| Vec::with_capacity(rows.len()));
        for values in points {
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }

        let mut result = QueryResult::new();
        for (name, column) in names.into_iter().zip(columns) {
            result.insert(name, shape.restore(column));
        }
        result
    }

    fn full_point(&self, row: Option<usize>, weights: Option<BinWeights>) -> [FieldValue; 8] {
        let Some(row) = row else {
            return [
                self.zero_profile(weights),
                self.zero_samples(self.table.n_samples, weights),
                NullPolicy::zero_profile(self.table.n_bins),
                FieldValue::Int(0),
                FieldValue::Int(0),
                FieldValue::Int(0),
                FieldValue::Float(0.0),
                FieldValue::Float(0.0),
            ];
        };

        [
            self.profile(self.table.best(row), weights),
            self.sample_profiles(row, self.table.n_samples, weights),
            self.profile(self.table.gr(row), None),
            FieldValue::Int(self.table.n_stars[row] as i64),
            FieldValue::Int(self.policy.converged_flag(Some(self.table.gr(row)))),
            FieldValue::Int(NullPolicy::success_flag(Some(row))),
            self.float(self.table.dm_reliable_min[row] as f64),
            self.float(self.table.dm_reliable_max[row] as f64),
        ]
    }

    fn summary_point(&self, row: Option<usize>, weights: Option<BinWeights>) -> [FieldValue; 9] {
        let kept = self.summary_sample_count();
        let Some(row) = row else {
            return [
                self.zero_profile(weights),
                self.zero_samples(kept, weights),
                self.zero_profile(weights),
                self.zero_profile(weights),
                FieldValue::Int(0),
                FieldValue::Int(0),
                FieldValue::Int(0),
                FieldValue::Float(0.0),
                FieldValue::Float(0.0),
            ];
        };

        let (median, sigma) = self.sample_spread(row, weights);

        [
            self.profile(self.table.best(row), weights),
            self.sample_profiles(row, kept, weights),
            median,
            sigma,
            FieldValue::Int(self.table.n_stars[row] as i64),
            FieldValue::Int(self.policy.converged_flag(Some(self.table.gr(row)))),
            FieldValue::Int(NullPolicy::success_flag(Some(row))),
            self.float(self.table.dm_reliable_min[row] as f64),
            self.float(self.table.dm_reliable_max[row] as f64),
        ]
    }

    fn scalar_point(&self, row: Option<usize>) -> [FieldValue; 1] {
        match row {
            Some(row) => [self.float(self.table.ebv_sfd[row] as f64)],
            None => [FieldValue::Float(0.0)],
        }
    }

    /// Size of the reduced ensemble returned in summary mode.
    fn summary_sample_count(&self) -> usize {
        self.config.summary_max_samples.min(self.table.n_samples)
    }

    /// The first `count` sample profiles of `row`.
    fn sample_profiles(&self, row: usize, count: usize, weights: Option<BinWeights>) -> FieldValue {
        FieldValue::List(
            self.table
                .samples(row)
                .take(count)
                .map(|sample| self.profile(sample, weights))
                .collect(),
        )
    }

    /// Median and sigma over the whole ensemble, per bin or at the weighted
    /// distance.
    fn sample_spread(&self, row: usize, weights: Option<BinWeights>) -> (FieldValue, FieldValue) {
        let mut buf = Vec::with_capacity(self.table.n_samples);

        if let Some(weights) = weights {
            buf.extend(self.table.samples(row).map(|sample| weights.apply(sample)));
            let s = spread(&mut buf);
            return (self.float(s.median), self.float(s.sigma));
        }

        let mut medians = Vec::with_capacity(self.table.n_bins);
        let mut sigmas = Vec::with_capacity(self.table.n_bins);
        for bin in 0..self.table.n_bins {
            buf.clear();
            buf.extend(self.table.samples(row).map(|sample| sample[bin] as f64));
            let s = spread(&mut buf);
            medians.push(s.median);
            sigmas.push(s.sigma);
        }
        (self.floats(&medians), self.floats(&sigmas))
    }

    fn profile(&self, profile: &[f32], weights: Option<BinWeights>) -> FieldValue {
        match weights {
            Some(weights) => self.float(weights.apply(profile)),
            None => FieldValue::floats(profile.iter().map(|&v| self.round(v as f64))),
        }
    }

    fn zero_profile(&self, weights: Option<BinWeights>) -> FieldValue {
        match weights {
            Some(_) => FieldValue::Float(0.0),
            None => NullPolicy::zero_profile(self.table.n_bins),
        }
    }

    fn zero_samples(&self, count: usize, weights: Option<BinWeights>) -> FieldValue {
        match weights {
            Some(_) => FieldValue::floats(std::iter::repeat(0.0).take(count)),
            None => NullPolicy::zero_samples(count, self.table.n_bins),
        }
    }

    fn round(&self, value: f64) -> f64 {
        round_to(value, self.config.decimals)
    }

    fn float(&self, value: f64) -> FieldValue {
        FieldValue::Float(self.round(value))
    }

    fn floats(&self, values: &[f64]) -> FieldValue {
        FieldValue::floats(values.iter().map(|&v| self.round(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two pixels, three bins, four samples.
    fn table() -> PixelTable {
        PixelTable {
            nside: vec![1, 1],
            healpix_index: vec![0, 1],
            n_bins: 3,
            n_samples: 4,
            distmod: vec![4.0, 10.0, 16.0],
            best: vec![0.1, 0.2, 0.3, 1.0, 2.0, 3.0],
            samples: vec![
                0.1, 0.2, 0.3, //
                0.2, 0.3, 0.4, //
                0.3, 0.4, 0.5, //
                0.4, 0.5, 0.6, //
                1.0, 2.0, 3.0, //
                1.0, 2.0, 3.0, //
                1.0, 2.0, 3.0, //
                1.0, 2.0, 3.0,
            ],
            gr: vec![1.0, 1.1, 1.15, 1.0, 1.3, 1.0],
            n_stars: vec![12, 0],
            dm_reliable_min: vec![5.5, 6.0],
            dm_reliable_max: vec![14.25, 15.0],
            ebv_sfd: vec![0.031, 0.5],
        }
    }

    #[test]
    fn test_full_scalar_point() {
        let table = table();
        let config = LookupConfig::default();
        let extractor = PayloadExtractor::new(&table, &config);

        let result = extractor.extract(&[Some(0)], QueryShape::Scalar, QueryMode::Full, None);

        assert_eq!(
            result.names().collect::<Vec<_>>(),
            PayloadExtractor::field_names(QueryMode::Full)
        );
        assert_eq!(
            result.get(fields::BEST).and_then(FieldValue::to_f64_vec),
            Some(vec![0.1, 0.2, 0.3])
        );
        assert_eq!(
            result.get(fields::SAMPLES).and_then(|s| s.as_list()).map(|s| s.len()),
            Some(4)
        );
        assert_eq!(result.get(fields::N_STARS), Some(&FieldValue::Int(12)));
        assert_eq!(result.get(fields::CONVERGED), Some(&FieldValue::Int(1)));
        assert_eq!(result.get(fields::SUCCESS), Some(&FieldValue::Int(1)));
        assert_eq!(result.get(fields::DM_RELIABLE_MAX), Some(&FieldValue::Float(14.25)));
        assert_eq!(
            result.get(fields::DISTMOD).and_then(FieldValue::to_f64_vec),
            Some(vec![4.0, 10.0, 16.0])
        );
    }

    #[test]
    fn test_convergence_uses_threshold() {
        let table = table();
        let config = LookupConfig::default();
        let extractor = PayloadExtractor::new(&table, &config);

        let result = extractor.extract(&[Some(1)], QueryShape::Scalar, QueryMode::Full, None);
        assert_eq!(result.get(fields::CONVERGED), Some(&FieldValue::Int(0)));

        let relaxed = LookupConfig {
            convergence_threshold: 1.5,
            ..LookupConfig::default()
        };
        let extractor = PayloadExtractor::new(&table, &relaxed);
        let result = extractor.extract(&[Some(1)], QueryShape::Scalar, QueryMode::Full, None);
        assert_eq!(result.get(fields::CONVERGED), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_unresolved_point_is_zero_filled() {
        let table = table();
        let config = LookupConfig::default();
        let extractor = PayloadExtractor::new(&table, &config);

        for mode in [QueryMode::Full, QueryMode::Summary, QueryMode::ScalarField] {
            let result = extractor.extract(&[None], QueryShape::Scalar, mode, None);
            for (name, value) in result.iter() {
                if name != fields::DISTMOD {
                    assert!(value.is_all_zero(), "{} not zero in {} mode", name, mode);
                }
            }
        }

        let result = extractor.extract(&[None], QueryShape::Scalar, QueryMode::Full, None);
        let samples = result.get(fields::SAMPLES).and_then(|s| s.as_list()).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].to_f64_vec(), Some(vec![0.0; 3]));
    }

    #[test]
    fn test_batch_keeps_order_and_unresolved_slots() {
        let table = table();
        let config = LookupConfig::default();
        let extractor = PayloadExtractor::new(&table, &config);

        let result = extractor.extract(
            &[Some(1), None, Some(0)],
            QueryShape::Batch,
            QueryMode::ScalarField,
            None,
        );
        assert_eq!(
            result.get(fields::EBV_SFD).and_then(FieldValue::to_f64_vec),
            Some(vec![0.5, 0.0, 0.031])
        );
        assert!(!result.contains(fields::DISTMOD));
    }

    #[test]
    fn test_summary_statistics() {
        let table = table();
        let config = LookupConfig {
            decimals: None,
            ..LookupConfig::default()
        };
        let extractor = PayloadExtractor::new(&table, &config);

        let result = extractor.extract(&[Some(1)], QueryShape::Scalar, QueryMode::Summary, None);
        let median = result.get(fields::MEDIAN).and_then(FieldValue::to_f64_vec).unwrap();
        let sigma = result.get(fields::SIGMA).and_then(FieldValue::to_f64_vec).unwrap();
        assert_eq!(median, vec![1.0, 2.0, 3.0]);
        for s in sigma {
            assert!((s - crate::stats::SIGMA_FLOOR).abs() < 1e-12);
        }
        assert!(!result.contains(fields::GR));
        // Fewer stored samples than the default limit: all of them are kept.
        assert_eq!(
            result.get(fields::SAMPLES).and_then(|s| s.as_list()).map(|s| s.len()),
            Some(4)
        );
    }

    #[test]
    fn test_summary_keeps_first_samples() {
        let table = table();
        let config = LookupConfig {
            summary_max_samples: 2,
            ..LookupConfig::default()
        };
        let extractor = PayloadExtractor::new(&table, &config);

        let result = extractor.extract(
            &[Some(0), None],
            QueryShape::Batch,
            QueryMode::Summary,
            None,
        );
        let samples = result.get(fields::SAMPLES).and_then(|s| s.as_list()).unwrap();
        let resolved = samples[0].as_list().unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].to_f64_vec(), Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(resolved[1].to_f64_vec(), Some(vec![0.2, 0.3, 0.4]));
        assert_eq!(samples[1].as_list().map(|s| s.len()), Some(2));
        assert!(samples[1].is_all_zero());

        // Percentiles still cover all four samples.
        let median = result.get(fields::MEDIAN).and_then(|m| m.as_list()).unwrap();
        assert_eq!(median[0].to_f64_vec(), Some(vec![0.25, 0.35, 0.45]));

        let at_distance = extractor.extract(
            &[Some(0)],
            QueryShape::Scalar,
            QueryMode::Summary,
            Some(&[1.0]),
        );
        assert_eq!(
            at_distance.get(fields::SAMPLES).and_then(FieldValue::to_f64_vec),
            Some(vec![0.2, 0.3])
        );
    }

    #[test]
    fn test_distance_evaluation() {
        let table = table();
        let config = LookupConfig::default();
        let extractor = PayloadExtractor::new(&table, &config);

        // 1 kpc is distance modulus 10, the middle bin.
        let result = extractor.extract(
            &[Some(1), None],
            QueryShape::Batch,
            QueryMode::Full,
            Some(&[1.0, 1.0]),
        );
        assert_eq!(
            result.get(fields::BEST).and_then(FieldValue::to_f64_vec),
            Some(vec![2.0, 0.0])
        );

        let samples = result.get(fields::SAMPLES).and_then(|s| s.as_list()).unwrap();
        assert_eq!(samples[0].to_f64_vec(), Some(vec![2.0; 4]));
        assert_eq!(samples[1].to_f64_vec(), Some(vec![0.0; 4]));

        // GR stays a full profile.
        let gr = result.get(fields::GR).and_then(|g| g.as_list()).unwrap();
        assert_eq!(gr[0].to_f64_vec(), Some(vec![1.0, 1.3, 1.0]));
    }

    #[test]
    fn test_empty_batch() {
        let table = table();
        let config = LookupConfig::default();
        let extractor = PayloadExtractor::new(&table, &config);

        let result = extractor.extract(&[], QueryShape::Batch, QueryMode::Full, None);
        assert_eq!(result.get(fields::BEST), Some(&FieldValue::List(vec![])));
        assert_eq!(result.get(fields::SUCCESS), Some(&FieldValue::List(vec![])));
        assert!(result.contains(fields::DISTMOD));
    }
}
