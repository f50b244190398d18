//! Zero-mean/unit-variance standardization.
//!
//! The scaler is always fit on the reference rows and then applied,
//! unchanged, to every candidate row. Refitting per subset would make the
//! centroid distances incomparable across rows.

use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::record::ZipRecord;
use crate::vector::FeatureVector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    features: Vec<Feature>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-feature mean and standard deviation on the given rows.
    ///
    /// Uses the population standard deviation. A constant column (zero
    /// spread) scales by 1.0 so it contributes a constant, not a NaN.
    pub fn fit(rows: &[&ZipRecord], features: &[Feature]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::InvalidConfig(
                "cannot fit scaler on an empty row set".to_string(),
            ));
        }
        if features.is_empty() {
            return Err(Error::InvalidConfig(
                "cannot fit scaler without feature columns".to_string(),
            ));
        }

        let n = rows.len() as f64;
        let mut means = Vec::with_capacity(features.len());
        let mut stds = Vec::with_capacity(features.len());

        for &feature in features {
            let mean = rows.iter().map(|r| r.feature(feature)).sum::<f64>() / n;
            let var = rows
                .iter()
                .map(|r| {
                    let d = r.feature(feature) - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            let std = var.sqrt();
            means.push(mean);
            stds.push(if std > 0.0 { std } else { 1.0 });
        }

        Ok(Self {
            features: features.to_vec(),
            means,
            stds,
        })
    }

    /// Transform one record with the fitted statistics.
    #[must_use]
    pub fn transform(&self, record: &ZipRecord) -> FeatureVector {
        let data = self
            .features
            .iter()
            .enumerate()
            .map(|(i, &f)| (record.feature(f) - self.means[i]) / self.stds[i])
            .collect();
        FeatureVector::new(data)
    }

    /// Transform a batch of records, preserving order.
    #[must_use]
    pub fn transform_all(&self, records: &[&ZipRecord]) -> Vec<FeatureVector> {
        records.iter().map(|r| self.transform(r)).collect()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_record;

    #[test]
    fn test_fit_transform_zero_mean_unit_variance() {
        let rows = vec![
            test_record("1", 10.0, 100.0),
            test_record("2", 20.0, 200.0),
            test_record("3", 30.0, 300.0),
        ];
        let refs: Vec<&ZipRecord> = rows.iter().collect();
        let scaler =
            StandardScaler::fit(&refs, &[Feature::Population, Feature::MedianIncome]).unwrap();

        let scaled = scaler.transform_all(&refs);
        for col in 0..2 {
            let mean: f64 = scaled.iter().map(|v| v.as_slice()[col]).sum::<f64>() / 3.0;
            let var: f64 = scaled
                .iter()
                .map(|v| v.as_slice()[col].powi(2))
                .sum::<f64>()
                / 3.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_column_does_not_produce_nan() {
        let rows = vec![test_record("1", 5.0, 100.0), test_record("2", 5.0, 200.0)];
        let refs: Vec<&ZipRecord> = rows.iter().collect();
        let scaler = StandardScaler::fit(&refs, &[Feature::Population]).unwrap();
        let v = scaler.transform(&rows[0]);
        assert!(v.as_slice()[0].is_finite());
        assert_eq!(v.as_slice()[0], 0.0);
    }

    #[test]
    fn test_candidates_use_reference_statistics() {
        let reference = vec![test_record("1", 0.0, 0.0), test_record("2", 10.0, 10.0)];
        let refs: Vec<&ZipRecord> = reference.iter().collect();
        let scaler =
            StandardScaler::fit(&refs, &[Feature::Population, Feature::MedianIncome]).unwrap();

        // A candidate far outside the reference range scales with the
        // reference statistics, not its own.
        let candidate = test_record("9", 1000.0, 1000.0);
        let v = scaler.transform(&candidate);
        assert!((v.as_slice()[0] - (1000.0 - 5.0) / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_fit_is_an_error() {
        let refs: Vec<&ZipRecord> = Vec::new();
        assert!(StandardScaler::fit(&refs, &[Feature::Population]).is_err());
    }
}
