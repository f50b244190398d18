use serde::{Deserialize, Serialize};

/// A standardized feature vector.
///
/// Census statistics span eight orders of magnitude (fractional shares up to
/// six-figure home values), so components are `f64`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f64]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Euclidean (L2) distance to another vector.
    #[inline]
    pub fn l2_distance(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Squared L2 distance; avoids the sqrt where only ordering matters.
    #[inline]
    pub fn l2_distance_sq(&self, other: &FeatureVector) -> f64 {
        if self.dim() != other.dim() {
            return f64::INFINITY;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f64>()
    }

    /// Component-wise mean of a non-empty set of vectors.
    ///
    /// Returns `None` for an empty slice; callers decide how to report that.
    #[must_use]
    pub fn centroid(vectors: &[FeatureVector]) -> Option<FeatureVector> {
        let first = vectors.first()?;
        let dim = first.dim();
        let mut acc = vec![0.0f64; dim];
        for v in vectors {
            debug_assert_eq!(v.dim(), dim);
            for (slot, x) in acc.iter_mut().zip(v.data.iter()) {
                *slot += x;
            }
        }
        let n = vectors.len() as f64;
        for slot in &mut acc {
            *slot /= n;
        }
        Some(FeatureVector::new(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_distance() {
        let v1 = FeatureVector::new(vec![0.0, 0.0]);
        let v2 = FeatureVector::new(vec![3.0, 4.0]);
        assert!((v1.l2_distance(&v2) - 5.0).abs() < 1e-12);
        assert!((v1.l2_distance_sq(&v2) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_l2_distance_dim_mismatch_is_infinite() {
        let v1 = FeatureVector::new(vec![0.0, 0.0]);
        let v2 = FeatureVector::new(vec![1.0]);
        assert!(v1.l2_distance(&v2).is_infinite());
    }

    #[test]
    fn test_centroid() {
        let vs = vec![
            FeatureVector::new(vec![0.0, 2.0]),
            FeatureVector::new(vec![4.0, 6.0]),
        ];
        let c = FeatureVector::centroid(&vs).unwrap();
        assert_eq!(c.as_slice(), &[2.0, 4.0]);
    }

    #[test]
    fn test_centroid_of_empty_set_is_none() {
        assert!(FeatureVector::centroid(&[]).is_none());
    }
}
