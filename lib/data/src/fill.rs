//! Per-column fill policy for missing numeric values.
//!
//! Zero is a valid "no data" reading for counts and percentage shares, but
//! not for income or unemployment, so the policy is chosen per column
//! rather than uniformly.

use serde::{Deserialize, Serialize};

/// Strategy for replacing a missing value in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillPolicy {
    /// Replace with zero.
    Zero,
    /// Replace with the median of the column's observed values.
    Median,
}

impl FillPolicy {
    /// The replacement value for this policy given the observed values.
    ///
    /// A median over an all-missing column falls back to zero.
    pub fn fill_value(&self, observed: &[f64]) -> f64 {
        match self {
            FillPolicy::Zero => 0.0,
            FillPolicy::Median => median(observed).unwrap_or(0.0),
        }
    }
}

/// Median of a set of values; the mean of the two middle values for even
/// lengths, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
