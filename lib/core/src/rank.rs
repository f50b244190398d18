//! Centroid-distance similarity ranking.
//!
//! Candidates are ranked by Euclidean distance to the centroid of the
//! standardized reference rows. The nearest individual reference row is
//! reported separately per result: selection uses the centroid, the
//! human-readable "closest match" uses the full reference set.

use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::record::ZipRecord;
use crate::scaler::StandardScaler;
use crate::vector::FeatureVector;
use ahash::AHashSet;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Sentinel similarity for a candidate whose feature vector exactly
/// duplicates a reference row (nearest distance of zero).
pub const SIMILARITY_MAX: f64 = f64::MAX;

/// One ranked candidate ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub zip: String,
    /// Distance to the reference-group centroid; the ranking key.
    pub centroid_distance: f64,
    /// Reference ZIP with the smallest row-to-row distance.
    pub nearest_reference_zip: String,
    pub nearest_distance: f64,
    /// Reciprocal of `nearest_distance`, capped at [`SIMILARITY_MAX`].
    pub similarity_score: f64,
}

/// A record key paired with its standardized feature vector.
#[derive(Debug, Clone)]
pub struct ScaledRow {
    pub zip: String,
    pub vector: FeatureVector,
}

/// Output of [`rank`]: the fitted scaler, the standardized reference rows,
/// the selected candidate rows (rank order) and their similarity results.
///
/// `selected[i]` and `results[i]` describe the same candidate.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub scaler: StandardScaler,
    pub reference: Vec<ScaledRow>,
    pub selected: Vec<ScaledRow>,
    pub results: Vec<SimilarityResult>,
}

impl Ranking {
    /// Number of reference rows; the split point for combined projections.
    pub fn reference_len(&self) -> usize {
        self.reference.len()
    }
}

/// Rank all non-reference records by demographic similarity to the
/// reference group and keep the `k` closest.
///
/// The scaler is fit on the reference rows only; candidates are transformed
/// with those statistics. Ties on centroid distance preserve input order.
/// Returns exactly `min(k, candidate_count)` results.
pub fn rank(
    records: &[ZipRecord],
    reference_zips: &AHashSet<String>,
    features: &[Feature],
    k: usize,
) -> Result<Ranking> {
    let reference_records: Vec<&ZipRecord> = records
        .iter()
        .filter(|r| reference_zips.contains(&r.zip))
        .collect();
    let candidate_records: Vec<&ZipRecord> = records
        .iter()
        .filter(|r| !reference_zips.contains(&r.zip))
        .collect();

    if reference_records.is_empty() {
        return Err(Error::EmptyReferenceGroup);
    }

    let scaler = StandardScaler::fit(&reference_records, features)?;
    let reference_scaled = scaler.transform_all(&reference_records);
    let candidate_scaled = scaler.transform_all(&candidate_records);

    let centroid =
        FeatureVector::centroid(&reference_scaled).ok_or(Error::EmptyReferenceGroup)?;

    let centroid_distances: Vec<f64> = candidate_scaled
        .iter()
        .map(|v| v.l2_distance(&centroid))
        .collect();

    // Stable sort keeps input order on equal distances.
    let mut order: Vec<usize> = (0..candidate_records.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(centroid_distances[i]));
    order.truncate(k);

    let mut selected = Vec::with_capacity(order.len());
    let mut results = Vec::with_capacity(order.len());
    for &idx in &order {
        let vector = candidate_scaled[idx].clone();

        let mut nearest_idx = 0usize;
        let mut nearest_distance = f64::INFINITY;
        for (j, r) in reference_scaled.iter().enumerate() {
            let d = vector.l2_distance(r);
            if d < nearest_distance {
                nearest_idx = j;
                nearest_distance = d;
            }
        }

        let similarity_score = if nearest_distance > 0.0 {
            1.0 / nearest_distance
        } else {
            SIMILARITY_MAX
        };

        results.push(SimilarityResult {
            zip: candidate_records[idx].zip.clone(),
            centroid_distance: centroid_distances[idx],
            nearest_reference_zip: reference_records[nearest_idx].zip.clone(),
            nearest_distance,
            similarity_score,
        });
        selected.push(ScaledRow {
            zip: candidate_records[idx].zip.clone(),
            vector,
        });
    }

    let reference = reference_records
        .iter()
        .zip(reference_scaled)
        .map(|(r, vector)| ScaledRow {
            zip: r.zip.clone(),
            vector,
        })
        .collect();

    Ok(Ranking {
        scaler,
        reference,
        selected,
        results,
    })
}
