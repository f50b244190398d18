// Range filtering for the presentation layer.
use crate::feature::Feature;
use crate::rank::SimilarityResult;
use crate::record::ZipRecord;

/// Predicate over demographic records.
pub trait RowFilter {
    fn matches(&self, record: &ZipRecord) -> bool;
}

/// Inclusive `[min, max]` bound on one scalar feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub feature: Feature,
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(feature: Feature, min: f64, max: f64) -> Self {
        Self { feature, min, max }
    }
}

impl RowFilter for RangeFilter {
    fn matches(&self, record: &ZipRecord) -> bool {
        let v = record.feature(self.feature);
        v >= self.min && v <= self.max
    }
}

/// Chart-ready slice of the precomputed ranking.
///
/// Pure view: both input sets are borrowed from the globally computed
/// ranking and are never reordered or mutated. Candidates keep rank order
/// and are capped after filtering.
#[derive(Debug)]
pub struct FilteredView<'a> {
    pub reference: Vec<&'a ZipRecord>,
    pub candidates: Vec<(&'a SimilarityResult, &'a ZipRecord)>,
}

impl<'a> FilteredView<'a> {
    pub fn compute(
        reference: &[&'a ZipRecord],
        ranked: &[(&'a SimilarityResult, &'a ZipRecord)],
        filter: &RangeFilter,
        cap: usize,
    ) -> Self {
        let reference = reference
            .iter()
            .copied()
            .filter(|r| filter.matches(r))
            .collect();
        let candidates = ranked
            .iter()
            .copied()
            .filter(|(_, r)| filter.matches(r))
            .take(cap)
            .collect();
        Self {
            reference,
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_record;

    fn sample() -> Vec<ZipRecord> {
        vec![
            test_record("a", 100.0, 10_000.0),
            test_record("b", 200.0, 20_000.0),
            test_record("c", 300.0, 30_000.0),
            test_record("d", 400.0, 40_000.0),
        ]
    }

    fn result_for(zip: &str, rank: usize) -> SimilarityResult {
        SimilarityResult {
            zip: zip.to_string(),
            centroid_distance: rank as f64,
            nearest_reference_zip: "r".to_string(),
            nearest_distance: rank as f64,
            similarity_score: 1.0 / rank as f64,
        }
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let f = RangeFilter::new(Feature::Population, 200.0, 300.0);
        let rows = sample();
        assert!(!f.matches(&rows[0]));
        assert!(f.matches(&rows[1]));
        assert!(f.matches(&rows[2]));
        assert!(!f.matches(&rows[3]));
    }

    #[test]
    fn test_filter_caps_candidates_in_rank_order() {
        let rows = sample();
        let results: Vec<SimilarityResult> = (0..rows.len())
            .map(|i| result_for(&rows[i].zip, i + 1))
            .collect();
        let ranked: Vec<(&SimilarityResult, &ZipRecord)> =
            results.iter().zip(rows.iter()).collect();

        let filter = RangeFilter::new(Feature::Population, 0.0, 1_000.0);
        let view = FilteredView::compute(&[], &ranked, &filter, 2);
        assert_eq!(view.candidates.len(), 2);
        assert_eq!(view.candidates[0].1.zip, "a");
        assert_eq!(view.candidates[1].1.zip, "b");
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = sample();
        let results: Vec<SimilarityResult> = (0..rows.len())
            .map(|i| result_for(&rows[i].zip, i + 1))
            .collect();
        let reference: Vec<&ZipRecord> = rows.iter().take(1).collect();
        let ranked: Vec<(&SimilarityResult, &ZipRecord)> =
            results.iter().zip(rows.iter()).skip(1).collect();

        let filter = RangeFilter::new(Feature::Population, 150.0, 350.0);
        let once = FilteredView::compute(&reference, &ranked, &filter, 50);
        let twice = FilteredView::compute(&once.reference, &once.candidates, &filter, 50);

        let zips = |view: &FilteredView| -> Vec<String> {
            view.candidates
                .iter()
                .map(|(_, r)| r.zip.clone())
                .collect()
        };
        assert_eq!(zips(&once), zips(&twice));
        assert_eq!(once.reference.len(), twice.reference.len());
    }

    #[test]
    fn test_filter_does_not_mutate_inputs() {
        let rows = sample();
        let results: Vec<SimilarityResult> = (0..rows.len())
            .map(|i| result_for(&rows[i].zip, i + 1))
            .collect();
        let ranked: Vec<(&SimilarityResult, &ZipRecord)> =
            results.iter().zip(rows.iter()).collect();

        let filter = RangeFilter::new(Feature::Population, 250.0, 1_000.0);
        let _ = FilteredView::compute(&[], &ranked, &filter, 1);
        assert_eq!(ranked.len(), rows.len());
        assert_eq!(ranked[0].1.zip, "a");
    }
}
