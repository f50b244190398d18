//! The immutable, process-wide dataset behind every handler.
//!
//! Everything expensive happens once in [`DatasetBuilder::build`]: dedup,
//! ranking, the 2D projection and the enriched profile join. The resulting
//! [`Dataset`] is read-only and safe to share across request handlers; the
//! only interior lock guards the lazily computed 3D projection.

use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::filter::{FilteredView, RangeFilter};
use crate::project::{project_combined, Tsne, TsneConfig};
use crate::rank::{rank, Ranking, SimilarityResult};
use crate::record::{CityLink, ZipRecord};
use crate::vector::FeatureVector;
use ahash::{AHashMap, AHashSet};
use parking_lot::RwLock;
use serde::Serialize;

/// Tunables for the one-time dataset computation.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Similarity feature columns, in matrix order.
    pub features: Vec<Feature>,
    /// Ranked candidates to keep.
    pub top_k: usize,
    /// Default presentation cap after filtering.
    pub chart_cap: usize,
    /// Projection parameters.
    pub tsne: TsneConfig,
    /// Restrict detail profiles to one state/province code.
    pub state_filter: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            features: Feature::ALL.to_vec(),
            top_k: 100,
            chart_cap: 50,
            tsne: TsneConfig::default(),
            state_filter: Some("CA".to_string()),
        }
    }
}

/// Enriched per-ZIP profile for the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRecord {
    pub zip: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub image_url: Option<String>,
    /// Sum of ZIP populations over the same (case-sensitive) city name.
    pub city_population: Option<f64>,
    pub population: f64,
    pub median_income: f64,
    pub median_age: f64,
    pub median_gross_rent: f64,
    pub median_home_value: f64,
    pub bachelor_degree: f64,
    pub graduate_degree: f64,
    pub white_alone: f64,
    pub black_alone: f64,
    pub hispanic_latino: f64,
    /// Enrollment occurrences for this ZIP, when the counts table was loaded.
    pub enrollments: Option<u64>,
}

/// Typed lookup outcome; a miss is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(DetailRecord),
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

/// One labeled tick on the filter slider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: String,
}

/// Slider domain for one feature.
#[derive(Debug, Clone, Serialize)]
pub struct SliderBounds {
    pub feature: String,
    pub min: f64,
    pub max: f64,
    pub marks: Vec<SliderMark>,
    pub label: String,
    pub percentage: bool,
}

/// Summary counts for the dataset endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub zip_count: usize,
    pub reference_count: usize,
    pub selected_count: usize,
    pub features: Vec<String>,
}

#[derive(Debug)]
pub struct Dataset {
    config: DatasetConfig,
    records: Vec<ZipRecord>,
    reference_rows: Vec<usize>,
    selected_rows: Vec<usize>,
    ranking: Ranking,
    coords2d: AHashMap<String, Vec<f64>>,
    coords3d: RwLock<Option<AHashMap<String, Vec<f64>>>>,
    profiles: AHashMap<String, DetailRecord>,
}

impl Dataset {
    pub fn builder(records: Vec<ZipRecord>) -> DatasetBuilder {
        DatasetBuilder::new(records)
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// All deduplicated records, input order.
    pub fn records(&self) -> &[ZipRecord] {
        &self.records
    }

    /// Ranked similarity results, ascending centroid distance.
    pub fn results(&self) -> &[SimilarityResult] {
        &self.ranking.results
    }

    pub fn reference_records(&self) -> impl Iterator<Item = &ZipRecord> {
        self.reference_rows.iter().map(|&i| &self.records[i])
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            zip_count: self.records.len(),
            reference_count: self.reference_rows.len(),
            selected_count: self.selected_rows.len(),
            features: self
                .config
                .features
                .iter()
                .map(|f| f.column().to_string())
                .collect(),
        }
    }

    /// Observed `[min, max]` of a feature over all records.
    pub fn feature_domain(&self, feature: Feature) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for r in &self.records {
            let v = r.feature(feature);
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_finite() {
            (min, max)
        } else {
            (0.0, 0.0)
        }
    }

    /// Slider domain for a feature: fixed [0, 1] with decile marks for
    /// shares, observed min/max with ten evenly spaced marks otherwise.
    pub fn slider_bounds(&self, feature: Feature) -> SliderBounds {
        if feature.is_share() {
            let marks = (0..=10)
                .map(|i| SliderMark {
                    value: i as f64 / 10.0,
                    label: format!("{}", i * 10),
                })
                .collect();
            SliderBounds {
                feature: feature.column().to_string(),
                min: 0.0,
                max: 1.0,
                marks,
                label: format!("{} Percentage %:", feature.label()),
                percentage: true,
            }
        } else {
            let (min, max) = self.feature_domain(feature);
            let step = (max - min) / 9.0;
            let marks = (0..10)
                .map(|i| {
                    let value = min + step * i as f64;
                    let label = if feature.in_thousands() {
                        format!("{}", (value / 1000.0) as i64)
                    } else {
                        format!("{}", value as i64)
                    };
                    SliderMark { value, label }
                })
                .collect();
            SliderBounds {
                feature: feature.column().to_string(),
                min,
                max,
                marks,
                label: format!("{} (in thousands):", feature.label()),
                percentage: false,
            }
        }
    }

    /// Filtered reference + capped candidate sets for one chart render.
    ///
    /// Stateless over the precomputed ranking; calling it never changes
    /// later calls.
    pub fn chart_view(
        &self,
        feature: Feature,
        min: f64,
        max: f64,
        cap: Option<usize>,
    ) -> FilteredView<'_> {
        let reference: Vec<&ZipRecord> =
            self.reference_rows.iter().map(|&i| &self.records[i]).collect();
        let ranked: Vec<(&SimilarityResult, &ZipRecord)> = self
            .ranking
            .results
            .iter()
            .zip(self.selected_rows.iter().map(|&i| &self.records[i]))
            .collect();
        let filter = RangeFilter::new(feature, min, max);
        FilteredView::compute(
            &reference,
            &ranked,
            &filter,
            cap.unwrap_or(self.config.chart_cap),
        )
    }

    /// Projection coordinates for a ZIP code that took part in the combined
    /// embedding (reference rows and selected candidates).
    pub fn coords(&self, zip: &str, dims: usize) -> Result<Option<Vec<f64>>> {
        match dims {
            2 => Ok(self.coords2d.get(zip).cloned()),
            3 => {
                self.ensure_coords3d()?;
                let guard = self.coords3d.read();
                Ok(guard.as_ref().and_then(|m| m.get(zip).cloned()))
            }
            other => Err(Error::InvalidProjectionDim(other)),
        }
    }

    /// Detail profile for a selected ZIP code.
    pub fn lookup(&self, zip: &str) -> Lookup {
        match self.profiles.get(zip.trim()) {
            Some(profile) => Lookup::Found(profile.clone()),
            None => Lookup::NotFound,
        }
    }

    fn ensure_coords3d(&self) -> Result<()> {
        if self.coords3d.read().is_some() {
            return Ok(());
        }
        let mut guard = self.coords3d.write();
        if guard.is_none() {
            *guard = Some(coords_map(&self.ranking, &self.config.tsne, 3)?);
        }
        Ok(())
    }
}

fn coords_map(
    ranking: &Ranking,
    tsne: &TsneConfig,
    dims: usize,
) -> Result<AHashMap<String, Vec<f64>>> {
    let projector = Tsne::new(tsne.clone());
    let reference: Vec<FeatureVector> = ranking
        .reference
        .iter()
        .map(|row| row.vector.clone())
        .collect();
    let candidates: Vec<FeatureVector> = ranking
        .selected
        .iter()
        .map(|row| row.vector.clone())
        .collect();

    let (ref_coords, cand_coords) = project_combined(&projector, &reference, &candidates, dims)?;

    let mut map = AHashMap::with_capacity(ref_coords.len() + cand_coords.len());
    for (row, coords) in ranking.reference.iter().zip(ref_coords) {
        map.insert(row.zip.clone(), coords);
    }
    for (row, coords) in ranking.selected.iter().zip(cand_coords) {
        map.insert(row.zip.clone(), coords);
    }
    Ok(map)
}

pub struct DatasetBuilder {
    records: Vec<ZipRecord>,
    reference: Vec<String>,
    links: Vec<CityLink>,
    images: Vec<(String, String)>,
    enrollment_counts: AHashMap<String, u64>,
    config: DatasetConfig,
}

impl DatasetBuilder {
    pub fn new(records: Vec<ZipRecord>) -> Self {
        Self {
            records,
            reference: Vec::new(),
            links: Vec::new(),
            images: Vec::new(),
            enrollment_counts: AHashMap::new(),
            config: DatasetConfig::default(),
        }
    }

    /// Reference-group ZIP codes (the similarity anchor).
    pub fn reference(mut self, zips: Vec<String>) -> Self {
        self.reference = zips;
        self
    }

    /// ZIP-to-city linkage rows from the enrollment table.
    pub fn city_links(mut self, links: Vec<CityLink>) -> Self {
        self.links = links;
        self
    }

    /// City-name to image-URL pairs.
    pub fn city_images(mut self, images: Vec<(String, String)>) -> Self {
        self.images = images;
        self
    }

    pub fn enrollment_counts(mut self, counts: AHashMap<String, u64>) -> Self {
        self.enrollment_counts = counts;
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    pub fn chart_cap(mut self, cap: usize) -> Self {
        self.config.chart_cap = cap;
        self
    }

    pub fn tsne(mut self, config: TsneConfig) -> Self {
        self.config.tsne = config;
        self
    }

    pub fn state_filter(mut self, state: Option<String>) -> Self {
        self.config.state_filter = state;
        self
    }

    pub fn features(mut self, features: Vec<Feature>) -> Self {
        self.config.features = features;
        self
    }

    /// Run the full one-time pipeline: dedup, rank, project, enrich.
    pub fn build(self) -> Result<Dataset> {
        let DatasetBuilder {
            records,
            reference,
            links,
            images,
            enrollment_counts,
            config,
        } = self;

        // One record per ZIP; first occurrence wins.
        let mut seen: AHashSet<String> = AHashSet::with_capacity(records.len());
        let records: Vec<ZipRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.zip.clone()))
            .collect();

        if reference.is_empty() {
            return Err(Error::EmptyReferenceGroup);
        }
        let reference_set: AHashSet<String> =
            reference.iter().map(|z| z.trim().to_string()).collect();

        let ranking = rank(&records, &reference_set, &config.features, config.top_k)?;
        let coords2d = coords_map(&ranking, &config.tsne, 2)?;

        let zip_index: AHashMap<&str, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.zip.as_str(), i))
            .collect();
        let reference_rows: Vec<usize> = ranking
            .reference
            .iter()
            .filter_map(|row| zip_index.get(row.zip.as_str()).copied())
            .collect();
        let selected_rows: Vec<usize> = ranking
            .selected
            .iter()
            .filter_map(|row| zip_index.get(row.zip.as_str()).copied())
            .collect();

        let profiles = build_profiles(
            &records,
            &links,
            &images,
            &enrollment_counts,
            config.state_filter.as_deref(),
        );

        Ok(Dataset {
            config,
            records,
            reference_rows,
            selected_rows,
            ranking,
            coords2d,
            coords3d: RwLock::new(None),
            profiles,
        })
    }
}

/// Left-join city/state and image data onto the records, restricted to the
/// configured state, and aggregate city populations.
fn build_profiles(
    records: &[ZipRecord],
    links: &[CityLink],
    images: &[(String, String)],
    enrollment_counts: &AHashMap<String, u64>,
    state_filter: Option<&str>,
) -> AHashMap<String, DetailRecord> {
    // First link per ZIP wins, matching the post-merge dedup of the source.
    let mut link_by_zip: AHashMap<&str, &CityLink> = AHashMap::with_capacity(links.len());
    for link in links {
        link_by_zip.entry(link.zip.as_str()).or_insert(link);
    }

    // Image lookup is case-insensitive on city name.
    let image_by_city: AHashMap<String, &str> = images
        .iter()
        .map(|(city, url)| (city.to_lowercase(), url.as_str()))
        .collect();

    let in_scope = |link: Option<&&CityLink>| -> bool {
        match state_filter {
            Some(want) => link
                .and_then(|l| l.state.as_deref())
                .is_some_and(|s| s == want),
            None => true,
        }
    };

    // City populations aggregate over case-sensitive city-name equality.
    let mut city_population: AHashMap<&str, f64> = AHashMap::new();
    for record in records {
        let link = link_by_zip.get(record.zip.as_str());
        if !in_scope(link) {
            continue;
        }
        if let Some(city) = link.and_then(|l| l.city.as_deref()) {
            *city_population.entry(city).or_insert(0.0) += record.population;
        }
    }

    let mut profiles = AHashMap::new();
    for record in records {
        let link = link_by_zip.get(record.zip.as_str());
        if !in_scope(link) {
            continue;
        }
        let city = link.and_then(|l| l.city.clone());
        let state = link.and_then(|l| l.state.clone());
        let image_url = city
            .as_deref()
            .and_then(|c| image_by_city.get(&c.to_lowercase()))
            .map(|url| url.to_string());
        let city_pop = city
            .as_deref()
            .and_then(|c| city_population.get(c).copied());

        profiles.insert(
            record.zip.clone(),
            DetailRecord {
                zip: record.zip.clone(),
                city,
                state,
                image_url,
                city_population: city_pop,
                population: record.population,
                median_income: record.median_income,
                median_age: record.median_age,
                median_gross_rent: record.median_gross_rent,
                median_home_value: record.median_home_value,
                bachelor_degree: record.bachelor_degree,
                graduate_degree: record.graduate_degree,
                white_alone: record.white_alone,
                black_alone: record.black_alone,
                hispanic_latino: record.hispanic_latino,
                enrollments: enrollment_counts.get(&record.zip).copied(),
            },
        );
    }
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_record;

    fn link(zip: &str, city: &str, state: &str) -> CityLink {
        CityLink {
            zip: zip.to_string(),
            city: Some(city.to_string()),
            state: Some(state.to_string()),
        }
    }

    fn sample_records() -> Vec<ZipRecord> {
        vec![
            test_record("92503", 100.0, 50_000.0),
            test_record("92504", 200.0, 60_000.0),
            test_record("90001", 150.0, 55_000.0),
            test_record("90002", 180.0, 52_000.0),
            test_record("10001", 9_000.0, 200_000.0),
        ]
    }

    fn quick_config() -> TsneConfig {
        TsneConfig {
            n_iter: 200,
            exaggeration_iters: 50,
            ..TsneConfig::default()
        }
    }

    fn sample_dataset() -> Dataset {
        Dataset::builder(sample_records())
            .reference(vec!["92503".to_string(), "92504".to_string()])
            .city_links(vec![
                link("92503", "Riverside", "CA"),
                link("92504", "Riverside", "CA"),
                link("90001", "Los Angeles", "CA"),
                link("10001", "New York", "NY"),
            ])
            .city_images(vec![(
                "riverside".to_string(),
                "https://img.example/riverside.jpg".to_string(),
            )])
            .tsne(quick_config())
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_ranks_and_projects() {
        let ds = sample_dataset();
        assert_eq!(ds.info().reference_count, 2);
        assert_eq!(ds.info().selected_count, 3);
        assert_eq!(ds.results()[0].zip, "90001");

        // Every embedded row has 2D coordinates.
        for r in ds.results() {
            assert!(ds.coords(&r.zip, 2).unwrap().is_some());
        }
        assert!(ds.coords("92503", 2).unwrap().is_some());
        // A ZIP outside the embedding has none.
        assert!(ds.coords("00000", 2).unwrap().is_none());
    }

    #[test]
    fn test_coords3d_is_lazy_and_cached() {
        let ds = sample_dataset();
        assert!(ds.coords3d.read().is_none());
        let c = ds.coords("92503", 3).unwrap().unwrap();
        assert_eq!(c.len(), 3);
        assert!(ds.coords3d.read().is_some());
        assert_eq!(ds.coords("92503", 3).unwrap().unwrap(), c);
    }

    #[test]
    fn test_coords_invalid_dims() {
        let ds = sample_dataset();
        assert!(ds.coords("92503", 5).is_err());
    }

    #[test]
    fn test_duplicate_zip_keeps_first_record() {
        let mut records = sample_records();
        records.push(test_record("92503", 999.0, 1.0));
        let ds = Dataset::builder(records)
            .reference(vec!["92503".to_string(), "92504".to_string()])
            .tsne(quick_config())
            .build()
            .unwrap();
        assert_eq!(ds.info().zip_count, 5);
        let rec = ds.records().iter().find(|r| r.zip == "92503").unwrap();
        assert_eq!(rec.population, 100.0);
    }

    #[test]
    fn test_empty_reference_is_config_error() {
        let err = Dataset::builder(sample_records())
            .reference(Vec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyReferenceGroup));
    }

    #[test]
    fn test_lookup_found_with_city_aggregate() {
        let ds = sample_dataset();
        let Lookup::Found(profile) = ds.lookup("92503") else {
            panic!("expected a profile for 92503");
        };
        assert_eq!(profile.city.as_deref(), Some("Riverside"));
        // 92503 + 92504 share the city name.
        assert_eq!(profile.city_population, Some(300.0));
        assert_eq!(
            profile.image_url.as_deref(),
            Some("https://img.example/riverside.jpg")
        );
    }

    #[test]
    fn test_lookup_respects_state_filter() {
        let ds = sample_dataset();
        // Present in the census but linked to NY: outside the default filter.
        assert_eq!(ds.lookup("10001"), Lookup::NotFound);
        // Present in the census but never linked to a city.
        assert_eq!(ds.lookup("90002"), Lookup::NotFound);
        // Unknown key.
        assert_eq!(ds.lookup("99999"), Lookup::NotFound);
    }

    #[test]
    fn test_lookup_without_state_filter_includes_unlinked() {
        let ds = Dataset::builder(sample_records())
            .reference(vec!["92503".to_string(), "92504".to_string()])
            .state_filter(None)
            .tsne(quick_config())
            .build()
            .unwrap();
        let Lookup::Found(profile) = ds.lookup("90002") else {
            panic!("expected a profile for 90002");
        };
        assert_eq!(profile.city, None);
        assert_eq!(profile.city_population, None);
    }

    #[test]
    fn test_city_population_is_case_sensitive() {
        let ds = Dataset::builder(sample_records())
            .reference(vec!["92503".to_string(), "92504".to_string()])
            .city_links(vec![
                link("92503", "Riverside", "CA"),
                link("92504", "RIVERSIDE", "CA"),
            ])
            .tsne(quick_config())
            .build()
            .unwrap();
        let Lookup::Found(profile) = ds.lookup("92503") else {
            panic!("expected a profile for 92503");
        };
        // Differently cased duplicates do not merge.
        assert_eq!(profile.city_population, Some(100.0));
    }

    #[test]
    fn test_chart_view_filters_and_caps() {
        let ds = sample_dataset();
        let view = ds.chart_view(Feature::Population, 0.0, 500.0, Some(1));
        assert_eq!(view.reference.len(), 2);
        assert_eq!(view.candidates.len(), 1);
        assert_eq!(view.candidates[0].1.zip, "90001");

        // Narrow range drops the outlier even without the cap.
        let view = ds.chart_view(Feature::Population, 0.0, 500.0, Some(50));
        assert!(view.candidates.iter().all(|(_, r)| r.zip != "10001"));
    }

    #[test]
    fn test_slider_bounds_share_feature() {
        let ds = sample_dataset();
        let bounds = ds.slider_bounds(Feature::Unemployment);
        assert!(bounds.percentage);
        assert_eq!(bounds.min, 0.0);
        assert_eq!(bounds.max, 1.0);
        assert_eq!(bounds.marks.len(), 11);
        assert_eq!(bounds.marks[10].label, "100");
    }

    #[test]
    fn test_slider_bounds_absolute_feature() {
        let ds = sample_dataset();
        let bounds = ds.slider_bounds(Feature::Population);
        assert!(!bounds.percentage);
        assert_eq!(bounds.min, 100.0);
        assert_eq!(bounds.max, 9_000.0);
        assert_eq!(bounds.marks.len(), 10);
    }

    #[test]
    fn test_feature_domain() {
        let ds = sample_dataset();
        let (min, max) = ds.feature_domain(Feature::MedianIncome);
        assert_eq!(min, 50_000.0);
        assert_eq!(max, 200_000.0);
    }
}
