//! # zipscope Core
//!
//! Core library for the zipscope demographic similarity engine.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`ZipRecord`] - One deduplicated demographic record per ZIP code
//! - [`Feature`] - The fixed similarity feature vocabulary
//! - [`StandardScaler`] - Reference-fitted standardization
//! - [`rank`] - Centroid-distance similarity ranking
//! - [`Tsne`] - Deterministic t-SNE projection for the scatter view
//! - [`Dataset`] - Immutable precomputed dataset with filtered views and
//!   detail lookup
//!
//! ## Example
//!
//! ```rust
//! use zipscope_core::{Dataset, Feature, Lookup};
//! use zipscope_core::record::ZipRecord;
//!
//! # fn record(zip: &str, population: f64, income: f64) -> ZipRecord {
//! #     ZipRecord {
//! #         zip: zip.to_string(),
//! #         population,
//! #         median_income: income,
//! #         bachelor_degree: 0.2,
//! #         graduate_degree: 0.1,
//! #         white_alone: 0.5,
//! #         black_alone: 0.1,
//! #         hispanic_latino: 0.3,
//! #         unemployment: 0.05,
//! #         median_home_value: 400_000.0,
//! #         median_age: 35.0,
//! #         median_gross_rent: 1_500.0,
//! #     }
//! # }
//! let records = vec![
//!     record("92503", 100.0, 50_000.0),
//!     record("92504", 200.0, 60_000.0),
//!     record("90001", 150.0, 55_000.0),
//!     record("90002", 180.0, 52_000.0),
//! ];
//!
//! let dataset = Dataset::builder(records)
//!     .reference(vec!["92503".to_string(), "92504".to_string()])
//!     .build()
//!     .unwrap();
//!
//! // Ranked candidates, closest first.
//! let top = &dataset.results()[0];
//! assert_eq!(top.zip, "90001");
//!
//! // Filtered chart view and detail lookup.
//! let view = dataset.chart_view(Feature::Population, 0.0, 1_000.0, None);
//! assert_eq!(view.reference.len(), 2);
//! assert!(matches!(dataset.lookup("12345"), Lookup::NotFound));
//! ```

pub mod dataset;
pub mod error;
pub mod feature;
pub mod filter;
pub mod project;
pub mod rank;
pub mod record;
pub mod scaler;
pub mod vector;

pub use dataset::{
    Dataset, DatasetBuilder, DatasetConfig, DatasetInfo, DetailRecord, Lookup, SliderBounds,
    SliderMark,
};
pub use error::{Error, Result};
pub use feature::{Dimension, Feature};
pub use filter::{FilteredView, RangeFilter, RowFilter};
pub use project::{project_combined, Projector, Tsne, TsneConfig};
pub use rank::{rank, Ranking, ScaledRow, SimilarityResult, SIMILARITY_MAX};
pub use record::{CityLink, ZipRecord};
pub use scaler::StandardScaler;
pub use vector::FeatureVector;
