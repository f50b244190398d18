//! # zipscope
//!
//! A demographic ZIP-code similarity engine with a dashboard API.
//!
//! zipscope loads census demographics joined to enrollment records, ranks
//! every ZIP code outside a fixed reference group by demographic similarity
//! to that group, projects the combined set to 2D/3D with t-SNE, and serves
//! filtered chart views and per-ZIP profiles over REST.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! cargo install zipscope
//! zipscope --census data/census.csv --enrollment data/enrollment.csv
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use zipscope::prelude::*;
//!
//! let records = zipscope::load_census("data/census.csv").unwrap();
//! let reference = ReferenceGroup::default_group();
//!
//! let dataset = Dataset::builder(records)
//!     .reference(reference.to_vec())
//!     .build()
//!     .unwrap();
//!
//! // Ranked candidates, closest to the reference centroid first.
//! for result in dataset.results().iter().take(10) {
//!     println!(
//!         "{} (closest reference: {}, score {:.2})",
//!         result.zip, result.nearest_reference_zip, result.similarity_score
//!     );
//! }
//! ```
//!
//! ## Crate Structure
//!
//! zipscope is composed of several crates:
//!
//! - [`zipscope-core`](zipscope_core) - Records, scaler, ranker, filter,
//!   t-SNE projection, immutable dataset
//! - [`zipscope-data`](zipscope_data) - Flat-file loaders, fill policy,
//!   reference-group configuration
//! - [`zipscope-api`](zipscope_api) - REST endpoints for the dashboard

// Re-export core types
pub use zipscope_core::{
    rank, Dataset, DatasetBuilder, DatasetConfig, DatasetInfo, Dimension, DetailRecord, Error,
    Feature, FeatureVector, FilteredView, Lookup, Projector, RangeFilter, Ranking, Result,
    SimilarityResult, SliderBounds, StandardScaler, Tsne, TsneConfig, ZipRecord, SIMILARITY_MAX,
};

// Re-export data loading
pub use zipscope_data::{
    load_census, load_city_images, load_city_links, load_zip_counts, ReferenceGroup,
};

// Re-export API
pub use zipscope_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        rank, Dataset, DatasetBuilder, DatasetConfig, Dimension, Feature, FilteredView, Lookup,
        RangeFilter, ReferenceGroup, RestApi, SimilarityResult, Tsne, TsneConfig, ZipRecord,
    };
}
