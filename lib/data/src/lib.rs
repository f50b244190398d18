//! # zipscope Data
//!
//! Flat-file ingestion for the zipscope demographic similarity engine.
//!
//! Loads the four input tables (census demographics, enrollment linkage,
//! optional city images, optional ZIP-occurrence counts), normalizes ZIP
//! keys, applies the per-column fill policy, and carries the reference-group
//! configuration. All output types come from
//! [`zipscope-core`](zipscope_core); this crate is the only one that
//! touches disk.

pub mod error;
pub mod fill;
pub mod reference;
pub mod tables;

pub use error::{Error, Result};
pub use fill::{median, FillPolicy};
pub use reference::{ReferenceGroup, DEFAULT_REFERENCE_ZIPS};
pub use tables::{load_census, load_city_images, load_city_links, load_zip_counts};
