//! # zipscope API
//!
//! REST presentation boundary for zipscope.
//!
//! One stateless endpoint per user-visible dashboard output, all reading
//! from a shared immutable [`Dataset`](zipscope_core::Dataset):
//!
//! - `GET /api/dataset` - dataset summary
//! - `GET /api/similar` - ranked similarity results
//! - `GET /api/chart` - filtered reference/candidate traces for one render
//! - `GET /api/slider/{feature}` - slider bounds and marks
//! - `GET /api/zip/{zip}` - detail profile, 404 placeholder on a miss

pub mod rest;

pub use rest::RestApi;
