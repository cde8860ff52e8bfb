//! # advertx Similarity
//!
//! Pairwise similarity scoring for adverts suspected to be duplicates.
//!
//! A pair score is the sum of three capped contributions:
//!
//! | field   | cap | rule |
//! |---------|-----|------|
//! | contact | 20  | exact match of the normalized phone number |
//! | area    | 40  | exact match, or linear band up to 10 units apart |
//! | price   | 40  | exact match, or linear band below 10% of the lower price |
//!
//! Pairs scoring zero are not linked.
//!
//! ## Example
//!
//! ```rust
//! use advertx_core::{normalize_batch, RawAdvert};
//! use advertx_similarity::SimilarityEngine;
//!
//! let batch = normalize_batch(&[
//!     RawAdvert::new(1, 100.0, "50 m2", "(555) 111"),
//!     RawAdvert::new(2, 104.0, "52 m2", "555111"),
//! ]).unwrap();
//!
//! let scored = SimilarityEngine::new().build_index(&batch);
//! assert_eq!(scored.index.links_for(1).unwrap()[0].score, 34.0);
//! ```

pub mod distance;
pub mod engine;
pub mod explain;

pub use distance::{
    area_contribution, contact_contribution, price_contribution, AREA_BAND, MAX_AREA,
    MAX_CONTACT, MAX_PRICE, PRICE_BAND_RATIO,
};
pub use engine::{IndexStats, ScoredBatch, SimilarityEngine};
pub use explain::ScoreBreakdown;
