//! # advertx Core
//!
//! Core types shared by every advertx crate:
//!
//! - [`RawAdvert`] - An advert row as a data source delivers it
//! - [`AdvertRecord`] - An advert with normalized, comparable fields
//! - [`SimilarityLink`] / [`SimilarityIndex`] - The result of a scoring pass
//! - [`normalize`] - Contact and area parsing
//!
//! ## Example
//!
//! ```rust
//! use advertx_core::{AdvertRecord, RawAdvert};
//!
//! let raw = RawAdvert::new(1, 100.0, "50 m2", "(555) 111");
//! let record = AdvertRecord::from_raw(&raw);
//! assert_eq!(record.area, Some(50.0));
//! assert_eq!(record.contact, Some(555111));
//! ```

pub mod advert;
pub mod error;
pub mod index;
pub mod normalize;

pub use advert::{normalize_batch, validate_batch, AdvertId, AdvertRecord, RawAdvert};
pub use error::{Error, Result};
pub use index::{SimilarityIndex, SimilarityLink, MAX_SCORE};
pub use normalize::{normalize_area, normalize_contact};
