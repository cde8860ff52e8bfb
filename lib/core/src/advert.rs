//! Advert records as fetched and as compared.

use ahash::AHashSet;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::normalize::{normalize_area, normalize_contact};

/// Stable identifier of an advert within the external store.
pub type AdvertId = u64;

/// An advert row exactly as a data source delivers it.
///
/// `area` and `contact` are free text. Stores that hand them over as numbers
/// are accepted too; the number is turned back into text and normalized the
/// same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAdvert {
    pub id: AdvertId,
    pub price: f64,
    #[serde(default, alias = "s", deserialize_with = "text_or_number")]
    pub area: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub contact: String,
}

impl RawAdvert {
    pub fn new(id: AdvertId, price: f64, area: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            id,
            price,
            area: area.into(),
            contact: contact.into(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected text or number, got {}",
            other
        ))),
    }
}

/// An advert with its comparable fields normalized.
///
/// `None` in `area` or `contact` marks a value that could not be parsed. It
/// never matches anything, including another `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertRecord {
    pub id: AdvertId,
    pub price: f64,
    pub area: Option<f64>,
    pub contact: Option<u64>,
}

impl AdvertRecord {
    pub fn from_raw(raw: &RawAdvert) -> Self {
        Self {
            id: raw.id,
            price: raw.price,
            area: normalize_area(&raw.area),
            contact: normalize_contact(&raw.contact),
        }
    }
}

impl From<&RawAdvert> for AdvertRecord {
    fn from(raw: &RawAdvert) -> Self {
        Self::from_raw(raw)
    }
}

/// Check that a fetched batch has the shape the engine expects: unique ids and
/// finite prices. Unparsable `area`/`contact` text is not a shape error.
pub fn validate_batch(batch: &[RawAdvert]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(batch.len());
    for advert in batch {
        if !seen.insert(advert.id) {
            return Err(Error::DuplicateId(advert.id));
        }
        if !advert.price.is_finite() {
            return Err(Error::NonFinitePrice(advert.id));
        }
    }
    Ok(())
}

/// Validate and normalize a fetched batch in one pass.
pub fn normalize_batch(batch: &[RawAdvert]) -> Result<Vec<AdvertRecord>> {
    validate_batch(batch)?;
    Ok(batch.iter().map(AdvertRecord::from_raw).collect())
}
