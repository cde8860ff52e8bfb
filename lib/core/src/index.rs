//! The similarity index produced by one scoring pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::advert::AdvertId;

/// Highest score a pair of adverts can reach.
pub const MAX_SCORE: f64 = 100.0;

/// A scored association from one advert to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityLink {
    pub target: AdvertId,
    pub score: f64,
}

impl SimilarityLink {
    pub fn new(target: AdvertId, score: f64) -> Self {
        Self { target, score }
    }
}

/// Links per advert id.
///
/// Every id of the scored batch has an entry, possibly empty. Entries are kept
/// in id order so serialized snapshots are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimilarityIndex {
    entries: BTreeMap<AdvertId, Vec<SimilarityLink>>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `id` has an entry, leaving existing links untouched.
    pub fn ensure_entry(&mut self, id: AdvertId) {
        self.entries.entry(id).or_default();
    }

    /// Whether a link `from -> to` is already stored.
    pub fn has_link(&self, from: AdvertId, to: AdvertId) -> bool {
        self.entries
            .get(&from)
            .map_or(false, |links| links.iter().any(|link| link.target == to))
    }

    /// Store `from -> to` unless that direction already exists.
    ///
    /// Returns `true` when the link was added.
    pub fn insert_link(&mut self, from: AdvertId, to: AdvertId, score: f64) -> bool {
        if self.has_link(from, to) {
            return false;
        }
        self.entries
            .entry(from)
            .or_default()
            .push(SimilarityLink::new(to, score));
        true
    }

    #[inline]
    pub fn links_for(&self, id: AdvertId) -> Option<&[SimilarityLink]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    #[inline]
    pub fn contains(&self, id: AdvertId) -> bool {
        self.entries.contains_key(&id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of directed links.
    pub fn link_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn ids(&self) -> impl Iterator<Item = AdvertId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AdvertId, &[SimilarityLink])> + '_ {
        self.entries.iter().map(|(id, links)| (*id, links.as_slice()))
    }
}
