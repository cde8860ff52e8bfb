//! Pairwise scoring of a whole batch.
//!
//! Rows are scored in parallel: row `i` evaluates every pair `(i, j)` with
//! `j > i`, so a batch of `N` records costs exactly `N(N-1)/2` evaluations.
//! Row results are then merged into the index in row order, which keeps the
//! output deterministic.

use advertx_core::{AdvertId, AdvertRecord, SimilarityIndex};
use rayon::prelude::*;
use std::time::{Duration, Instant};

use crate::explain::ScoreBreakdown;

/// Counters for one scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub records: usize,
    pub pairs_evaluated: u64,
    pub linked_pairs: u64,
    pub elapsed: Duration,
}

/// Output of [`SimilarityEngine::build_index`].
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub index: SimilarityIndex,
    pub stats: IndexStats,
}

/// Builds a [`SimilarityIndex`] from normalized records.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score a single pair.
    #[inline]
    pub fn score(&self, a: &AdvertRecord, b: &AdvertRecord) -> f64 {
        ScoreBreakdown::between(a, b).total()
    }

    /// Score every unordered pair of `records` and link the ones above zero.
    ///
    /// Ids are expected to be unique; see `advertx_core::validate_batch`.
    pub fn build_index(&self, records: &[AdvertRecord]) -> ScoredBatch {
        let started = Instant::now();

        let rows: Vec<(u64, Vec<(AdvertId, AdvertId, f64)>)> = (0..records.len())
            .into_par_iter()
            .map(|i| {
                let left = &records[i];
                let rest = &records[i + 1..];
                let matches = rest
                    .iter()
                    .filter_map(|right| {
                        let breakdown = ScoreBreakdown::between(left, right);
                        breakdown
                            .is_match()
                            .then(|| (left.id, right.id, breakdown.total()))
                    })
                    .collect();
                (rest.len() as u64, matches)
            })
            .collect();

        let mut index = SimilarityIndex::new();
        for record in records {
            index.ensure_entry(record.id);
        }

        let mut pairs_evaluated = 0u64;
        let mut linked_pairs = 0u64;
        for (evaluated, matches) in rows {
            pairs_evaluated += evaluated;
            for (a, b, score) in matches {
                // Repeated ids would otherwise link a record to itself. A pair
                // already linked by an earlier row is left as is.
                if a == b || index.has_link(a, b) || index.has_link(b, a) {
                    continue;
                }
                index.insert_link(a, b, score);
                index.insert_link(b, a, score);
                linked_pairs += 1;
            }
        }

        ScoredBatch {
            index,
            stats: IndexStats {
                records: records.len(),
                pairs_evaluated,
                linked_pairs,
                elapsed: started.elapsed(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advertx_core::{normalize_batch, RawAdvert, SimilarityLink};

    fn records(raw: &[RawAdvert]) -> Vec<AdvertRecord> {
        normalize_batch(raw).unwrap()
    }

    /// A batch where most pairs link and some do not.
    fn mixed_batch() -> Vec<AdvertRecord> {
        let raw: Vec<RawAdvert> = (0..24u64)
            .map(|i| {
                RawAdvert::new(
                    i * 3 + 1,
                    100.0 + (i % 7) as f64 * 3.0,
                    format!("{} m2", 40 + (i % 5) * 4),
                    format!("(555) {}", 100 + i % 4),
                )
            })
            .collect();
        records(&raw)
    }

    #[test]
    fn test_worked_example() {
        let batch = records(&[
            RawAdvert::new(1, 100.0, "50 m2", "(555) 111"),
            RawAdvert::new(2, 104.0, "52 m2", "555111"),
        ]);

        let scored = SimilarityEngine::new().build_index(&batch);
        assert_eq!(scored.index.links_for(1), Some(&[SimilarityLink::new(2, 34.0)][..]));
        assert_eq!(scored.index.links_for(2), Some(&[SimilarityLink::new(1, 34.0)][..]));
        assert_eq!(scored.stats.linked_pairs, 1);
    }

    #[test]
    fn test_zero_score_not_linked() {
        let batch = records(&[
            RawAdvert::new(1, 100.0, "50 m2", "111"),
            RawAdvert::new(2, 120.0, "75 m2", "222"),
        ]);

        let scored = SimilarityEngine::new().build_index(&batch);
        assert_eq!(scored.index.len(), 2);
        assert_eq!(scored.index.link_count(), 0);
        assert_eq!(scored.index.links_for(1), Some(&[][..]));
    }

    #[test]
    fn test_every_id_has_entry() {
        let batch = mixed_batch();
        let scored = SimilarityEngine::new().build_index(&batch);

        assert_eq!(scored.index.len(), batch.len());
        for record in &batch {
            assert!(scored.index.contains(record.id));
        }
    }

    #[test]
    fn test_pair_evaluation_count() {
        for n in [0usize, 1, 2, 5, 24] {
            let batch: Vec<AdvertRecord> = mixed_batch().into_iter().take(n).collect();
            let scored = SimilarityEngine::new().build_index(&batch);
            assert_eq!(scored.stats.pairs_evaluated, (n * n.saturating_sub(1) / 2) as u64);
            assert_eq!(scored.stats.records, n);
        }
    }

    #[test]
    fn test_links_symmetric_without_self_or_duplicates() {
        let batch = mixed_batch();
        let scored = SimilarityEngine::new().build_index(&batch);
        let index = &scored.index;
        assert!(index.link_count() > 0);

        for (id, links) in index.iter() {
            let mut targets = std::collections::HashSet::new();
            for link in links {
                assert_ne!(link.target, id);
                assert!(targets.insert(link.target), "duplicate link {} -> {}", id, link.target);
                assert!(link.score > 0.0 && link.score <= advertx_core::MAX_SCORE);

                let back = index
                    .links_for(link.target)
                    .and_then(|links| links.iter().find(|l| l.target == id))
                    .expect("missing reverse link");
                assert_eq!(back.score, link.score);
            }
        }
        assert_eq!(index.link_count() as u64, scored.stats.linked_pairs * 2);
    }

    #[test]
    fn test_repeated_id_never_links_to_itself() {
        // Bypasses validation, which would reject this batch.
        let batch: Vec<AdvertRecord> = [
            RawAdvert::new(1, 100.0, "50 m2", "555"),
            RawAdvert::new(1, 100.0, "50 m2", "555"),
            RawAdvert::new(2, 100.0, "50 m2", "555"),
        ]
        .iter()
        .map(AdvertRecord::from_raw)
        .collect();

        let scored = SimilarityEngine::new().build_index(&batch);
        assert_eq!(scored.stats.pairs_evaluated, 3);
        assert_eq!(scored.index.links_for(1), Some(&[SimilarityLink::new(2, 100.0)][..]));
        assert_eq!(scored.index.links_for(2), Some(&[SimilarityLink::new(1, 100.0)][..]));
        assert_eq!(scored.stats.linked_pairs, 1);
    }

    #[test]
    fn test_score_commutative() {
        let engine = SimilarityEngine::new();
        let batch = mixed_batch();
        for a in &batch {
            for b in &batch {
                assert_eq!(engine.score(a, b), engine.score(b, a));
            }
        }
    }

    #[test]
    fn test_order_does_not_change_links() {
        let engine = SimilarityEngine::new();
        let batch = mixed_batch();
        let mut reversed = batch.clone();
        reversed.reverse();

        let forward = engine.build_index(&batch).index;
        let backward = engine.build_index(&reversed).index;

        for (id, links) in forward.iter() {
            let mut a: Vec<_> = links.iter().map(|l| (l.target, l.score.to_bits())).collect();
            let mut b: Vec<_> = backward
                .links_for(id)
                .unwrap()
                .iter()
                .map(|l| (l.target, l.score.to_bits()))
                .collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_unparsable_fields_only_lose_their_points() {
        let batch = records(&[
            RawAdvert::new(1, 100.0, "n/a", "hidden"),
            RawAdvert::new(2, 100.0, "n/a", "hidden"),
        ]);

        let scored = SimilarityEngine::new().build_index(&batch);
        // Only the price matches.
        assert_eq!(scored.index.links_for(1), Some(&[SimilarityLink::new(2, 40.0)][..]));
    }
}
