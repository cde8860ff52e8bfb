//! Per-field breakdown of a pair score.

use advertx_core::AdvertRecord;
use serde::{Deserialize, Serialize};

use crate::distance::{area_contribution, contact_contribution, price_contribution};

/// The three contributions that make up a pair score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub contact: f64,
    pub area: f64,
    pub price: f64,
}

impl ScoreBreakdown {
    /// Score two records. Swapping the arguments gives the same breakdown.
    pub fn between(a: &AdvertRecord, b: &AdvertRecord) -> Self {
        Self {
            contact: contact_contribution(a.contact, b.contact),
            area: area_contribution(a.area, b.area),
            price: price_contribution(a.price, b.price),
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.contact + self.area + self.price
    }

    /// A pair is linked only when it scores above zero.
    #[inline]
    pub fn is_match(&self) -> bool {
        self.total() > 0.0
    }
}
