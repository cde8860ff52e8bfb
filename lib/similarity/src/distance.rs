//! Per-field contributions to a pair score.
//!
//! Each function returns points in `[0, cap]` and is symmetric in its two
//! arguments. Unparsed values (`None`) contribute nothing.

/// Points for matching contacts.
pub const MAX_CONTACT: f64 = 20.0;
/// Points for matching areas.
pub const MAX_AREA: f64 = 40.0;
/// Points for matching prices.
pub const MAX_PRICE: f64 = 40.0;

/// Largest area difference that still earns points.
pub const AREA_BAND: f64 = 10.0;
/// Largest price difference that still earns points, relative to the lower price.
pub const PRICE_BAND_RATIO: f64 = 0.1;

pub fn contact_contribution(a: Option<u64>, b: Option<u64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => MAX_CONTACT,
        _ => 0.0,
    }
}

/// Full points for equal areas, otherwise `40 * (|Δ| + 1) / 20` while
/// `|Δ| <= 10`.
pub fn area_contribution(a: Option<f64>, b: Option<f64>) -> f64 {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };
    if a == b {
        return MAX_AREA;
    }
    let diff = (a - b).abs();
    if diff <= AREA_BAND {
        MAX_AREA * (diff + 1.0) / (AREA_BAND * 2.0)
    } else {
        0.0
    }
}

/// Full points for equal prices, otherwise `40 * |Δ| / (2 * band)` while
/// `|Δ| < band`, with `band = 0.1 * min(a, b)`.
pub fn price_contribution(a: f64, b: f64) -> f64 {
    if a == b {
        return MAX_PRICE;
    }
    let band = PRICE_BAND_RATIO * a.min(b);
    let diff = (a - b).abs();
    if diff < band {
        MAX_PRICE * diff / (band * 2.0)
    } else {
        0.0
    }
}
