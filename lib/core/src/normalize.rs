//! Field normalization for advert comparison.
//!
//! Both functions are total: anything that does not parse becomes `None`,
//! which the similarity engine treats as "never equal".

/// Unit suffixes accepted after an area value, longest first.
const AREA_UNITS: &[&str] = &["кв.м", "sq.m", "sqm", "m²", "м²", "m2", "м2", "m", "м"];

/// Parse a phone number written with parentheses, spaces or hyphens.
///
/// `"(555) 111-22"` and `"55511122"` both normalize to `55511122`.
pub fn normalize_contact(raw: &str) -> Option<u64> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '-') && !c.is_whitespace())
        .collect();
    digits.parse::<u64>().ok()
}

/// Parse an area written with an optional unit, e.g. `"52 m2"` or `"45,5 м²"`.
pub fn normalize_area(raw: &str) -> Option<f64> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let value = AREA_UNITS
        .iter()
        .find_map(|unit| compact.strip_suffix(unit))
        .unwrap_or(&compact)
        .replace(',', ".");

    value.parse::<f64>().ok().filter(|area| area.is_finite())
}
