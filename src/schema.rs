// Column vocabulary of the processed PAM/census dataset.
//
// Both the normalizer and the validator go through this module for every
// name comparison, so header drift is handled in exactly one place.
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

pub const MUNICIPALITY: &str = "municipality";
pub const YEAR: &str = "year";
pub const PRODUCT: &str = "product";
pub const HARVESTED_AREA: &str = "harvested_area_ha";
pub const QUANTITY: &str = "quantity_produced_ton";
pub const AVERAGE_YIELD: &str = "average_yield_kg_ha";
pub const MEDIAN_PRICE: &str = "median_price_r$_kg";
pub const AVERAGE_PRICE: &str = "average_price_r$_per_kg";
pub const PRICE_STDDEV: &str = "price_stddev_r$_kg";
pub const PRICE_OBSERVATIONS: &str = "price_observation_count";

/// The closed set of columns a published file must carry.
pub const CANONICAL_COLUMNS: [&str; 10] = [
    MUNICIPALITY,
    YEAR,
    PRODUCT,
    HARVESTED_AREA,
    QUANTITY,
    AVERAGE_YIELD,
    MEDIAN_PRICE,
    AVERAGE_PRICE,
    PRICE_STDDEV,
    PRICE_OBSERVATIONS,
];

/// Standard deviation is undefined for a single price observation, so this
/// is the only column allowed to hold nulls.
pub const NULLABLE_COLUMNS: [&str; 1] = [PRICE_STDDEV];

/// Older header names still found in historical raw files.
pub static LEGACY_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("average_price_r$_kg", AVERAGE_PRICE),
        ("quantity_produced_t", QUANTITY),
    ])
});

// Tokens that tabular tooling reads as "missing" by default.
static NULL_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
        "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
    ])
});

/// Exact match against the NA tokens. A whitespace-only cell is text, not
/// null; numeric coercion trims before asking.
pub fn is_null_token(cell: &str) -> bool {
    NULL_TOKENS.contains(cell)
}

/// A legacy header that was rewritten to its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedAlias {
    pub legacy: String,
    pub canonical: String,
}

/// Strip leading/trailing whitespace from every header.
///
/// Must run before [`apply_aliases`]; the alias lookup is exact-match.
pub fn trim_headers(headers: &mut [String]) {
    for h in headers.iter_mut() {
        let trimmed = h.trim();
        if trimmed.len() != h.len() {
            *h = trimmed.to_string();
        }
    }
}

/// Rename legacy headers in place, returning the renames that happened.
///
/// A legacy column whose canonical counterpart is already present is left
/// alone so the two never collapse into a duplicate header.
pub fn apply_aliases(headers: &mut [String]) -> Vec<AppliedAlias> {
    let mut applied = Vec::new();
    for idx in 0..headers.len() {
        let Some(&canonical) = LEGACY_ALIASES.get(headers[idx].as_str()) else {
            continue;
        };
        if headers.iter().any(|h| h == canonical) {
            warn!(
                legacy = %headers[idx],
                canonical,
                "legacy column present alongside its canonical name, leaving it untouched"
            );
            continue;
        }
        let legacy = std::mem::replace(&mut headers[idx], canonical.to_string());
        debug!(%legacy, canonical, "renamed legacy column");
        applied.push(AppliedAlias {
            legacy,
            canonical: canonical.to_string(),
        });
    }
    applied
}

/// Header names that occur more than once, sorted and listed once each.
pub fn duplicate_headers(headers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = BTreeSet::new();
    for h in headers {
        if !seen.insert(h.as_str()) {
            dups.insert(h.clone());
        }
    }
    dups.into_iter().collect()
}

pub fn is_canonical(column: &str) -> bool {
    CANONICAL_COLUMNS.contains(&column)
}
