use crate::types::CanonicalRecord;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Dashboard selection. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub municipalities: Vec<String>,
    pub products: Vec<String>,
    /// `None` means the full period present in the data.
    pub years: Option<RangeInclusive<i32>>,
}

impl Filter {
    fn matches_place_and_product(&self, r: &CanonicalRecord) -> bool {
        (self.municipalities.is_empty() || self.municipalities.contains(&r.municipality))
            && (self.products.is_empty() || self.products.contains(&r.product))
    }

    pub fn matches(&self, r: &CanonicalRecord) -> bool {
        self.matches_place_and_product(r)
            && self.years.as_ref().map_or(true, |y| y.contains(&r.year))
    }

    pub fn apply<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Same selection with the year range lifted, used for year-over-year
    /// comparisons that reach outside the selected period.
    pub fn context<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        records
            .iter()
            .filter(|r| self.matches_place_and_product(r))
            .collect()
    }
}

/// Sorted distinct municipalities, for listing the available options.
pub fn available_municipalities(records: &[CanonicalRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(|r| r.municipality.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn available_products(records: &[CanonicalRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(|r| r.product.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn year_bounds(records: &[CanonicalRecord]) -> Option<(i32, i32)> {
    let min = records.iter().map(|r| r.year).min()?;
    let max = records.iter().map(|r| r.year).max()?;
    Some((min, max))
}
