use crate::filter::Filter;
use crate::types::{
    CanonicalRecord, DetailRow, HeadlineMetrics, MunicipalShareRow, TemporalRow, YieldRow,
};
use crate::util::{average, relative_change};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Current-state figures for the latest year in view, plus period averages.
///
/// The previous-year baseline comes from the filter's context (year range
/// lifted) so a single-year selection still gets a delta.
pub fn headline_metrics(
    all: &[CanonicalRecord],
    filter: &Filter,
    filtered: &[&CanonicalRecord],
) -> Option<HeadlineMetrics> {
    let latest_year = filtered.iter().map(|r| r.year).max()?;
    let previous_year = latest_year - 1;

    let sum_year = |rows: &[&CanonicalRecord], year: i32| -> (f64, f64) {
        rows.iter()
            .filter(|r| r.year == year)
            .fold((0.0, 0.0), |(q, v), r| {
                (q + r.quantity_produced_ton, v + r.production_value())
            })
    };
    let (production_ton, value_millions) = sum_year(filtered, latest_year);
    let context = filter.context(all);
    let (prev_production, prev_value) = sum_year(context.as_slice(), previous_year);

    let yields: Vec<f64> = filtered.iter().filter_map(|r| r.average_yield_kg_ha).collect();
    let prices: Vec<f64> = filtered.iter().map(|r| r.average_price_per_kg).collect();

    Some(HeadlineMetrics {
        latest_year,
        production_ton,
        production_delta: relative_change(production_ton, prev_production),
        value_millions,
        value_delta: relative_change(value_millions, prev_value),
        mean_yield_kg_ha: average(&yields),
        mean_price_per_kg: average(&prices),
    })
}

/// Production and value per (year, product), ordered by year then product.
pub fn temporal_series(filtered: &[&CanonicalRecord]) -> Vec<TemporalRow> {
    let mut map: BTreeMap<(i32, String), (f64, f64)> = BTreeMap::new();
    for r in filtered {
        let e = map.entry((r.year, r.product.clone())).or_default();
        e.0 += r.quantity_produced_ton;
        e.1 += r.production_value();
    }
    map.into_iter()
        .map(|((year, product), (production_ton, value_millions))| TemporalRow {
            year,
            product,
            production_ton,
            value_millions,
        })
        .collect()
}

/// Each municipality's tonnage and its share of the filtered total.
pub fn municipal_share(filtered: &[&CanonicalRecord]) -> Vec<MunicipalShareRow> {
    let mut map: BTreeMap<String, f64> = BTreeMap::new();
    for r in filtered {
        *map.entry(r.municipality.clone()).or_default() += r.quantity_produced_ton;
    }
    let total: f64 = map.values().sum();
    map.into_iter()
        .map(|(municipality, production_ton)| MunicipalShareRow {
            municipality,
            production_ton,
            share_pct: if total > 0.0 {
                production_ton / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Mean yield per product; rows without a yield are skipped.
pub fn yield_by_product(filtered: &[&CanonicalRecord]) -> Vec<YieldRow> {
    #[derive(Default)]
    struct Acc {
        yields: Vec<f64>,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for r in filtered {
        let e = map.entry(r.product.clone()).or_default();
        if let Some(y) = r.average_yield_kg_ha {
            e.yields.push(y);
        }
    }
    let mut rows: Vec<YieldRow> = map
        .into_iter()
        .map(|(product, acc)| YieldRow {
            product,
            mean_yield_kg_ha: average(&acc.yields),
        })
        .collect();
    rows.sort_by(|a, b| a.product.cmp(&b.product));
    rows
}

/// Most recent year first, then municipality alphabetically.
pub fn detail_table(filtered: &[&CanonicalRecord]) -> Vec<DetailRow> {
    let mut rows: Vec<DetailRow> = filtered
        .iter()
        .map(|r| DetailRow {
            year: r.year,
            municipality: r.municipality.clone(),
            product: r.product.clone(),
            production_ton: r.quantity_produced_ton,
            value_millions: r.production_value(),
            yield_kg_ha: r.average_yield_kg_ha,
        })
        .collect();
    rows.sort_by(|a, b| match b.year.cmp(&a.year) {
        Ordering::Equal => a.municipality.cmp(&b.municipality),
        other => other,
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::fixtures::record;

    fn data() -> Vec<CanonicalRecord> {
        vec![
            record("Petrolina", "Uva", 2019, 100.0, 2.0),
            record("Juazeiro", "Uva", 2019, 100.0, 2.0),
            record("Petrolina", "Uva", 2020, 300.0, 2.0),
            record("Juazeiro", "Manga", 2020, 100.0, 4.0),
        ]
    }

    #[test]
    fn headline_uses_latest_year_and_previous_year_baseline() {
        let d = data();
        let f = Filter {
            years: Some(2020..=2020),
            ..Filter::default()
        };
        let view = f.apply(&d);
        let m = headline_metrics(&d, &f, &view).unwrap();
        assert_eq!(m.latest_year, 2020);
        assert_eq!(m.production_ton, 400.0);
        // 400 t vs 200 t in 2019, found outside the selected range
        assert!((m.production_delta - 1.0).abs() < 1e-12);
        assert!((m.value_millions - 0.001).abs() < 1e-12);
        assert_eq!(m.mean_price_per_kg, Some(3.0));
    }

    #[test]
    fn headline_without_previous_year_has_zero_delta() {
        let d = data();
        let f = Filter {
            years: Some(2019..=2019),
            ..Filter::default()
        };
        let view = f.apply(&d);
        let m = headline_metrics(&d, &f, &view).unwrap();
        assert_eq!(m.production_delta, 0.0);
        assert_eq!(m.value_delta, 0.0);
    }

    #[test]
    fn headline_of_empty_view_is_none() {
        let d = data();
        assert!(headline_metrics(&d, &Filter::default(), &[]).is_none());
    }

    #[test]
    fn temporal_series_groups_by_year_and_product() {
        let d = data();
        let view = Filter::default().apply(&d);
        let rows = temporal_series(&view);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].year, rows[0].product.as_str()), (2019, "Uva"));
        assert_eq!(rows[0].production_ton, 200.0);
        assert_eq!((rows[1].year, rows[1].product.as_str()), (2020, "Manga"));
    }

    #[test]
    fn municipal_shares_sum_to_hundred() {
        let d = data();
        let view = Filter::default().apply(&d);
        let rows = municipal_share(&view);
        let total: f64 = rows.iter().map(|r| r.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(rows[1].municipality, "Petrolina");
        assert!((rows[1].share_pct - 66.666_666_666).abs() < 1e-6);
    }

    #[test]
    fn yield_by_product_skips_missing_yields() {
        let mut d = data();
        d[0].average_yield_kg_ha = None;
        let view = Filter::default().apply(&d);
        let rows = yield_by_product(&view);
        assert_eq!(rows[0].product, "Manga");
        assert_eq!(rows[1].mean_yield_kg_ha, Some(20_000.0));
    }

    #[test]
    fn detail_table_sorts_year_desc_then_municipality() {
        let d = data();
        let view = Filter::default().apply(&d);
        let rows = detail_table(&view);
        let keys: Vec<(i32, &str)> = rows
            .iter()
            .map(|r| (r.year, r.municipality.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(2020, "Juazeiro"), (2020, "Petrolina"), (2019, "Juazeiro"), (2019, "Petrolina")]
        );
    }
}
