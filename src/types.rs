use crate::schema::{self, AppliedAlias};
use serde::Serialize;
use tabled::Tabled;

/// A CSV file as read from disk: headers and string cells, nothing coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// One (municipality, product, year) observation of the analysis-ready table.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub municipality: String,
    pub product: String,
    pub year: i32,
    pub harvested_area_ha: Option<f64>,
    pub quantity_produced_ton: f64,
    pub average_yield_kg_ha: Option<f64>,
    pub median_price_per_kg: Option<f64>,
    /// Always strictly positive.
    pub average_price_per_kg: f64,
    pub price_stddev_per_kg: Option<f64>,
    pub price_observation_count: Option<u32>,
    /// Pass-through cells, aligned with `NormalizedTable::extra_columns`.
    pub extra: Vec<String>,
}

impl CanonicalRecord {
    /// Production value in millions of currency units.
    pub fn production_value(&self) -> f64 {
        self.quantity_produced_ton * self.average_price_per_kg / 1_000_000.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub dropped_missing_values: usize,
    pub dropped_non_positive_price: usize,
    pub dropped_invalid_year: usize,
    pub kept_rows: usize,
    pub applied_aliases: Vec<AppliedAlias>,
}

/// Output of the normalizer. Column order follows the source file after
/// header trimming and alias resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub records: Vec<CanonicalRecord>,
    pub report: LoadReport,
}

fn opt_to_cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl NormalizedTable {
    /// Render one cell of `record` for the named column, as it would be
    /// written back to CSV. Nulls render as empty cells.
    pub fn cell(&self, record: &CanonicalRecord, column: &str) -> String {
        match column {
            schema::MUNICIPALITY => record.municipality.clone(),
            schema::PRODUCT => record.product.clone(),
            schema::YEAR => record.year.to_string(),
            schema::HARVESTED_AREA => opt_to_cell(record.harvested_area_ha),
            schema::QUANTITY => record.quantity_produced_ton.to_string(),
            schema::AVERAGE_YIELD => opt_to_cell(record.average_yield_kg_ha),
            schema::MEDIAN_PRICE => opt_to_cell(record.median_price_per_kg),
            schema::AVERAGE_PRICE => record.average_price_per_kg.to_string(),
            schema::PRICE_STDDEV => opt_to_cell(record.price_stddev_per_kg),
            schema::PRICE_OBSERVATIONS => record
                .price_observation_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
            other => self
                .extra_columns
                .iter()
                .position(|c| c == other)
                .and_then(|i| record.extra.get(i).cloned())
                .unwrap_or_default(),
        }
    }

    pub fn row_cells(&self, record: &CanonicalRecord) -> Vec<String> {
        self.columns.iter().map(|c| self.cell(record, c)).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn display_tonnes(v: &f64) -> String {
    crate::util::format_number(*v, 0)
}

fn display_millions(v: &f64) -> String {
    crate::util::format_number(*v, 1)
}

fn display_share(v: &f64) -> String {
    format!("{:.1}%", v)
}

fn display_yield(v: &Option<f64>) -> String {
    crate::util::format_metric(*v, "", "", 0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub latest_year: i32,
    pub production_ton: f64,
    pub production_delta: f64,
    pub value_millions: f64,
    pub value_delta: f64,
    pub mean_yield_kg_ha: Option<f64>,
    pub mean_price_per_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TemporalRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Product")]
    pub product: String,
    #[tabled(rename = "Production (t)", display_with = "display_tonnes")]
    pub production_ton: f64,
    #[tabled(rename = "Value (R$ Mi)", display_with = "display_millions")]
    pub value_millions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MunicipalShareRow {
    #[tabled(rename = "Municipality")]
    pub municipality: String,
    #[tabled(rename = "Production (t)", display_with = "display_tonnes")]
    pub production_ton: f64,
    #[tabled(rename = "Share", display_with = "display_share")]
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct YieldRow {
    #[tabled(rename = "Product")]
    pub product: String,
    #[tabled(rename = "Mean yield (kg/ha)", display_with = "display_yield")]
    pub mean_yield_kg_ha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DetailRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Municipality")]
    pub municipality: String,
    #[tabled(rename = "Product")]
    pub product: String,
    #[tabled(rename = "Production (t)", display_with = "display_tonnes")]
    pub production_ton: f64,
    #[tabled(rename = "Value (R$ Mi)", display_with = "display_millions")]
    pub value_millions: f64,
    #[tabled(rename = "Yield (kg/ha)", display_with = "display_yield")]
    pub yield_kg_ha: Option<f64>,
}
