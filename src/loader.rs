use crate::error::{PamError, Result};
use crate::schema::{self, apply_aliases, duplicate_headers, is_canonical, trim_headers};
use crate::types::{CanonicalRecord, LoadReport, NormalizedTable, RawTable};
use crate::util::{parse_count_safe, parse_f64_safe, parse_year_safe};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Read a comma-separated file with a header row into a [`RawTable`].
///
/// Short rows are padded with empty (null) cells. A row with more fields than
/// the header cannot be lined up with any column and fails the whole read.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    if !path.is_file() {
        return Err(PamError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| PamError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let csv_err = |e: csv::Error| PamError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        if record.len() > width {
            return Err(PamError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Load `path` and turn it into the canonical table.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_and_clean(path: &Path) -> Result<NormalizedTable> {
    let raw = read_raw_table(path)?;
    normalize(raw)
}

/// Clean an already-read table:
///
/// 1. trim header whitespace,
/// 2. rename legacy aliases (a name left duplicated after this is fatal),
/// 3. coerce numeric columns (unparseable cells become missing),
/// 4. drop rows with missing quantity/price, then rows with price <= 0,
/// 5. drop rows whose year is missing or not a whole number.
///
/// Running it on its own written output changes nothing.
pub fn normalize(mut raw: RawTable) -> Result<NormalizedTable> {
    trim_headers(&mut raw.headers);
    let applied_aliases = apply_aliases(&mut raw.headers);

    if let Some(column) = duplicate_headers(&raw.headers).into_iter().next() {
        return Err(PamError::DuplicateColumn { column });
    }

    let required = |name: &str| {
        raw.column_index(name).ok_or_else(|| PamError::MissingColumn {
            column: name.to_string(),
        })
    };
    let i_municipality = required(schema::MUNICIPALITY)?;
    let i_product = required(schema::PRODUCT)?;
    let i_year = required(schema::YEAR)?;
    let i_quantity = required(schema::QUANTITY)?;
    let i_price = required(schema::AVERAGE_PRICE)?;
    let i_area = raw.column_index(schema::HARVESTED_AREA);
    let i_yield = raw.column_index(schema::AVERAGE_YIELD);
    let i_median = raw.column_index(schema::MEDIAN_PRICE);
    let i_stddev = raw.column_index(schema::PRICE_STDDEV);
    let i_count = raw.column_index(schema::PRICE_OBSERVATIONS);

    let extra_idx: Vec<usize> = (0..raw.headers.len())
        .filter(|&i| !is_canonical(&raw.headers[i]))
        .collect();
    let extra_columns: Vec<String> = extra_idx
        .iter()
        .map(|&i| raw.headers[i].clone())
        .collect();

    let mut report = LoadReport {
        total_rows: raw.rows.len(),
        applied_aliases,
        ..LoadReport::default()
    };
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let get = |i: usize| row.get(i).map(String::as_str);
        let opt = |i: Option<usize>| i.and_then(|i| parse_f64_safe(get(i)));

        let (Some(quantity), Some(price)) =
            (parse_f64_safe(get(i_quantity)), parse_f64_safe(get(i_price)))
        else {
            report.dropped_missing_values += 1;
            continue;
        };
        if price <= 0.0 {
            report.dropped_non_positive_price += 1;
            continue;
        }
        let Some(year) = parse_year_safe(get(i_year)) else {
            report.dropped_invalid_year += 1;
            continue;
        };

        records.push(CanonicalRecord {
            municipality: get(i_municipality).unwrap_or_default().to_string(),
            product: get(i_product).unwrap_or_default().to_string(),
            year,
            harvested_area_ha: opt(i_area),
            quantity_produced_ton: quantity,
            average_yield_kg_ha: opt(i_yield),
            median_price_per_kg: opt(i_median),
            average_price_per_kg: price,
            price_stddev_per_kg: opt(i_stddev),
            price_observation_count: i_count.and_then(|i| parse_count_safe(get(i))),
            extra: extra_idx
                .iter()
                .map(|&i| get(i).unwrap_or_default().to_string())
                .collect(),
        });
    }

    report.kept_rows = records.len();
    let dropped = report.total_rows - report.kept_rows;
    if dropped > 0 {
        warn!(
            dropped,
            missing = report.dropped_missing_values,
            non_positive_price = report.dropped_non_positive_price,
            invalid_year = report.dropped_invalid_year,
            "rows excluded during normalization"
        );
    }
    info!(
        total = report.total_rows,
        kept = report.kept_rows,
        aliases = report.applied_aliases.len(),
        "normalized dataset"
    );

    Ok(NormalizedTable {
        columns: raw.headers,
        extra_columns,
        records,
        report,
    })
}
