//! Pre-publish gate for the processed dataset.
//!
//! Every check runs regardless of earlier failures; the caller decides what a
//! non-empty findings list means (the `pam-validate` binary exits with 1).

use crate::error::Result;
use crate::loader::read_raw_table;
use crate::schema::{
    self, apply_aliases, duplicate_headers, is_null_token, AppliedAlias, CANONICAL_COLUMNS,
    NULLABLE_COLUMNS,
};
use crate::types::RawTable;
use crate::util::{format_int, parse_year_safe};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{self, Write as _};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{info, instrument};

const SAMPLE_ROWS: usize = 3;
const RULE: &str = "============================================================";

/// A single contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    RowCount { found: usize, expected: usize },
    MissingColumns { columns: Vec<String> },
    UnexpectedColumns { columns: Vec<String> },
    DuplicateColumns { columns: Vec<String> },
    NullValues { column: String, count: usize },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::RowCount { found, expected } => {
                write!(f, "row count mismatch: {} vs expected {}", found, expected)
            }
            Finding::MissingColumns { columns } => write!(f, "missing columns: {:?}", columns),
            Finding::UnexpectedColumns { columns } => {
                write!(f, "unexpected columns: {:?}", columns)
            }
            Finding::DuplicateColumns { columns } => {
                write!(f, "duplicated columns: {:?}", columns)
            }
            Finding::NullValues { column, count } => {
                write!(f, "column '{}' has {} null value(s)", column, count)
            }
        }
    }
}

/// Informational overview, never a failure condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub municipalities: Vec<String>,
    pub products: Vec<String>,
    pub year_range: Option<(i32, i32)>,
    pub sample_headers: Vec<String>,
    pub sample: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub source: String,
    pub generated_at: DateTime<Local>,
    pub row_count: usize,
    pub expected_rows: usize,
    pub applied_aliases: Vec<AppliedAlias>,
    pub findings: Vec<Finding>,
    pub summary: DatasetSummary,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    fn has<F: Fn(&Finding) -> bool>(&self, pred: F) -> bool {
        self.findings.iter().any(pred)
    }

    /// Human-readable report in the order the checks ran.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "VALIDATING PROCESSED DATASET");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(
            out,
            "Loaded '{}' ({})",
            self.source,
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        for a in &self.applied_aliases {
            let _ = writeln!(out, "Renamed column '{}' -> '{}'", a.legacy, a.canonical);
        }

        let row_line = format!(
            "Total records: {} (expected: {})",
            format_int(self.row_count),
            format_int(self.expected_rows)
        );
        if self.has(|f| matches!(f, Finding::RowCount { .. })) {
            let _ = writeln!(out, "\n[FAIL] {row_line}");
        } else {
            let _ = writeln!(out, "\n[OK] {row_line}");
        }

        let column_findings: Vec<&Finding> = self
            .findings
            .iter()
            .filter(|f| {
                matches!(
                    f,
                    Finding::MissingColumns { .. }
                        | Finding::UnexpectedColumns { .. }
                        | Finding::DuplicateColumns { .. }
                )
            })
            .collect();
        if column_findings.is_empty() {
            let _ = writeln!(out, "\n[OK] All expected columns found.");
        }
        for f in column_findings {
            let _ = writeln!(out, "\n[FAIL] {f}");
        }

        let null_findings: Vec<&Finding> = self
            .findings
            .iter()
            .filter(|f| matches!(f, Finding::NullValues { .. }))
            .collect();
        if null_findings.is_empty() {
            let _ = writeln!(
                out,
                "\n[OK] No column (except '{}') contains null values.",
                schema::PRICE_STDDEV
            );
        }
        for f in null_findings {
            let _ = writeln!(out, "\n[FAIL] {f}");
        }

        let s = &self.summary;
        let _ = writeln!(out, "\n-- Data summary --");
        let _ = writeln!(out, "Municipalities: {:?}", s.municipalities);
        let _ = writeln!(out, "Products: {:?}", s.products);
        match s.year_range {
            Some((lo, hi)) => {
                let _ = writeln!(out, "Period: {lo} - {hi}");
            }
            None => {
                let _ = writeln!(out, "Period: N/A");
            }
        }
        let _ = writeln!(out, "\nSample (first {} rows):", SAMPLE_ROWS);
        if s.sample.is_empty() {
            let _ = writeln!(out, "(no rows)");
        } else {
            let mut builder = Builder::default();
            builder.push_record(s.sample_headers.iter().cloned());
            for row in &s.sample {
                builder.push_record(row.iter().cloned());
            }
            let mut table = builder.build();
            table.with(Style::markdown());
            let _ = writeln!(out, "{table}");
        }

        let _ = writeln!(out, "\n{RULE}");
        if self.passed() {
            let _ = writeln!(out, "SUCCESS: dataset is valid and ready for the dashboard.");
        } else {
            let _ = writeln!(
                out,
                "FAILURE: {} problem(s) found in the dataset.",
                self.findings.len()
            );
            for (i, f) in self.findings.iter().enumerate() {
                let _ = writeln!(out, "   {}. {}", i + 1, f);
            }
        }
        let _ = write!(out, "{RULE}");
        out
    }
}

/// Read `path` and validate it. A missing file fails before any check runs.
#[instrument(skip(path), fields(path = %path.display()))]
pub fn validate_file(path: &Path, expected_rows: usize) -> Result<ValidationReport> {
    let raw = read_raw_table(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(validate_table(raw, &source, expected_rows))
}

/// Run every check against an in-memory table.
///
/// Headers are not trimmed here; only the legacy alias map is re-applied,
/// since the file may not have gone through the normalizer.
pub fn validate_table(mut raw: RawTable, source: &str, expected_rows: usize) -> ValidationReport {
    let applied_aliases = apply_aliases(&mut raw.headers);
    let mut findings = Vec::new();

    if raw.rows.len() != expected_rows {
        findings.push(Finding::RowCount {
            found: raw.rows.len(),
            expected: expected_rows,
        });
    }

    let expected: BTreeSet<&str> = CANONICAL_COLUMNS.iter().copied().collect();
    let found: BTreeSet<&str> = raw.headers.iter().map(String::as_str).collect();
    let missing: Vec<String> = expected.difference(&found).map(|s| s.to_string()).collect();
    let extra: Vec<String> = found.difference(&expected).map(|s| s.to_string()).collect();
    if !missing.is_empty() {
        findings.push(Finding::MissingColumns { columns: missing });
    }
    if !extra.is_empty() {
        findings.push(Finding::UnexpectedColumns { columns: extra });
    }
    // The set comparison above cannot see a name repeated in the header.
    let duplicated = duplicate_headers(&raw.headers);
    if !duplicated.is_empty() {
        findings.push(Finding::DuplicateColumns {
            columns: duplicated,
        });
    }

    for (col, name) in raw.headers.iter().enumerate() {
        if NULLABLE_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        let count = raw
            .rows
            .iter()
            .filter(|row| row.get(col).map_or(true, |c| is_null_token(c)))
            .count();
        if count > 0 {
            findings.push(Finding::NullValues {
                column: name.clone(),
                count,
            });
        }
    }

    let summary = summarize(&raw);
    info!(
        rows = raw.rows.len(),
        expected_rows,
        findings = findings.len(),
        "validation finished"
    );

    ValidationReport {
        source: source.to_string(),
        generated_at: Local::now(),
        row_count: raw.rows.len(),
        expected_rows,
        applied_aliases,
        findings,
        summary,
    }
}

fn distinct(raw: &RawTable, column: &str) -> Vec<String> {
    let Some(col) = raw.column_index(column) else {
        return Vec::new();
    };
    let mut seen = Vec::new();
    for row in 0..raw.rows.len() {
        if let Some(v) = raw.cell(row, col) {
            if !is_null_token(v) && !seen.iter().any(|s: &String| s == v) {
                seen.push(v.to_string());
            }
        }
    }
    seen
}

fn summarize(raw: &RawTable) -> DatasetSummary {
    let year_range = raw.column_index(schema::YEAR).and_then(|col| {
        let years = (0..raw.rows.len()).filter_map(|r| parse_year_safe(raw.cell(r, col)));
        years.fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    });
    DatasetSummary {
        municipalities: distinct(raw, schema::MUNICIPALITY),
        products: distinct(raw, schema::PRODUCT),
        year_range,
        sample_headers: raw.headers.clone(),
        sample: raw.rows.iter().take(SAMPLE_ROWS).cloned().collect(),
    }
}
