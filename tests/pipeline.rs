use pam_pipeline::output::write_normalized;
use pam_pipeline::schema::CANONICAL_COLUMNS;
use pam_pipeline::{load_and_clean, validate_file, Finding, PamError};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn csv_file(body: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

fn canonical_file(rows: usize) -> NamedTempFile {
    let mut body = CANONICAL_COLUMNS.join(",");
    body.push('\n');
    for i in 0..rows {
        let municipality = if i % 2 == 0 { "Petrolina" } else { "Juazeiro" };
        let product = if i % 4 < 2 { "Uva" } else { "Manga" };
        let year = 2000 + i / 4;
        // stddev left empty on odd rows: single price observation
        let stddev = if i % 2 == 0 { "0.8" } else { "" };
        body.push_str(&format!(
            "{municipality},{year},{product},1200,{qty},25000,4.1,4.25,{stddev},12\n",
            qty = 30000 + i * 100
        ));
    }
    csv_file(&body)
}

#[test]
fn three_row_scenario_keeps_only_priced_row() {
    let f = csv_file(
        "municipality,product,year,quantity_produced_ton,average_price_r$_per_kg\n\
         Petrolina,Uva,2020,\"100\",\"12.50\"\n\
         Petrolina,Uva,2021,\"50\",\"0\"\n\
         Petrolina,Uva,2022,\"75\",\"abc\"\n",
    );
    let table = load_and_clean(f.path()).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.records[0].average_price_per_kg, 12.50);
    assert_eq!(table.records[0].quantity_produced_ton, 100.0);
    assert!(table.records.iter().all(|r| r.average_price_per_kg > 0.0));
}

#[test]
fn legacy_and_canonical_names_normalize_identically() {
    let rows = "Petrolina,Uva,2020,100,12.5\nJuazeiro,Manga,2021,80,3.2\n";
    let legacy = csv_file(&format!(
        "municipality,product,year,quantity_produced_t,average_price_r$_kg\n{rows}"
    ));
    let canonical = csv_file(&format!(
        "municipality,product,year,quantity_produced_ton,average_price_r$_per_kg\n{rows}"
    ));
    let a = load_and_clean(legacy.path()).unwrap();
    let b = load_and_clean(canonical.path()).unwrap();
    assert_eq!(a.columns, b.columns);
    assert_eq!(a.records, b.records);
    assert_eq!(a.report.applied_aliases.len(), 2);
    assert!(b.report.applied_aliases.is_empty());
}

#[test]
fn header_whitespace_does_not_change_the_result() {
    let rows = "Petrolina,Uva,2020,100,12.5\n";
    let padded = csv_file(&format!(
        "  municipality,product  , year ,\tquantity_produced_t , average_price_r$_per_kg\n{rows}"
    ));
    let clean = csv_file(&format!(
        "municipality,product,year,quantity_produced_t,average_price_r$_per_kg\n{rows}"
    ));
    let a = load_and_clean(padded.path()).unwrap();
    let b = load_and_clean(clean.path()).unwrap();
    assert_eq!(a.columns, b.columns);
    assert_eq!(a.records, b.records);
}

#[test]
fn normalizing_canonical_output_is_a_no_op() {
    let src = canonical_file(12);
    let first = load_and_clean(src.path()).unwrap();
    assert_eq!(first.len(), 12);

    let out = NamedTempFile::new().unwrap();
    write_normalized(out.path(), &first).unwrap();
    let second = load_and_clean(out.path()).unwrap();
    assert_eq!(second.len(), first.len());
    assert_eq!(second.columns, first.columns);
    assert_eq!(second.records, first.records);
}

#[test]
fn each_non_positive_price_removes_exactly_one_row() {
    let base = "municipality,product,year,quantity_produced_ton,average_price_r$_per_kg\n\
                Petrolina,Uva,2018,10,1.0\n\
                Petrolina,Uva,2019,10,1.0\n\
                Petrolina,Uva,2020,10,1.0\n";
    let with_bad = format!("{base}Juazeiro,Uva,2018,10,0\nJuazeiro,Uva,2019,10,-2\n");
    let a = load_and_clean(csv_file(base).path()).unwrap();
    let b = load_and_clean(csv_file(&with_bad).path()).unwrap();
    assert_eq!(a.len(), b.len());
    assert_eq!(b.report.total_rows - b.len(), 2);
}

#[test]
fn missing_file_is_fatal_for_both_components() {
    let path = Path::new("/nonexistent/dir/pam.csv");
    assert!(matches!(load_and_clean(path), Err(PamError::FileNotFound { .. })));
    assert!(matches!(validate_file(path, 48), Err(PamError::FileNotFound { .. })));
}

#[test]
fn overlong_row_is_a_fatal_parse_error() {
    let f = csv_file(
        "municipality,product,year,quantity_produced_ton,average_price_r$_per_kg\n\
         Petrolina,Uva,2020,10,1.0,surplus\n",
    );
    assert!(matches!(load_and_clean(f.path()), Err(PamError::RaggedRow { .. })));
}

#[test]
fn validator_passes_conformant_file() {
    let f = canonical_file(48);
    let report = validate_file(f.path(), 48).unwrap();
    assert!(report.passed(), "{}", report.render());
    assert_eq!(report.summary.year_range, Some((2000, 2011)));
    assert_eq!(report.summary.municipalities, vec!["Petrolina", "Juazeiro"]);
}

#[test]
fn validator_reports_only_row_count_on_short_file() {
    let f = canonical_file(47);
    let report = validate_file(f.path(), 48).unwrap();
    assert!(!report.passed());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].to_string(), "row count mismatch: 47 vs expected 48");
}

#[test]
fn validator_reports_missing_and_extra_column() {
    let f = csv_file(
        "municipality,year,product,harvested_area_ha,quantity_produced_ton,average_yield_kg_ha,\
         median_price_r$_kg,average_price_r$_per_kg,price_stddev_r$_kg,region\n\
         Petrolina,2020,Uva,1200,30000,25000,4.1,4.25,,Sertao\n",
    );
    let report = validate_file(f.path(), 1).unwrap();
    assert_eq!(
        report.findings,
        vec![
            Finding::MissingColumns {
                columns: vec!["price_observation_count".to_string()]
            },
            Finding::UnexpectedColumns {
                columns: vec!["region".to_string()]
            },
        ]
    );
}

#[test]
fn header_padded_into_a_duplicate_is_fatal_to_the_normalizer() {
    let f = csv_file(
        "municipality,product,year,quantity_produced_ton,quantity_produced_ton ,\
         average_price_r$_per_kg\n\
         Petrolina,Uva,2020,100,999,12.5\n",
    );
    assert!(matches!(
        load_and_clean(f.path()),
        Err(PamError::DuplicateColumn { column }) if column == "quantity_produced_ton"
    ));
    // The validator reads headers verbatim, so the padded name is foreign.
    let report = validate_file(f.path(), 1).unwrap();
    assert!(report.findings.contains(&Finding::UnexpectedColumns {
        columns: vec!["quantity_produced_ton ".to_string()]
    }));
}
