// Publish gate for the processed dataset: prints the validation report and
// exits non-zero when any check fails or the file cannot be read.
use clap::Parser;
use pam_pipeline::config::{
    DATA_PATH_ENV, DEFAULT_DATA_PATH, EXPECTED_ROWS, EXPECTED_ROWS_ENV, VALIDATOR_LOG_DEFAULT,
};
use pam_pipeline::logging::init_logging;
use pam_pipeline::{validate_file, PamError, Result, ValidationReport};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pam-validate", about = "Validates the processed dataset before publication")]
struct Args {
    /// Processed CSV to check
    #[arg(long, env = DATA_PATH_ENV, default_value = DEFAULT_DATA_PATH)]
    path: PathBuf,

    /// Row count of the last accepted publication
    #[arg(long, env = EXPECTED_ROWS_ENV, default_value_t = EXPECTED_ROWS)]
    expected_rows: usize,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// 0 only for a readable file with no findings; 1 otherwise.
fn exit_status(outcome: &Result<ValidationReport>) -> u8 {
    match outcome {
        Ok(report) if report.passed() => 0,
        _ => 1,
    }
}

fn main() -> ExitCode {
    init_logging(VALIDATOR_LOG_DEFAULT);
    let args = Args::parse();

    let outcome = validate_file(&args.path, args.expected_rows);
    match &outcome {
        Ok(report) if args.json => match serde_json::to_string_pretty(report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Ok(report) => println!("{}", report.render()),
        Err(e @ PamError::FileNotFound { .. }) => println!("FATAL ERROR: {}", e),
        Err(e) => println!("FATAL ERROR: could not read dataset: {}", e),
    }

    ExitCode::from(exit_status(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pam_pipeline::{validate_table, RawTable};
    use std::path::Path;

    fn report(rows: usize, expected: usize) -> ValidationReport {
        let headers = pam_pipeline::schema::CANONICAL_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row: Vec<String> = ["Petrolina", "2020", "Uva", "1", "2", "3", "4", "5", "", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let raw = RawTable {
            headers,
            rows: vec![row; rows],
        };
        validate_table(raw, "t.csv", expected)
    }

    #[test]
    fn clean_report_exits_zero() {
        assert_eq!(exit_status(&Ok(report(2, 2))), 0);
    }

    #[test]
    fn any_finding_exits_one() {
        assert_eq!(exit_status(&Ok(report(47, 48))), 1);
    }

    #[test]
    fn json_is_a_plain_switch() {
        use clap::CommandFactory;
        Args::command().debug_assert();
        assert!(!Args::try_parse_from(["pam-validate"]).unwrap().json);
        assert!(Args::try_parse_from(["pam-validate", "--json"]).unwrap().json);
    }

    #[test]
    fn missing_file_exits_one() {
        let outcome = validate_file(Path::new("/nonexistent/pam.csv"), 48);
        assert!(matches!(outcome, Err(PamError::FileNotFound { .. })));
        assert_eq!(exit_status(&outcome), 1);
    }
}
