// Compile-time defaults for the processed dataset. Both binaries accept
// overrides on the command line or through the environment variables below.

/// Location of the canonical processed file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/processed/pam_censo_agro_integrado_v2.csv";

/// Row count of the last accepted publication of the dataset.
pub const EXPECTED_ROWS: usize = 48;

pub const DATA_PATH_ENV: &str = "PAM_DATA_PATH";
pub const EXPECTED_ROWS_ENV: &str = "PAM_EXPECTED_ROWS";

pub const DASHBOARD_LOG_DEFAULT: &str = "pam_pipeline=info";
pub const VALIDATOR_LOG_DEFAULT: &str = "warn";
