//! Normalization and validation of the São Francisco valley fruit-growing
//! dataset (municipal agricultural production joined with market prices),
//! plus the aggregates the dashboard renders from it.

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod output;
pub mod reports;
pub mod schema;
pub mod types;
pub mod util;
pub mod validator;

pub use cache::TableCache;
pub use error::{PamError, Result};
pub use filter::Filter;
pub use loader::{load_and_clean, normalize, read_raw_table};
pub use types::{CanonicalRecord, LoadReport, NormalizedTable, RawTable};
pub use validator::{validate_file, validate_table, Finding, ValidationReport};
