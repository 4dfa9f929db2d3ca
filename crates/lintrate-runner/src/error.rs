use std::path::PathBuf;

use lintrate_report::ReportError;
use lintrate_storage::StoreError;
use thiserror::Error;

/// A failed report run, tagged with the stage that failed. Store failures
/// abort the run before anything is written.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
    #[error("cannot open result store")]
    Open(#[source] StoreError),
    #[error("catalog lookup failed")]
    Catalog(#[source] StoreError),
    #[error("cannot determine month range")]
    MonthRange(#[source] StoreError),
    #[error("aggregation failed for CA {ca:?}, lint {lint:?}")]
    Aggregation {
        ca: String,
        lint: String,
        #[source]
        source: StoreError,
    },
    #[error("error summary failed")]
    Summary(#[source] StoreError),
    #[error("report write failed")]
    Write(#[source] ReportError),
}
