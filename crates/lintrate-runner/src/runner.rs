use std::path::PathBuf;

use lintrate_core::{AnomalyReport, ErrorSummary};
use lintrate_report::{JsonReportWriter, ReportWriter};
use lintrate_storage::ResultStore;
use lintrate_storage_sqlite::SqliteResultStore;

use crate::{resolve_months, AggregationEngine, DimensionCatalog, RunError, Settings};

/// What a completed run did.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub output: PathBuf,
    pub cas: usize,
    pub lints: usize,
    pub months: usize,
    pub cells: usize,
    pub counted: u64,
    pub out_of_range: u64,
    pub anomalies: AnomalyReport,
    pub error_summary: Option<ErrorSummary>,
}

pub struct Runner {
    pub settings: Settings,
    pub writer: JsonReportWriter,
}

impl Runner {
    pub fn new(settings: Settings) -> Self {
        Self { settings, writer: JsonReportWriter::new() }
    }

    pub fn open_store(&self) -> Result<SqliteResultStore, RunError> {
        SqliteResultStore::open(&self.settings.store).map_err(RunError::Open)
    }

    /// Open the configured store and run the report.
    pub fn run(&self) -> Result<RunSummary, RunError> {
        let store = self.open_store()?;
        self.run_with(&store)
    }

    /// Catalog, month range, aggregation, then writes. Every store read
    /// happens before the first write, so a failing store leaves any earlier
    /// report untouched.
    pub fn run_with(&self, store: &dyn ResultStore) -> Result<RunSummary, RunError> {
        let catalog = DimensionCatalog::load(store).map_err(RunError::Catalog)?;
        tracing::info!(cas = catalog.cas.len(), lints = catalog.lints.len(), "catalog loaded");

        let months = resolve_months(store, self.settings.from, self.settings.to).map_err(RunError::MonthRange)?;
        match (months.first(), months.last()) {
            (Some(first), Some(last)) => tracing::info!(from = %first, to = %last, months = months.len(), "month range"),
            _ => tracing::info!("month range is empty"),
        }

        let agg = AggregationEngine::new(store).aggregate(&catalog.cas, &catalog.lints, months)?;

        let error_summary = match &self.settings.error_summary {
            Some(_) => {
                let total = store.certificate_count().map_err(RunError::Summary)?;
                let errors = store.error_results().map_err(RunError::Summary)?;
                Some(ErrorSummary::from_results(total, &errors))
            }
            None => None,
        };

        self.writer.write(&agg, &self.settings.output).map_err(RunError::Write)?;
        if let Some(path) = &self.settings.counts {
            self.writer.write_counts(&agg, path).map_err(RunError::Write)?;
        }
        if let (Some(path), Some(summary)) = (&self.settings.error_summary, &error_summary) {
            self.writer.write_error_summary(summary, path).map_err(RunError::Write)?;
        }

        if !agg.anomalies.is_empty() {
            tracing::warn!(
                malformed_date_rows = agg.anomalies.malformed_date_rows,
                malformed_date_certificates = agg.anomalies.malformed_date_certificates.len(),
                unknown_outcome_rows = agg.anomalies.unknown_outcome_rows,
                unknown_outcome_certificates = agg.anomalies.unknown_outcome_certificates.len(),
                "rows skipped"
            );
        }

        Ok(RunSummary {
            output: self.settings.output.clone(),
            cas: catalog.cas.len(),
            lints: catalog.lints.len(),
            months: agg.months.len(),
            cells: agg.cell_count(),
            counted: agg.counted,
            out_of_range: agg.out_of_range,
            anomalies: agg.anomalies,
            error_summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintrate_core::{Certificate, Outcome};
    use lintrate_storage::InMemoryResultStore;
    use std::path::Path;
    use tempfile::tempdir;

    fn settings(dir: &Path) -> Settings {
        Settings {
            store: dir.join("unused.db"),
            output: dir.join("report.json"),
            counts: None,
            error_summary: None,
            from: None,
            to: None,
        }
    }

    #[test]
    fn malformed_dates_are_reported_in_summary() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryResultStore::new();
        store.record("c1", "Acme", "2021-05-01", "e_x", Outcome::Pass).unwrap();
        store
            .insert_certificate(Certificate { id: "c2".into(), issuer: Some("Acme".into()), subject: None, issued_at: Some("garbage".into()) })
            .unwrap();
        store.insert_raw_result("c2", "e_x", "error").unwrap();

        let summary = Runner::new(settings(dir.path())).run_with(&store).unwrap();
        assert_eq!(summary.cells, 1);
        assert_eq!(summary.anomalies.malformed_date_rows, 1);
        assert!(summary.anomalies.malformed_date_certificates.contains("c2"));
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn error_summary_only_when_requested() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryResultStore::new();
        store.record("c1", "Acme", "2021-05-01", "e_x", Outcome::Error).unwrap();

        let summary = Runner::new(settings(dir.path())).run_with(&store).unwrap();
        assert!(summary.error_summary.is_none());

        let mut s = settings(dir.path());
        s.error_summary = Some(dir.path().join("errors.json"));
        let summary = Runner::new(s).run_with(&store).unwrap();
        assert_eq!(summary.error_summary.unwrap().certificates_with_errors, 1);
        assert!(dir.path().join("errors.json").exists());
    }

    #[test]
    fn all_malformed_dates_are_still_reported() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryResultStore::new();
        store.record("c1", "Acme", "garbage", "e_x", Outcome::Pass).unwrap();
        store.record("c2", "Acme", "junk", "e_x", Outcome::Error).unwrap();

        let summary = Runner::new(settings(dir.path())).run_with(&store).unwrap();
        assert_eq!(summary.months, 0);
        assert_eq!(summary.cells, 0);
        assert_eq!(summary.anomalies.malformed_date_rows, 2);
        assert_eq!(summary.anomalies.malformed_date_certificates.len(), 2);
    }

    #[test]
    fn reversed_range_counts_rows_as_out_of_range() {
        let dir = tempdir().unwrap();
        let mut store = InMemoryResultStore::new();
        store.record("c1", "Acme", "2021-03-01", "e_x", Outcome::Pass).unwrap();
        store.record("c2", "Acme", "bad", "e_x", Outcome::Pass).unwrap();

        let mut s = settings(dir.path());
        s.from = Some("2021-06".parse().unwrap());
        s.to = Some("2021-01".parse().unwrap());
        let summary = Runner::new(s).run_with(&store).unwrap();
        assert_eq!(summary.months, 0);
        assert_eq!(summary.counted, 0);
        assert_eq!(summary.out_of_range, 1);
        assert_eq!(summary.anomalies.malformed_date_rows, 1);
    }

    #[test]
    fn missing_store_fails_at_open() {
        let dir = tempdir().unwrap();
        let err = Runner::new(settings(dir.path())).run().unwrap_err();
        assert!(matches!(err, RunError::Open(_)));
        assert!(!dir.path().join("report.json").exists());
    }
}
