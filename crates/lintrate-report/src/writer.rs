use std::io::Write;
use std::path::{Path, PathBuf};

use lintrate_core::{Aggregation, ErrorSummary};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::document::{counts_report, rate_report};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait ReportWriter {
    fn write_document<T: Serialize>(&self, doc: &T, destination: &Path) -> Result<(), ReportError>;

    /// CA -> lint -> month -> success rate.
    fn write(&self, agg: &Aggregation, destination: &Path) -> Result<(), ReportError> {
        self.write_document(&rate_report(agg), destination)
    }

    fn write_counts(&self, agg: &Aggregation, destination: &Path) -> Result<(), ReportError> {
        self.write_document(&counts_report(agg), destination)
    }

    fn write_error_summary(&self, summary: &ErrorSummary, destination: &Path) -> Result<(), ReportError> {
        self.write_document(summary, destination)
    }
}

/// Pretty-printed JSON, replaced atomically: the document is written to a
/// temporary file beside the destination and renamed over it.
#[derive(Clone, Debug)]
pub struct JsonReportWriter {
    indent: Vec<u8>,
}

impl Default for JsonReportWriter {
    fn default() -> Self {
        Self { indent: b"    ".to_vec() }
    }
}

impl JsonReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render<T: Serialize>(&self, doc: &T) -> Result<Vec<u8>, ReportError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&self.indent));
        doc.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

impl ReportWriter for JsonReportWriter {
    fn write_document<T: Serialize>(&self, doc: &T, destination: &Path) -> Result<(), ReportError> {
        let bytes = self.render(doc)?;
        let io_err = |source| ReportError::Io { path: destination.to_path_buf(), source };

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(io_err)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".lintrate-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(destination).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %destination.display(), bytes = bytes.len(), "report written");
        Ok(())
    }
}
