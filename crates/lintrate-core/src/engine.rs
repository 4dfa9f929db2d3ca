use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::Outcome;
use crate::month::{bucket_of, MonthBucket};
use crate::types::Evaluation;

/// Per-outcome tallies for one (CA, lint, month) cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub total: u64,
    pub error: u64,
    pub pass: u64,
    pub info: u64,
    pub warn: u64,
    pub not_applicable: u64,
    pub not_evaluated: u64,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Pass => self.pass += 1,
            Outcome::Error => self.error += 1,
            Outcome::Warn => self.warn += 1,
            Outcome::Info => self.info += 1,
            Outcome::NotApplicable => self.not_applicable += 1,
            Outcome::NotEvaluated => self.not_evaluated += 1,
        }
    }

    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Pass => self.pass,
            Outcome::Error => self.error,
            Outcome::Warn => self.warn,
            Outcome::Info => self.info,
            Outcome::NotApplicable => self.not_applicable,
            Outcome::NotEvaluated => self.not_evaluated,
        }
    }

    /// Rows whose outcome found no violation.
    pub fn successes(&self) -> u64 {
        Outcome::ALL.iter().filter(|o| o.is_success()).map(|&o| self.get(o)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `(pass + NA + NE) / total`, or `None` when nothing was counted.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.successes() as f64 / self.total as f64)
    }
}

/// A non-empty cell. Only constructible from counts with `total > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregatedCell {
    counts: OutcomeCounts,
    success_rate: f64,
}

impl AggregatedCell {
    pub fn from_counts(counts: OutcomeCounts) -> Option<Self> {
        counts.success_rate().map(|success_rate| Self { counts, success_rate })
    }

    pub fn counts(&self) -> &OutcomeCounts {
        &self.counts
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

/// Rows excluded from the counts, kept so they are reported rather than lost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnomalyReport {
    pub malformed_date_rows: u64,
    pub malformed_date_certificates: BTreeSet<String>,
    pub unknown_outcome_rows: u64,
    pub unknown_outcome_certificates: BTreeSet<String>,
}

impl AnomalyReport {
    pub fn is_empty(&self) -> bool {
        self.malformed_date_rows == 0 && self.unknown_outcome_rows == 0
    }

    pub fn merge(&mut self, other: AnomalyReport) {
        self.malformed_date_rows += other.malformed_date_rows;
        self.malformed_date_certificates.extend(other.malformed_date_certificates);
        self.unknown_outcome_rows += other.unknown_outcome_rows;
        self.unknown_outcome_certificates.extend(other.unknown_outcome_certificates);
    }
}

/// Tally of one (CA, lint) pair. Owned by whoever computed it and merged
/// into an [`Aggregation`] afterwards.
#[derive(Clone, Debug, Default)]
pub struct PairTally {
    pub cells: BTreeMap<MonthBucket, AggregatedCell>,
    pub counted: u64,
    pub out_of_range: u64,
    pub anomalies: AnomalyReport,
}

/// Bucket the rows of one (CA, lint) pair into `months`.
///
/// Months with no rows produce no cell. Rows outside `months` are counted
/// as out of range; rows with an unparsable date or unknown outcome go to
/// the anomaly report.
pub fn tally_pair(evaluations: &[Evaluation], months: &BTreeSet<MonthBucket>) -> PairTally {
    let mut tally = PairTally::default();
    let mut counts: BTreeMap<MonthBucket, OutcomeCounts> = BTreeMap::new();

    for ev in evaluations {
        let bucket = match ev.issued_at.as_deref().map(bucket_of) {
            Some(Ok(b)) => b,
            _ => {
                tracing::debug!(certificate_id = %ev.certificate_id, issued_at = ?ev.issued_at, "skipping row with malformed date");
                tally.anomalies.malformed_date_rows += 1;
                tally.anomalies.malformed_date_certificates.insert(ev.certificate_id.clone());
                continue;
            }
        };
        let Some(outcome) = ev.result.as_deref().and_then(Outcome::parse) else {
            tracing::debug!(certificate_id = %ev.certificate_id, result = ?ev.result, "skipping row with unknown outcome");
            tally.anomalies.unknown_outcome_rows += 1;
            tally.anomalies.unknown_outcome_certificates.insert(ev.certificate_id.clone());
            continue;
        };
        if !months.contains(&bucket) {
            tally.out_of_range += 1;
            continue;
        }
        counts.entry(bucket).or_default().record(outcome);
        tally.counted += 1;
    }

    tally.cells = counts
        .into_iter()
        .filter_map(|(month, c)| AggregatedCell::from_counts(c).map(|cell| (month, cell)))
        .collect();
    tally
}

pub type MonthCells = BTreeMap<MonthBucket, AggregatedCell>;

/// CA -> lint -> month -> cell for one report run.
///
/// Every catalog CA and lint has a key; only non-empty months have cells.
#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    cells: BTreeMap<String, BTreeMap<String, MonthCells>>,
    pub months: Vec<MonthBucket>,
    pub counted: u64,
    pub out_of_range: u64,
    pub anomalies: AnomalyReport,
}

impl Aggregation {
    pub fn new<'a>(
        cas: impl IntoIterator<Item = &'a String>,
        lints: &BTreeSet<String>,
        months: Vec<MonthBucket>,
    ) -> Self {
        let cells = cas
            .into_iter()
            .map(|ca| (ca.clone(), lints.iter().map(|l| (l.clone(), MonthCells::new())).collect()))
            .collect();
        Self { cells, months, ..Default::default() }
    }

    pub fn merge_pair(&mut self, ca: &str, lint: &str, tally: PairTally) {
        self.counted += tally.counted;
        self.out_of_range += tally.out_of_range;
        self.anomalies.merge(tally.anomalies);
        self.cells
            .entry(ca.to_string())
            .or_default()
            .entry(lint.to_string())
            .or_default()
            .extend(tally.cells);
    }

    pub fn cells(&self) -> &BTreeMap<String, BTreeMap<String, MonthCells>> {
        &self.cells
    }

    pub fn cell(&self, ca: &str, lint: &str, month: MonthBucket) -> Option<&AggregatedCell> {
        self.cells.get(ca)?.get(lint)?.get(&month)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.values().flat_map(|lints| lints.values()).map(|m| m.len()).sum()
    }
}
