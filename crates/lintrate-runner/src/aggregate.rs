use std::collections::BTreeSet;

use lintrate_core::{tally_pair, Aggregation, MonthBucket};
use lintrate_storage::ResultStore;

use crate::RunError;

/// Builds the CA x lint x month table with one store query per (CA, lint).
///
/// Every pair is fetched even when the month window is empty, so rows with
/// bad dates or unknown outcomes still reach the anomaly report.
pub struct AggregationEngine<'a> {
    store: &'a dyn ResultStore,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(store: &'a dyn ResultStore) -> Self {
        Self { store }
    }

    pub fn aggregate(
        &self,
        cas: &BTreeSet<String>,
        lints: &BTreeSet<String>,
        months: Vec<MonthBucket>,
    ) -> Result<Aggregation, RunError> {
        let window: BTreeSet<MonthBucket> = months.iter().copied().collect();
        let mut agg = Aggregation::new(cas, lints, months);

        for ca in cas {
            for lint in lints {
                let rows = self.store.evaluations(ca, lint).map_err(|source| RunError::Aggregation {
                    ca: ca.clone(),
                    lint: lint.clone(),
                    source,
                })?;
                if rows.is_empty() {
                    continue;
                }
                agg.merge_pair(ca, lint, tally_pair(&rows, &window));
            }
        }

        tracing::info!(
            cas = cas.len(),
            lints = lints.len(),
            months = window.len(),
            cells = agg.cell_count(),
            counted = agg.counted,
            out_of_range = agg.out_of_range,
            "aggregation complete"
        );
        Ok(agg)
    }
}
