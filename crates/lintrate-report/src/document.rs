use std::collections::BTreeMap;

use lintrate_core::{Aggregation, AggregatedCell, OutcomeCounts};

/// `{ CA: { lint: { "YYYY-MM": value } } }`
pub type Nested<T> = BTreeMap<String, BTreeMap<String, BTreeMap<String, T>>>;

/// The success-rate report.
pub type RateReport = Nested<f64>;

/// Companion document with the raw tallies behind each rate.
pub type CountsReport = Nested<OutcomeCounts>;

fn project<T>(agg: &Aggregation, f: impl Fn(&AggregatedCell) -> T) -> Nested<T> {
    agg.cells()
        .iter()
        .map(|(ca, lints)| {
            let lints = lints
                .iter()
                .map(|(lint, months)| {
                    let months = months.iter().map(|(m, cell)| (m.to_string(), f(cell))).collect();
                    (lint.clone(), months)
                })
                .collect();
            (ca.clone(), lints)
        })
        .collect()
}

pub fn rate_report(agg: &Aggregation) -> RateReport {
    project(agg, |cell| cell.success_rate())
}

pub fn counts_report(agg: &Aggregation) -> CountsReport {
    project(agg, |cell| *cell.counts())
}

/// Re-derive the rate report from exported counts. Empty tallies are dropped.
pub fn rates_from_counts(counts: &CountsReport) -> RateReport {
    counts
        .iter()
        .map(|(ca, lints)| {
            let lints = lints
                .iter()
                .map(|(lint, months)| {
                    let months = months
                        .iter()
                        .filter_map(|(m, c)| c.success_rate().map(|r| (m.clone(), r)))
                        .collect();
                    (lint.clone(), months)
                })
                .collect();
            (ca.clone(), lints)
        })
        .collect()
}
