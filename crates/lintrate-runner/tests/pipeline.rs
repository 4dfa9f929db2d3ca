use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lintrate_core::OutcomeCounts;
use lintrate_report::{rates_from_counts, CountsReport, RateReport};
use lintrate_runner::{RunError, Runner, Settings};
use lintrate_storage::StoreError;
use lintrate_storage_sqlite::LINTER_SCHEMA;
use rusqlite::{params, Connection};
use tempfile::{tempdir, TempDir};

struct Fixture {
    dir: TempDir,
    db: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let db = dir.path().join("lint_results.db");
        Connection::open(&db).unwrap().execute_batch(LINTER_SCHEMA).unwrap();
        Self { dir, db }
    }

    fn conn(&self) -> Connection {
        Connection::open(&self.db).unwrap()
    }

    fn cert(&self, id: &str, issuer: &str, date: &str) -> &Self {
        self.conn()
            .execute(
                "INSERT INTO Certificates(certificate_id, certificate_issuer, certificate_subject, certificate_date) VALUES (?1, ?2, ?3, ?4)",
                params![id, issuer, "Example Subject", date],
            )
            .unwrap();
        self
    }

    fn lint(&self, name: &str) -> &Self {
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO lints(lint_name, lint_source, lint_effective_date) VALUES (?1, ?2, ?3)",
                params![name, "MinimumRequirementsForCodeSigningCertificates", "2016-01-01 00:00:00+00:00"],
            )
            .unwrap();
        self
    }

    fn result(&self, cert: &str, lint: &str, result: &str) -> &Self {
        self.lint(lint);
        self.conn()
            .execute(
                "INSERT INTO results(Certificate_id, lint_name, result) VALUES (?1, ?2, ?3)",
                params![cert, lint, result],
            )
            .unwrap();
        self
    }

    fn settings(&self) -> Settings {
        Settings {
            store: self.db.clone(),
            output: self.path("report.json"),
            counts: None,
            error_summary: None,
            from: None,
            to: None,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn read_rates(path: &Path) -> RateReport {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn acme_basic_constraints_two_thirds() {
    let f = Fixture::new();
    f.cert("c1", "Acme", "2021-05-02 09:00:00+00:00")
        .cert("c2", "Acme", "2021-05-17 12:30:00+00:00")
        .cert("c3", "Acme", "2021-05-31 18:00:00+00:00")
        .result("c1", "e_basic_constraints", "pass")
        .result("c2", "e_basic_constraints", "pass")
        .result("c3", "e_basic_constraints", "error");

    let summary = Runner::new(f.settings()).run().unwrap();
    assert_eq!(summary.cells, 1);

    let rates = read_rates(&f.path("report.json"));
    let rate = rates["Acme"]["e_basic_constraints"]["2021-05"];
    assert!((rate - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn single_not_applicable_is_perfect() {
    let f = Fixture::new();
    f.cert("c1", "Acme", "2020-02-10").result("c1", "e_sub_cert_aia_missing", "NA");
    Runner::new(f.settings()).run().unwrap();
    let rates = read_rates(&f.path("report.json"));
    assert_eq!(rates["Acme"]["e_sub_cert_aia_missing"]["2020-02"], 1.0);
}

#[test]
fn empty_cells_are_absent_and_rates_bounded() {
    let f = Fixture::new();
    f.cert("c1", "Acme", "2021-01-05")
        .cert("c2", "Acme", "2021-03-05")
        .cert("c3", "Beta", "2021-03-09")
        .result("c1", "e_a", "warn")
        .result("c2", "e_a", "info")
        .result("c3", "e_b", "NE");

    let mut s = f.settings();
    s.from = Some("2020-12".parse().unwrap());
    s.to = Some("2021-04".parse().unwrap());
    Runner::new(s).run().unwrap();

    let rates = read_rates(&f.path("report.json"));
    assert_eq!(rates["Acme"]["e_a"].keys().collect::<Vec<_>>(), vec!["2021-01", "2021-03"]);
    assert!(rates["Acme"]["e_b"].is_empty());
    assert!(rates["Beta"]["e_a"].is_empty());
    for lints in rates.values() {
        for months in lints.values() {
            for r in months.values() {
                assert!((0.0..=1.0).contains(r));
            }
        }
    }
}

#[test]
fn rerun_is_byte_identical() {
    let f = Fixture::new();
    for (i, (ca, result)) in [("Acme", "pass"), ("Beta", "error"), ("Acme", "warn"), ("Gamma", "NA")].iter().enumerate() {
        let id = format!("c{i}");
        f.cert(&id, ca, &format!("2019-{:02}-01", i + 1)).result(&id, "e_x", result).result(&id, "w_y", "pass");
    }
    Runner::new(f.settings()).run().unwrap();
    let first = std::fs::read(f.path("report.json")).unwrap();
    Runner::new(f.settings()).run().unwrap();
    let second = std::fs::read(f.path("report.json")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn counts_export_round_trips_to_rates() {
    let f = Fixture::new();
    let outcomes = ["pass", "error", "warn", "info", "NA", "NE", "pass"];
    for (i, o) in outcomes.iter().enumerate() {
        let id = format!("c{i}");
        let ca = if i % 2 == 0 { "Acme" } else { "Beta" };
        f.cert(&id, ca, &format!("2018-0{}-15", (i % 3) + 1)).result(&id, "e_x", o);
    }
    let mut s = f.settings();
    s.counts = Some(f.path("counts.json"));
    Runner::new(s).run().unwrap();

    let counts: CountsReport = serde_json::from_slice(&std::fs::read(f.path("counts.json")).unwrap()).unwrap();
    let rates = read_rates(&f.path("report.json"));
    let rederived = rates_from_counts(&counts);
    for (ca, lints) in &rates {
        for (lint, months) in lints {
            for (month, rate) in months {
                assert!((rederived[ca][lint][month] - rate).abs() < 1e-12);
            }
        }
    }
    let total: u64 = counts.values().flat_map(|l| l.values()).flat_map(|m| m.values()).map(|c: &OutcomeCounts| c.total).sum();
    assert_eq!(total, outcomes.len() as u64);
}

#[test]
fn ca_without_results_contributes_no_cells() {
    let f = Fixture::new();
    f.cert("c1", "Acme", "2021-05-01").result("c1", "e_x", "pass").cert("c2", "Silent CA", "2021-05-01");
    let summary = Runner::new(f.settings()).run().unwrap();
    assert_eq!(summary.cas, 2);
    assert_eq!(summary.cells, 1);
    let rates = read_rates(&f.path("report.json"));
    assert_eq!(rates["Silent CA"], BTreeMap::from([("e_x".to_string(), BTreeMap::new())]));
}

#[test]
fn quoted_ca_name_is_reported() {
    let f = Fixture::new();
    f.cert("c1", "Bob's \"Trusted\" CA", "2021-05-01").result("c1", "e_x", "pass");
    Runner::new(f.settings()).run().unwrap();
    let rates = read_rates(&f.path("report.json"));
    assert_eq!(rates["Bob's \"Trusted\" CA"]["e_x"]["2021-05"], 1.0);
}

#[test]
fn schema_mismatch_aborts_without_touching_report() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("broken.db");
    Connection::open(&db)
        .unwrap()
        .execute_batch("CREATE TABLE Certificates(certificate_ID text, certificate_issuer text, certificate_subject text, certificate_date text);")
        .unwrap();
    let output = dir.path().join("report.json");
    std::fs::write(&output, "previous").unwrap();

    let settings = Settings {
        store: db,
        output: output.clone(),
        counts: None,
        error_summary: None,
        from: None,
        to: None,
    };
    let err = Runner::new(settings).run().unwrap_err();
    match err {
        RunError::Open(StoreError::SchemaMismatch { relation }) => assert_eq!(relation, "table `lints`"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
}

#[test]
fn error_summary_document() {
    let f = Fixture::new();
    f.cert("c1", "Acme", "2021-05-01")
        .cert("c2", "Acme", "2021-05-01")
        .cert("c3", "Beta", "2021-05-01")
        .result("c1", "e_x", "error")
        .result("c1", "e_y", "error")
        .result("c2", "e_x", "pass")
        .result("c3", "e_y", "error");
    let mut s = f.settings();
    s.error_summary = Some(f.path("errors.json"));
    Runner::new(s).run().unwrap();

    let doc: serde_json::Value = serde_json::from_slice(&std::fs::read(f.path("errors.json")).unwrap()).unwrap();
    assert_eq!(doc["certificates_total"], 3);
    assert_eq!(doc["certificates_with_errors"], 2);
    assert_eq!(doc["certificates_without_errors"], 1);
    assert_eq!(doc["errors_by_lint"]["e_y"], 2);
    assert_eq!(doc["error_certificates_by_ca"]["Acme"], 1);
}

#[test]
fn unknown_outcomes_and_bad_dates_are_counted_not_reported() {
    let f = Fixture::new();
    f.cert("c1", "Acme", "2021-05-01")
        .cert("c2", "Acme", "not-a-date")
        .cert("c3", "Acme", "2021-05-09")
        .result("c1", "e_x", "pass")
        .result("c2", "e_x", "pass")
        .result("c3", "e_x", "fatal");
    let summary = Runner::new(f.settings()).run().unwrap();
    assert_eq!(summary.counted, 1);
    assert_eq!(summary.anomalies.malformed_date_rows, 1);
    assert_eq!(summary.anomalies.unknown_outcome_rows, 1);
    let rates = read_rates(&f.path("report.json"));
    assert_eq!(rates["Acme"]["e_x"]["2021-05"], 1.0);
}
