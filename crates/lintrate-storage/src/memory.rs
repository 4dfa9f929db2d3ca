use std::collections::{BTreeMap, BTreeSet};

use lintrate_core::{Certificate, ErrorResult, Evaluation, LintDefinition, Outcome, ResultRecord};

use crate::traits::ResultStore;
use crate::StoreError;

/// In-memory result store for tests. Enforces the same keys the relational
/// schema does: unique certificate ids and lint names, one result per
/// (certificate, lint), and results only for known certificates and lints.
#[derive(Default)]
pub struct InMemoryResultStore {
    certificates: BTreeMap<String, Certificate>,
    lints: BTreeMap<String, LintDefinition>,
    results: BTreeMap<(String, String), String>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_certificate(&mut self, cert: Certificate) -> Result<(), StoreError> {
        if self.certificates.contains_key(&cert.id) {
            return Err(StoreError::Constraint(format!("duplicate certificate {}", cert.id)));
        }
        self.certificates.insert(cert.id.clone(), cert);
        Ok(())
    }

    /// Lints are keyed by name; re-inserting a known name is ignored.
    pub fn insert_lint(&mut self, lint: LintDefinition) {
        self.lints.entry(lint.name.clone()).or_insert(lint);
    }

    pub fn insert_result(&mut self, record: ResultRecord) -> Result<(), StoreError> {
        self.insert_raw_result(&record.certificate_id, &record.lint_name, record.result.as_str())
    }

    /// Insert a result with arbitrary outcome text, as a foreign writer might.
    pub fn insert_raw_result(&mut self, certificate_id: &str, lint_name: &str, result: &str) -> Result<(), StoreError> {
        if !self.certificates.contains_key(certificate_id) {
            return Err(StoreError::Constraint(format!("unknown certificate {certificate_id}")));
        }
        if !self.lints.contains_key(lint_name) {
            return Err(StoreError::Constraint(format!("unknown lint {lint_name}")));
        }
        let key = (certificate_id.to_string(), lint_name.to_string());
        if self.results.contains_key(&key) {
            return Err(StoreError::Constraint(format!("duplicate result for {certificate_id}/{lint_name}")));
        }
        self.results.insert(key, result.to_string());
        Ok(())
    }

    /// Convenience for tests: certificate plus its lint and outcome in one call.
    pub fn record(&mut self, certificate_id: &str, issuer: &str, issued_at: &str, lint: &str, outcome: Outcome) -> Result<(), StoreError> {
        if !self.certificates.contains_key(certificate_id) {
            self.insert_certificate(Certificate {
                id: certificate_id.to_string(),
                issuer: Some(issuer.to_string()),
                subject: None,
                issued_at: Some(issued_at.to_string()),
            })?;
        }
        self.insert_lint(LintDefinition { name: lint.to_string(), source: None, effective_date: None });
        self.insert_result(ResultRecord {
            certificate_id: certificate_id.to_string(),
            lint_name: lint.to_string(),
            result: outcome,
        })
    }
}

impl ResultStore for InMemoryResultStore {
    fn distinct_issuers(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.certificates.values().map(|c| c.issuer_name().to_string()).collect())
    }

    fn distinct_lints(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.lints.keys().cloned().collect())
    }

    fn evaluations(&self, issuer: &str, lint: &str) -> Result<Vec<Evaluation>, StoreError> {
        Ok(self
            .results
            .iter()
            .filter(|((_, l), _)| l == lint)
            .filter_map(|((cert_id, _), result)| {
                let cert = self.certificates.get(cert_id)?;
                (cert.issuer_name() == issuer).then(|| Evaluation {
                    certificate_id: cert_id.clone(),
                    issued_at: cert.issued_at.clone(),
                    result: Some(result.clone()),
                })
            })
            .collect())
    }

    fn issuance_dates(&self) -> Result<Vec<String>, StoreError> {
        let dates: BTreeSet<String> = self.certificates.values().filter_map(|c| c.issued_at.clone()).collect();
        Ok(dates.into_iter().collect())
    }

    fn certificate_count(&self) -> Result<u64, StoreError> {
        Ok(self.certificates.len() as u64)
    }

    fn error_results(&self) -> Result<Vec<ErrorResult>, StoreError> {
        Ok(self
            .results
            .iter()
            .filter(|(_, r)| Outcome::parse(r) == Some(Outcome::Error))
            .filter_map(|((cert_id, lint), _)| {
                self.certificates.get(cert_id).map(|c| ErrorResult {
                    certificate_id: cert_id.clone(),
                    issuer: c.issuer_name().to_string(),
                    lint_name: lint.clone(),
                })
            })
            .collect())
    }
}
