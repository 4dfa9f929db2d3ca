use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::ErrorResult;

/// Which certificates and lints produced `error` outcomes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub certificates_total: u64,
    pub certificates_with_errors: u64,
    pub certificates_without_errors: u64,
    /// Number of `error` results per lint.
    pub errors_by_lint: BTreeMap<String, u64>,
    /// Number of distinct certificates with at least one error, per issuer.
    pub error_certificates_by_ca: BTreeMap<String, u64>,
}

impl ErrorSummary {
    pub fn from_results(certificates_total: u64, errors: &[ErrorResult]) -> Self {
        let mut errors_by_lint: BTreeMap<String, u64> = BTreeMap::new();
        let mut failing: BTreeMap<&str, &str> = BTreeMap::new();
        for e in errors {
            *errors_by_lint.entry(e.lint_name.clone()).or_default() += 1;
            failing.insert(&e.certificate_id, &e.issuer);
        }

        let mut error_certificates_by_ca: BTreeMap<String, u64> = BTreeMap::new();
        for issuer in failing.values() {
            *error_certificates_by_ca.entry(issuer.to_string()).or_default() += 1;
        }

        let with_errors = failing.len() as u64;
        Self {
            certificates_total,
            certificates_with_errors: with_errors,
            certificates_without_errors: certificates_total.saturating_sub(with_errors),
            errors_by_lint,
            error_certificates_by_ca,
        }
    }
}
