use std::collections::BTreeSet;

use lintrate_core::{ErrorResult, Evaluation};

use crate::StoreError;

/// Read-only view over the certificates, lints and results tables.
///
/// Implementations treat the store as a consistent snapshot for the
/// duration of a report run.
pub trait ResultStore {
    /// Distinct issuers of recorded certificates. A NULL issuer is `""`.
    fn distinct_issuers(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Names of all lint definitions.
    fn distinct_lints(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Every result of `lint` on certificates issued by `issuer`, in one query.
    fn evaluations(&self, issuer: &str, lint: &str) -> Result<Vec<Evaluation>, StoreError>;

    /// Distinct raw issuance dates, used to derive a default month range.
    fn issuance_dates(&self) -> Result<Vec<String>, StoreError>;

    fn certificate_count(&self) -> Result<u64, StoreError>;

    /// Every `error` outcome joined with its certificate's issuer.
    fn error_results(&self) -> Result<Vec<ErrorResult>, StoreError>;
}
