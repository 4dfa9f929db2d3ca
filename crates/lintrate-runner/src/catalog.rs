use std::collections::BTreeSet;

use lintrate_storage::{ResultStore, StoreError};

/// The CA and lint dimensions of a report, as observed in the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionCatalog {
    pub cas: BTreeSet<String>,
    pub lints: BTreeSet<String>,
}

impl DimensionCatalog {
    pub fn load(store: &dyn ResultStore) -> Result<Self, StoreError> {
        Ok(Self { cas: list_cas(store)?, lints: list_lints(store)? })
    }
}

pub fn list_cas(store: &dyn ResultStore) -> Result<BTreeSet<String>, StoreError> {
    store.distinct_issuers()
}

pub fn list_lints(store: &dyn ResultStore) -> Result<BTreeSet<String>, StoreError> {
    store.distinct_lints()
}
