use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store unavailable at {location}: {reason}")]
    Unavailable { location: String, reason: String },
    #[error("result store schema mismatch: missing {relation}")]
    SchemaMismatch { relation: String },
    #[error("query failed ({what}): {reason}")]
    Query { what: &'static str, reason: String },
    #[error("constraint violated: {0}")]
    Constraint(String),
}

impl StoreError {
    pub fn missing_table(table: &str) -> Self {
        StoreError::SchemaMismatch { relation: format!("table `{table}`") }
    }

    pub fn missing_column(table: &str, column: &str) -> Self {
        StoreError::SchemaMismatch { relation: format!("column `{table}.{column}`") }
    }
}
