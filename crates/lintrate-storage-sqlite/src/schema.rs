use std::collections::HashSet;

use lintrate_storage::StoreError;
use rusqlite::Connection;

/// Tables and columns the report reads. SQLite compares identifiers
/// case-insensitively, so the linter's `Certificates`/`Certificate_ID`
/// spelling satisfies these.
pub const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("certificates", &["certificate_id", "certificate_issuer", "certificate_subject", "certificate_date"]),
    ("lints", &["lint_name", "lint_source", "lint_effective_date"]),
    ("results", &["certificate_id", "lint_name", "result"]),
];

/// DDL the linter creates its result store with.
pub const LINTER_SCHEMA: &str = "
CREATE TABLE Certificates(
    certificate_ID text primary key not null,
    certificate_issuer text,
    certificate_subject text,
    certificate_date text);
CREATE TABLE lints(
    lint_name text primary key not null,
    lint_source text,
    lint_effective_date text);
CREATE TABLE results(
    Certificate_ID text not null,
    lint_name text not null,
    result text,
    primary key (Certificate_ID, lint_name),
    foreign key (Certificate_ID) references Certificates,
    foreign key (lint_name) references lints);
";

pub(crate) fn get_columns(conn: &Connection, table: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = HashSet::new();
    for r in rows {
        out.insert(r?.to_ascii_lowercase());
    }
    Ok(out)
}

/// Fails with `SchemaMismatch` naming the first missing table or column.
pub(crate) fn verify_schema(conn: &Connection, location: &str) -> Result<(), StoreError> {
    for (table, columns) in REQUIRED_SCHEMA {
        // The first statement against the file: failures here mean it is not
        // a usable database at all.
        let present = get_columns(conn, table).map_err(|e| StoreError::Unavailable {
            location: location.to_string(),
            reason: e.to_string(),
        })?;
        if present.is_empty() {
            return Err(StoreError::missing_table(table));
        }
        if let Some(col) = columns.iter().find(|c| !present.contains(**c)) {
            return Err(StoreError::missing_column(table, col));
        }
    }
    Ok(())
}
