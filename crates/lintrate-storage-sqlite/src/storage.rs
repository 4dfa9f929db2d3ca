use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use lintrate_core::{ErrorResult, Evaluation, Outcome};
use lintrate_storage::{ResultStore, StoreError};
use rusqlite::{params, Connection, OpenFlags};

use crate::schema::verify_schema;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only accessor over a linter result database.
pub struct SqliteResultStore {
    conn: Connection,
    location: String,
}

fn query_err(what: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |e| StoreError::Query { what, reason: e.to_string() }
}

impl SqliteResultStore {
    /// Open an existing database read-only and check its schema. A missing
    /// file is an error, never an empty new database.
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        let location = db_path.display().to_string();
        let unavailable = |e: rusqlite::Error| StoreError::Unavailable { location: location.clone(), reason: e.to_string() };
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(unavailable)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(unavailable)?;
        Self::from_connection(conn, location)
    }

    pub fn from_connection(conn: Connection, location: impl Into<String>) -> Result<Self, StoreError> {
        let location = location.into();
        verify_schema(&conn, &location)?;
        tracing::debug!(location = %location, "result store opened");
        Ok(Self { conn, location })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn strings(&self, what: &'static str, sql: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(sql).map_err(query_err(what))?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0)).map_err(query_err(what))?;
        let mut out = vec![];
        for row in rows {
            out.push(row.map_err(query_err(what))?);
        }
        Ok(out)
    }
}

impl ResultStore for SqliteResultStore {
    fn distinct_issuers(&self) -> Result<BTreeSet<String>, StoreError> {
        let v = self.strings("list issuers", "SELECT DISTINCT COALESCE(certificate_issuer, '') FROM certificates")?;
        Ok(v.into_iter().collect())
    }

    fn distinct_lints(&self) -> Result<BTreeSet<String>, StoreError> {
        let v = self.strings("list lints", "SELECT DISTINCT lint_name FROM lints WHERE lint_name IS NOT NULL")?;
        Ok(v.into_iter().collect())
    }

    fn evaluations(&self, issuer: &str, lint: &str) -> Result<Vec<Evaluation>, StoreError> {
        let what = "fetch evaluations";
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT c.certificate_id, CAST(c.certificate_date AS TEXT), CAST(r.result AS TEXT)
                 FROM certificates c JOIN results r ON r.certificate_id = c.certificate_id
                 WHERE COALESCE(c.certificate_issuer, '') = ?1 AND r.lint_name = ?2
                 ORDER BY c.certificate_id",
            )
            .map_err(query_err(what))?;
        let rows = stmt
            .query_map(params![issuer, lint], |r| {
                Ok(Evaluation {
                    certificate_id: r.get(0)?,
                    issued_at: r.get(1)?,
                    result: r.get(2)?,
                })
            })
            .map_err(query_err(what))?;
        let mut out = vec![];
        for row in rows {
            out.push(row.map_err(query_err(what))?);
        }
        Ok(out)
    }

    fn issuance_dates(&self) -> Result<Vec<String>, StoreError> {
        self.strings(
            "list issuance dates",
            "SELECT DISTINCT CAST(certificate_date AS TEXT) FROM certificates WHERE certificate_date IS NOT NULL",
        )
    }

    fn certificate_count(&self) -> Result<u64, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM certificates", [], |r| r.get(0))
            .map_err(query_err("count certificates"))?;
        Ok(n.max(0) as u64)
    }

    fn error_results(&self) -> Result<Vec<ErrorResult>, StoreError> {
        let what = "fetch error results";
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.certificate_id, COALESCE(c.certificate_issuer, ''), r.lint_name
                 FROM results r JOIN certificates c ON c.certificate_id = r.certificate_id
                 WHERE lower(r.result) = ?1",
            )
            .map_err(query_err(what))?;
        let rows = stmt
            .query_map(params![Outcome::Error.as_str()], |r| {
                Ok(ErrorResult {
                    certificate_id: r.get(0)?,
                    issuer: r.get(1)?,
                    lint_name: r.get(2)?,
                })
            })
            .map_err(query_err(what))?;
        let mut out = vec![];
        for row in rows {
            out.push(row.map_err(query_err(what))?);
        }
        Ok(out)
    }
}
