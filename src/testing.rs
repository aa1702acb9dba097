//! Test utilities for database setup.
//!
//! Reuses the production schema initialization so tests never carry their
//! own copy of the tables.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// A migrated database file in its own temporary directory
pub struct TestEnv {
  /// Temporary directory (kept alive for database file persistence)
  pub temp: TempDir,
  pub conn: Connection,
}

impl TestEnv {
  pub fn new() -> rusqlite::Result<Self> {
    let temp =
      TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let conn = Connection::open(temp.path().join("drill.db"))?;
    crate::db::schema::run_migrations(&conn)?;

    Ok(Self { temp, conn })
  }

  /// Get the temporary directory path for creating test files.
  pub fn path(&self) -> &Path {
    self.temp.path()
  }
}
