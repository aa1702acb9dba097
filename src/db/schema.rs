use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS fact_mastery (
      fact_id TEXT NOT NULL,
      user_id INTEGER NOT NULL,
      level TEXT NOT NULL DEFAULT '',
      strength INTEGER NOT NULL DEFAULT 0,
      last_tested_ms INTEGER NOT NULL DEFAULT 0,
      avg_duration_ms INTEGER NOT NULL DEFAULT 0,
      PRIMARY KEY (fact_id, user_id)
    );

    CREATE TABLE IF NOT EXISTS exercise_attempts (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      timestamp TEXT NOT NULL,
      problem_text TEXT NOT NULL,
      operation TEXT NOT NULL,
      correct_answer INTEGER NOT NULL,
      submitted_answer INTEGER NOT NULL,
      was_correct INTEGER NOT NULL,
      duration_ms INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_fact_mastery_user ON fact_mastery(user_id);
    CREATE INDEX IF NOT EXISTS idx_attempts_user_time ON exercise_attempts(user_id, timestamp);
    "#,
  )?;

  // Databases created before durations were tracked
  add_column_if_missing(conn, "fact_mastery", "avg_duration_ms", "INTEGER NOT NULL DEFAULT 0")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
