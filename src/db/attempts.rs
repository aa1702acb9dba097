//! Attempt history

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result, Row};

use crate::domain::{ExerciseAttempt, Operation};

pub fn insert_attempt(conn: &Connection, attempt: &ExerciseAttempt) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO exercise_attempts
      (user_id, timestamp, problem_text, operation, correct_answer, submitted_answer, was_correct, duration_ms)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
    params![
      attempt.user_id,
      attempt.timestamp.to_rfc3339(),
      attempt.problem_text,
      attempt.operation.as_str(),
      attempt.correct_answer,
      attempt.submitted_answer,
      if attempt.was_correct { 1 } else { 0 },
      attempt.duration_ms as i64,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// All attempts of a user, oldest first
pub fn get_attempts_for_user(conn: &Connection, user_id: i64) -> Result<Vec<ExerciseAttempt>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, user_id, timestamp, problem_text, operation, correct_answer, submitted_answer, was_correct, duration_ms
    FROM exercise_attempts
    WHERE user_id = ?1
    ORDER BY timestamp ASC, id ASC
    "#,
  )?;
  let attempts = stmt
    .query_map(params![user_id], row_to_attempt)?
    .collect::<Result<Vec<_>>>()?;
  Ok(attempts)
}

/// Attempts of a user at or after `since`, oldest first
pub fn get_attempts_since(
  conn: &Connection,
  user_id: i64,
  since: DateTime<Utc>,
) -> Result<Vec<ExerciseAttempt>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, user_id, timestamp, problem_text, operation, correct_answer, submitted_answer, was_correct, duration_ms
    FROM exercise_attempts
    WHERE user_id = ?1 AND timestamp >= ?2
    ORDER BY timestamp ASC, id ASC
    "#,
  )?;
  let attempts = stmt
    .query_map(params![user_id, since.to_rfc3339()], row_to_attempt)?
    .collect::<Result<Vec<_>>>()?;
  Ok(attempts)
}

fn row_to_attempt(row: &Row) -> Result<ExerciseAttempt> {
  let timestamp_str: String = row.get(2)?;
  let operation_str: String = row.get(4)?;
  let was_correct: i64 = row.get(7)?;
  let duration_ms: i64 = row.get(8)?;

  let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
  let operation = Operation::from_str(&operation_str).ok_or_else(|| {
    rusqlite::Error::FromSqlConversionFailure(
      4,
      Type::Text,
      format!("unknown operation: {}", operation_str).into(),
    )
  })?;

  Ok(ExerciseAttempt {
    id: row.get(0)?,
    user_id: row.get(1)?,
    timestamp,
    problem_text: row.get(3)?,
    operation,
    correct_answer: row.get(5)?,
    submitted_answer: row.get(6)?,
    was_correct: was_correct != 0,
    duration_ms: duration_ms.max(0) as u64,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;
  use chrono::{Duration, TimeZone};

  fn attempt(user_id: i64, timestamp: DateTime<Utc>, was_correct: bool) -> ExerciseAttempt {
    ExerciseAttempt {
      id: 0,
      user_id,
      timestamp,
      problem_text: "8 - 3 = ?".into(),
      operation: Operation::Subtraction,
      correct_answer: 5,
      submitted_answer: if was_correct { 5 } else { 4 },
      was_correct,
      duration_ms: 2100,
    }
  }

  #[test]
  fn test_insert_and_read_back() {
    let env = TestEnv::new().unwrap();
    let at = Utc.with_ymd_and_hms(2025, 3, 10, 8, 30, 0).unwrap();
    let id = insert_attempt(&env.conn, &attempt(1, at, false)).unwrap();
    assert!(id > 0);

    let attempts = get_attempts_for_user(&env.conn, 1).unwrap();
    assert_eq!(attempts.len(), 1);
    let stored = &attempts[0];
    assert_eq!(stored.id, id);
    assert_eq!(stored.timestamp, at);
    assert_eq!(stored.operation, Operation::Subtraction);
    assert_eq!(stored.submitted_answer, 4);
    assert!(!stored.was_correct);
    assert_eq!(stored.duration_ms, 2100);
  }

  #[test]
  fn test_attempts_are_ordered_and_filtered() {
    let env = TestEnv::new().unwrap();
    let base = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
    insert_attempt(&env.conn, &attempt(1, base + Duration::days(2), true)).unwrap();
    insert_attempt(&env.conn, &attempt(1, base, true)).unwrap();
    insert_attempt(&env.conn, &attempt(2, base, true)).unwrap();

    let attempts = get_attempts_for_user(&env.conn, 1).unwrap();
    assert_eq!(attempts.len(), 2);
    assert!(attempts[0].timestamp < attempts[1].timestamp);

    let recent = get_attempts_since(&env.conn, 1, base + Duration::days(1)).unwrap();
    assert_eq!(recent.len(), 1);
  }
}
