//! Persistence collaborator of the practice session.
//!
//! Stores are synchronous; the session controller calls them from
//! `spawn_blocking` so SQLite I/O stays off the async decision path.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::db::{self, DbPool};
use crate::domain::{ExerciseAttempt, FactMastery, MasteryMap};
use crate::error::{EngineError, Result};

pub trait MasteryStore: Send + Sync {
  fn load_mastery(&self, user_id: i64) -> Result<MasteryMap>;

  fn save_mastery(&self, records: &[FactMastery]) -> Result<()>;

  fn record_attempt(&self, attempt: &ExerciseAttempt) -> Result<()>;

  fn attempts(&self, user_id: i64) -> Result<Vec<ExerciseAttempt>>;

  /// Attempts at or after `since`, oldest first
  fn attempts_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<Vec<ExerciseAttempt>>;
}

pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }
}

impl MasteryStore for SqliteStore {
  fn load_mastery(&self, user_id: i64) -> Result<MasteryMap> {
    let conn = db::try_lock(&self.pool)?;
    Ok(db::load_mastery_for_user(&conn, user_id)?)
  }

  fn save_mastery(&self, records: &[FactMastery]) -> Result<()> {
    let mut conn = db::try_lock(&self.pool)?;
    Ok(db::upsert_mastery_batch(&mut conn, records)?)
  }

  fn record_attempt(&self, attempt: &ExerciseAttempt) -> Result<()> {
    let conn = db::try_lock(&self.pool)?;
    db::insert_attempt(&conn, attempt)?;
    Ok(())
  }

  fn attempts(&self, user_id: i64) -> Result<Vec<ExerciseAttempt>> {
    let conn = db::try_lock(&self.pool)?;
    Ok(db::get_attempts_for_user(&conn, user_id)?)
  }

  fn attempts_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<Vec<ExerciseAttempt>> {
    let conn = db::try_lock(&self.pool)?;
    Ok(db::get_attempts_since(&conn, user_id, since)?)
  }
}

/// Volatile store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStore {
  mastery: Mutex<HashMap<i64, MasteryMap>>,
  attempts: Mutex<Vec<ExerciseAttempt>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_mastery(records: impl IntoIterator<Item = FactMastery>) -> Self {
    let mut by_user: HashMap<i64, MasteryMap> = HashMap::new();
    for record in records {
      by_user
        .entry(record.user_id)
        .or_default()
        .insert(record.fact_id.clone(), record);
    }
    Self {
      mastery: Mutex::new(by_user),
      attempts: Mutex::new(Vec::new()),
    }
  }
}

impl MasteryStore for MemoryStore {
  fn load_mastery(&self, user_id: i64) -> Result<MasteryMap> {
    let mastery = self.mastery.lock().map_err(|_| EngineError::Lock)?;
    Ok(mastery.get(&user_id).cloned().unwrap_or_default())
  }

  fn save_mastery(&self, records: &[FactMastery]) -> Result<()> {
    let mut mastery = self.mastery.lock().map_err(|_| EngineError::Lock)?;
    for record in records {
      mastery
        .entry(record.user_id)
        .or_default()
        .insert(record.fact_id.clone(), record.clone());
    }
    Ok(())
  }

  fn record_attempt(&self, attempt: &ExerciseAttempt) -> Result<()> {
    let mut attempts = self.attempts.lock().map_err(|_| EngineError::Lock)?;
    let mut stored = attempt.clone();
    stored.id = attempts.len() as i64 + 1;
    attempts.push(stored);
    Ok(())
  }

  fn attempts(&self, user_id: i64) -> Result<Vec<ExerciseAttempt>> {
    let attempts = self.attempts.lock().map_err(|_| EngineError::Lock)?;
    Ok(attempts.iter().filter(|a| a.user_id == user_id).cloned().collect())
  }

  fn attempts_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<Vec<ExerciseAttempt>> {
    let mut recent = self.attempts(user_id)?;
    recent.retain(|a| a.timestamp >= since);
    recent.sort_by_key(|a| a.timestamp);
    Ok(recent)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Operation;
  use crate::testing::TestEnv;
  use chrono::{Duration, TimeZone};

  fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap()
  }

  fn attempt(user_id: i64) -> ExerciseAttempt {
    attempt_at(user_id, at(9))
  }

  fn attempt_at(user_id: i64, timestamp: DateTime<Utc>) -> ExerciseAttempt {
    ExerciseAttempt {
      id: 0,
      user_id,
      timestamp,
      problem_text: "3 × 4 = ?".into(),
      operation: Operation::Multiplication,
      correct_answer: 12,
      submitted_answer: 12,
      was_correct: true,
      duration_ms: 1500,
    }
  }

  fn exercise_store(store: &dyn MasteryStore) {
    let records = vec![
      FactMastery::new("3 * 4 = ?", 1, "MUL_TABLE_3").with_strength(2, 100),
      FactMastery::new("4 * 3 = ?", 1, "MUL_TABLE_3").with_strength(3, 200),
    ];
    store.save_mastery(&records).unwrap();
    store
      .save_mastery(&[FactMastery::new("3 * 4 = ?", 1, "MUL_TABLE_3").with_strength(4, 300)])
      .unwrap();

    let loaded = store.load_mastery(1).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded["3 * 4 = ?"].strength, 4);
    assert!(store.load_mastery(2).unwrap().is_empty());

    store.record_attempt(&attempt(1)).unwrap();
    store.record_attempt(&attempt(2)).unwrap();
    assert_eq!(store.attempts(1).unwrap().len(), 1);

    store.record_attempt(&attempt_at(1, at(18))).unwrap();
    store.record_attempt(&attempt_at(1, at(12) - Duration::days(1))).unwrap();
    let today = store.attempts_since(1, at(0)).unwrap();
    assert_eq!(today.len(), 2);
    assert_eq!(today[0].timestamp, at(9));
    assert_eq!(today[1].timestamp, at(18));
    assert_eq!(store.attempts(1).unwrap().len(), 3);
  }

  #[test]
  fn test_memory_store() {
    exercise_store(&MemoryStore::new());
  }

  #[test]
  fn test_sqlite_store() {
    let env = TestEnv::new().unwrap();
    let pool = db::init_db(&env.path().join("store.db")).unwrap();
    exercise_store(&SqliteStore::new(pool));
  }

  #[test]
  fn test_memory_store_seeded() {
    let store = MemoryStore::with_mastery([
      FactMastery::new("1 + 1 = ?", 5, "ADD_SUM_5").with_strength(5, 1),
    ]);
    assert_eq!(store.load_mastery(5).unwrap()["1 + 1 = ?"].strength, 5);
  }
}
