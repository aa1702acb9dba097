//! Fact mastery persistence

use rusqlite::{params, Connection, Result, Row};

use crate::domain::{FactMastery, MasteryMap};

pub fn load_mastery_for_user(conn: &Connection, user_id: i64) -> Result<MasteryMap> {
  let mut stmt = conn.prepare(
    r#"
    SELECT fact_id, user_id, level, strength, last_tested_ms, avg_duration_ms
    FROM fact_mastery
    WHERE user_id = ?1
    "#,
  )?;
  let rows = stmt.query_map(params![user_id], row_to_mastery)?;

  let mut mastery = MasteryMap::new();
  for row in rows {
    let record = row?;
    mastery.insert(record.fact_id.clone(), record);
  }
  Ok(mastery)
}

pub fn upsert_mastery(conn: &Connection, mastery: &FactMastery) -> Result<()> {
  conn.execute(
    r#"
    INSERT INTO fact_mastery (fact_id, user_id, level, strength, last_tested_ms, avg_duration_ms)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(fact_id, user_id) DO UPDATE SET
      level = excluded.level,
      strength = excluded.strength,
      last_tested_ms = excluded.last_tested_ms,
      avg_duration_ms = excluded.avg_duration_ms
    "#,
    params![
      mastery.fact_id,
      mastery.user_id,
      mastery.level,
      mastery.strength,
      mastery.last_tested_ms,
      mastery.avg_duration_ms as i64,
    ],
  )?;
  Ok(())
}

/// Write several records in one transaction
pub fn upsert_mastery_batch(conn: &mut Connection, records: &[FactMastery]) -> Result<()> {
  let tx = conn.transaction()?;
  for record in records {
    upsert_mastery(&tx, record)?;
  }
  tx.commit()
}

fn row_to_mastery(row: &Row) -> Result<FactMastery> {
  let avg_duration_ms: i64 = row.get(5)?;
  Ok(FactMastery {
    fact_id: row.get(0)?,
    user_id: row.get(1)?,
    level: row.get(2)?,
    strength: row.get(3)?,
    last_tested_ms: row.get(4)?,
    avg_duration_ms: avg_duration_ms.max(0) as u64,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_upsert_and_load() {
    let env = TestEnv::new().unwrap();
    let record = FactMastery::new("7 * 6 = ?", 1, "MUL_TABLE_7").with_strength(3, 1000);
    upsert_mastery(&env.conn, &record).unwrap();

    let loaded = load_mastery_for_user(&env.conn, 1).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get("7 * 6 = ?"), Some(&record));
  }

  #[test]
  fn test_upsert_replaces_existing_record() {
    let env = TestEnv::new().unwrap();
    let mut record = FactMastery::new("2 + 3 = ?", 1, "ADD_SUM_5").with_strength(1, 1000);
    upsert_mastery(&env.conn, &record).unwrap();

    record.strength = 4;
    record.avg_duration_ms = 1800;
    record.level = "ADD_REVIEW_1".into();
    upsert_mastery(&env.conn, &record).unwrap();

    let loaded = load_mastery_for_user(&env.conn, 1).unwrap().remove("2 + 3 = ?").unwrap();
    assert_eq!(loaded.strength, 4);
    assert_eq!(loaded.avg_duration_ms, 1800);
    assert_eq!(loaded.level, "ADD_REVIEW_1");
  }

  #[test]
  fn test_records_are_per_user() {
    let mut env = TestEnv::new().unwrap();
    let records = vec![
      FactMastery::new("1 + 1 = ?", 1, "ADD_SUM_5").with_strength(2, 10),
      FactMastery::new("1 + 1 = ?", 2, "ADD_SUM_5").with_strength(5, 20),
      FactMastery::new("1 + 2 = ?", 2, "ADD_SUM_5").with_strength(1, 30),
    ];
    upsert_mastery_batch(&mut env.conn, &records).unwrap();

    assert_eq!(load_mastery_for_user(&env.conn, 1).unwrap().len(), 1);
    let second = load_mastery_for_user(&env.conn, 2).unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second["1 + 1 = ?"].strength, 5);
    assert!(load_mastery_for_user(&env.conn, 3).unwrap().is_empty());
  }
}
