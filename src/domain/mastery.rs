use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upper bound any strategy may assign to a fact
pub const MAX_STRENGTH: u8 = 10;

/// Strength at which a fact counts as mastered
pub const MASTERY_STRENGTH: u8 = 5;

/// In-memory mastery record keyed by fact id
pub type MasteryMap = HashMap<String, FactMastery>;

/// Per-user mastery state for one atomic fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactMastery {
  pub fact_id: String,
  pub user_id: i64,
  /// Level that last updated this record (empty when unknown)
  pub level: String,
  pub strength: u8,
  /// Epoch milliseconds of the last attempt
  pub last_tested_ms: i64,
  pub avg_duration_ms: u64,
}

impl FactMastery {
  pub fn new(fact_id: impl Into<String>, user_id: i64, level: impl Into<String>) -> Self {
    Self {
      fact_id: fact_id.into(),
      user_id,
      level: level.into(),
      strength: 0,
      last_tested_ms: 0,
      avg_duration_ms: 0,
    }
  }

  pub fn with_strength(mut self, strength: u8, last_tested_ms: i64) -> Self {
    self.strength = strength.min(MAX_STRENGTH);
    self.last_tested_ms = last_tested_ms;
    self
  }

  pub fn is_mastered(&self) -> bool {
    self.strength >= MASTERY_STRENGTH
  }
}

/// Strength of a fact, treating unseen facts as strength 0
pub fn strength_of(mastery: &MasteryMap, fact_id: &str) -> u8 {
  mastery.get(fact_id).map_or(0, |m| m.strength)
}

/// Last-tested timestamp of a fact, treating unseen facts as never tested
pub fn last_tested_of(mastery: &MasteryMap, fact_id: &str) -> i64 {
  mastery.get(fact_id).map_or(0, |m| m.last_tested_ms)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_mastery_defaults() {
    let m = FactMastery::new("1 + 1 = ?", 7, "ADD_SUM_5");
    assert_eq!(m.strength, 0);
    assert_eq!(m.last_tested_ms, 0);
    assert_eq!(m.avg_duration_ms, 0);
    assert_eq!(m.user_id, 7);
    assert!(!m.is_mastered());
  }

  #[test]
  fn test_with_strength_clamps() {
    let m = FactMastery::new("1 + 1 = ?", 1, "").with_strength(42, 100);
    assert_eq!(m.strength, MAX_STRENGTH);
    assert_eq!(m.last_tested_ms, 100);
  }

  #[test]
  fn test_lookup_helpers_default_for_unseen() {
    let mut map = MasteryMap::new();
    map.insert(
      "2 + 2 = ?".into(),
      FactMastery::new("2 + 2 = ?", 1, "").with_strength(5, 500),
    );
    assert_eq!(strength_of(&map, "2 + 2 = ?"), 5);
    assert_eq!(last_tested_of(&map, "2 + 2 = ?"), 500);
    assert_eq!(strength_of(&map, "3 + 3 = ?"), 0);
    assert_eq!(last_tested_of(&map, "3 + 3 = ?"), 0);
  }
}
