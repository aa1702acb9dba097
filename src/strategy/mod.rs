//! Exercise scheduling strategies.
//!
//! A strategy decides which exercise to present next and how an answer
//! changes fact mastery. The session controller owns the mastery map and
//! lends it to exactly one strategy per call.

pub mod composite;
pub mod drill;
pub mod fixed;
pub mod review;
pub mod smart;

use std::sync::Arc;

use rand::{Rng, RngCore};

pub use composite::CompositeDrillStrategy;
pub use drill::DrillStrategy;
pub use fixed::FixedListProvider;
pub use review::ReviewStrategy;
pub use smart::SmartPracticeStrategy;

use crate::clock::Clock;
use crate::config;
use crate::curriculum::{ExerciseStrategy, Level};
use crate::domain::{Exercise, FactMastery, MasteryMap};
use crate::error::Result;

pub trait ExerciseProvider: Send {
  /// Short name for logs
  fn name(&self) -> &'static str;

  /// Next exercise to present. Only finite providers ever return `None`.
  fn next_exercise(&mut self, mastery: &MasteryMap) -> Result<Option<Exercise>>;

  /// Apply an answer to `mastery` and return every record that changed.
  fn record_attempt(
    &mut self,
    mastery: &mut MasteryMap,
    exercise: &Exercise,
    was_correct: bool,
  ) -> Result<Vec<FactMastery>>;

  /// Facts currently rotated through, for debugging. Stateless strategies
  /// have none.
  fn working_set(&self) -> &[String] {
    &[]
  }
}

/// Scan from the front and stop at each position with probability 1/2,
/// falling through to the last element. Returns `None` for `len == 0`.
pub fn soft_recency_index(len: usize, rng: &mut dyn RngCore) -> Option<usize> {
  if len == 0 {
    return None;
  }
  (0..len - 1)
    .find(|_| rng.random_bool(config::SOFT_PICK_PROBABILITY))
    .or(Some(len - 1))
}

/// Existing record for `fact_id`, or a fresh strength-0 one
pub(crate) fn mastery_or_new(mastery: &MasteryMap, fact_id: &str, user_id: i64, level_id: &str) -> FactMastery {
  mastery
    .get(fact_id)
    .cloned()
    .unwrap_or_else(|| FactMastery::new(fact_id, user_id, level_id))
}

/// Build the strategy for practicing a single level.
///
/// Two-digit levels always use the composite drill. Otherwise `requested`
/// overrides the level's own preference.
pub fn create_strategy(
  level: Arc<dyn Level>,
  requested: Option<ExerciseStrategy>,
  mastery: &MasteryMap,
  user_id: i64,
  clock: Arc<dyn Clock>,
  rng: Box<dyn RngCore + Send>,
) -> Result<Box<dyn ExerciseProvider>> {
  if let Some(two_digit) = level.as_two_digit() {
    let strategy = CompositeDrillStrategy::new(two_digit.clone(), mastery, user_id, clock, rng)?;
    return Ok(Box::new(strategy));
  }

  match requested.unwrap_or(level.strategy()) {
    ExerciseStrategy::Review => Ok(Box::new(ReviewStrategy::new(level, user_id, clock, rng)?)),
    ExerciseStrategy::Drill => Ok(Box::new(DrillStrategy::new(level, mastery, user_id, clock, rng)?)),
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use crate::clock::FixedClock;

  pub const NOW_MS: i64 = 1_700_000_000_000;

  pub fn seeded(seed: u64) -> Box<dyn RngCore + Send> {
    Box::new(StdRng::seed_from_u64(seed))
  }

  pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(NOW_MS))
  }

  pub fn record(fact_id: &str, strength: u8, last_tested_ms: i64) -> (String, FactMastery) {
    (
      fact_id.to_string(),
      FactMastery::new(fact_id, 1, "TEST").with_strength(strength, last_tested_ms),
    )
  }

  /// Every fact of `level` at `strength`, tested at `last_tested_ms`
  pub fn all_at(level: &dyn Level, strength: u8, last_tested_ms: i64) -> MasteryMap {
    level
      .all_fact_ids()
      .iter()
      .map(|id| record(id, strength, last_tested_ms))
      .collect()
  }

  /// Answer `exercise` as the learner would, correct or not
  pub fn answered(mut exercise: Exercise, correct: bool, elapsed_ms: u64) -> Exercise {
    let expected = exercise.equation.expected_result();
    exercise.solve(if correct { expected } else { expected + 1 }, Some(elapsed_ms));
    exercise
  }
}

#[cfg(test)]
mod tests {
  use super::test_support::*;
  use super::*;
  use crate::curriculum::Curriculum;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn test_soft_recency_prefers_front() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut counts = [0usize; 4];
    for _ in 0..4000 {
      counts[soft_recency_index(4, &mut rng).unwrap()] += 1;
    }
    // Expected shares: 1/2, 1/4, 1/8, 1/8
    assert!(counts[0] > counts[1]);
    assert!(counts[1] > counts[2]);
    assert!(counts[3] > 0);
    assert!((1700..2300).contains(&counts[0]), "{:?}", counts);
  }

  #[test]
  fn test_soft_recency_edge_cases() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(soft_recency_index(0, &mut rng), None);
    assert_eq!(soft_recency_index(1, &mut rng), Some(0));
  }

  #[test]
  fn test_factory_picks_strategy_by_level() {
    let curriculum = Curriculum::standard();
    let mastery = MasteryMap::new();
    let build = |id: &str, requested| {
      let level = curriculum.level(id).unwrap().clone();
      create_strategy(level, requested, &mastery, 1, clock(), seeded(1)).unwrap().name()
    };

    assert_eq!(build("ADD_SUM_5", None), "drill");
    assert_eq!(build("MUL_REVIEW_2_5_10", None), "review");
    assert_eq!(build("ADD_TWO_DIGIT_CARRY", None), "composite_drill");
    assert_eq!(build("ADD_SUM_5", Some(ExerciseStrategy::Review)), "review");
    assert_eq!(build("MUL_REVIEW_2_5_10", Some(ExerciseStrategy::Drill)), "drill");
    assert_eq!(build("SUB_TWO_DIGIT_BORROW", Some(ExerciseStrategy::Review)), "composite_drill");
  }
}
