//! Stateless spaced review of one level.
//!
//! Every pick is recomputed from mastery: a fact's urgency is the time since
//! it was last tested divided by the ideal interval for its strength.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::RngCore;

use super::{mastery_or_new, ExerciseProvider};
use crate::clock::Clock;
use crate::config;
use crate::curriculum::Level;
use crate::domain::{Exercise, FactMastery, MasteryMap, MASTERY_STRENGTH};
use crate::error::{EngineError, Result};
use crate::srs::moving_average_ms;

/// Urgency given to facts that have never been tested
const UNSEEN_URGENCY: f64 = 1.0;

/// Correct answers climb by one until mastered, a wrong answer resets to 1
fn next_strength(current: u8, was_correct: bool) -> u8 {
  match was_correct {
    false => 1,
    true if current >= MASTERY_STRENGTH => current,
    true => current + 1,
  }
}

pub struct ReviewStrategy {
  level: Arc<dyn Level>,
  user_id: i64,
  clock: Arc<dyn Clock>,
  rng: Box<dyn RngCore + Send>,
}

impl ReviewStrategy {
  pub fn new(
    level: Arc<dyn Level>,
    user_id: i64,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Result<Self> {
    if level.all_fact_ids().is_empty() {
      return Err(EngineError::EmptyLevel(level.id().to_string()));
    }
    Ok(Self { level, user_id, clock, rng })
  }

  /// Due facts weighted by urgency, falling back to unseen facts and then
  /// to the least recently tested one.
  fn candidates<'a>(&'a self, mastery: &MasteryMap) -> Vec<(&'a str, f64)> {
    let now_ms = self.clock.now_ms();
    let fact_ids = self.level.all_fact_ids();

    let due: Vec<(&str, f64)> = fact_ids
      .iter()
      .filter_map(|id| mastery.get(id).map(|m| (id.as_str(), urgency(m, now_ms))))
      .filter(|(_, urgency)| *urgency > config::REVIEW_URGENCY_THRESHOLD)
      .collect();
    if !due.is_empty() {
      return due;
    }

    let unseen: Vec<(&str, f64)> = fact_ids
      .iter()
      .filter(|id| !mastery.contains_key(*id))
      .map(|id| (id.as_str(), UNSEEN_URGENCY))
      .collect();
    if !unseen.is_empty() {
      return unseen;
    }

    fact_ids
      .iter()
      .min_by_key(|id| mastery.get(*id).map_or(i64::MIN, |m| m.last_tested_ms))
      .map(|id| vec![(id.as_str(), UNSEEN_URGENCY)])
      .unwrap_or_default()
  }
}

/// Elapsed time relative to the ideal interval for the fact's strength
pub fn urgency(mastery: &FactMastery, now_ms: i64) -> f64 {
  let elapsed = (now_ms - mastery.last_tested_ms).max(0);
  elapsed as f64 / config::review_interval_ms(mastery.strength) as f64
}

impl ExerciseProvider for ReviewStrategy {
  fn name(&self) -> &'static str {
    "review"
  }

  fn next_exercise(&mut self, mastery: &MasteryMap) -> Result<Option<Exercise>> {
    let candidates: Vec<(String, f64)> = self
      .candidates(mastery)
      .into_iter()
      .map(|(id, weight)| (id.to_string(), weight))
      .collect();

    let chosen = candidates
      .choose_weighted(&mut self.rng, |(_, weight)| *weight)
      .ok()
      .or_else(|| candidates.first())
      .ok_or_else(|| EngineError::EmptyLevel(self.level.id().to_string()))?;

    let exercise = self.level.create_exercise(&chosen.0, &mut *self.rng)?;
    Ok(Some(exercise))
  }

  fn record_attempt(
    &mut self,
    mastery: &mut MasteryMap,
    exercise: &Exercise,
    was_correct: bool,
  ) -> Result<Vec<FactMastery>> {
    let now_ms = self.clock.now_ms();
    let duration_ms = exercise.time_taken_ms.unwrap_or(0);

    let updated: Vec<FactMastery> = self
      .level
      .affected_fact_ids(exercise)
      .into_iter()
      .map(|fact_id| {
        let current = mastery_or_new(mastery, &fact_id, self.user_id, self.level.id());
        FactMastery {
          strength: next_strength(current.strength, was_correct),
          last_tested_ms: now_ms,
          avg_duration_ms: moving_average_ms(current.avg_duration_ms, duration_ms),
          level: self.level.id().to_string(),
          ..current
        }
      })
      .collect();

    for record in &updated {
      mastery.insert(record.fact_id.clone(), record.clone());
    }
    Ok(updated)
  }
}
