//! Working-set drill over a single level.
//!
//! Facts move through three tiers: L1 learning (strength 0..=2), L2
//! consolidating (3..=4) and L3 fluent (5). A small working set holds the
//! weakest facts. Two consecutive correct answers lift a learning fact to
//! L2; becoming fluent additionally requires the previous attempt to be at
//! least [`config::MIN_SESSION_SPACING_MS`] old, so it cannot happen within
//! one sitting.

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{mastery_or_new, soft_recency_index, ExerciseProvider};
use crate::clock::Clock;
use crate::config;
use crate::curriculum::Level;
use crate::domain::mastery::{last_tested_of, strength_of};
use crate::domain::{Exercise, FactMastery, MasteryMap, MASTERY_STRENGTH};
use crate::error::{EngineError, Result};
use crate::srs::moving_average_ms;

pub struct DrillStrategy {
  level: Arc<dyn Level>,
  user_id: i64,
  working_set_size: usize,
  working_set: Vec<String>,
  consecutive_correct: HashMap<String, u32>,
  clock: Arc<dyn Clock>,
  rng: Box<dyn RngCore + Send>,
}

impl DrillStrategy {
  pub fn new(
    level: Arc<dyn Level>,
    mastery: &MasteryMap,
    user_id: i64,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Result<Self> {
    Self::with_working_set_size(level, mastery, config::WORKING_SET_SIZE, user_id, clock, rng)
  }

  pub fn with_working_set_size(
    level: Arc<dyn Level>,
    mastery: &MasteryMap,
    working_set_size: usize,
    user_id: i64,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Result<Self> {
    if level.all_fact_ids().is_empty() {
      return Err(EngineError::EmptyLevel(level.id().to_string()));
    }
    let mut strategy = Self {
      level,
      user_id,
      working_set_size: working_set_size.max(1),
      working_set: Vec::new(),
      consecutive_correct: HashMap::new(),
      clock,
      rng,
    };
    strategy.build_working_set(mastery);
    Ok(strategy)
  }

  fn target_size(&self) -> usize {
    self.working_set_size.min(self.level.all_fact_ids().len())
  }

  /// L1 facts, then L2 oldest first, then unseen, then a shuffled sample of
  /// fluent facts.
  fn build_working_set(&mut self, mastery: &MasteryMap) {
    let mut learning = Vec::new();
    let mut consolidating = Vec::new();
    let mut unseen = Vec::new();
    let mut fluent = Vec::new();

    for id in self.level.all_fact_ids() {
      match mastery.get(id) {
        None => unseen.push(id.clone()),
        Some(m) if m.strength < config::CONSOLIDATING_STRENGTH => learning.push(id.clone()),
        Some(m) if m.strength < MASTERY_STRENGTH => consolidating.push(id.clone()),
        Some(_) => fluent.push(id.clone()),
      }
    }
    consolidating.sort_by_key(|id| last_tested_of(mastery, id));
    fluent.shuffle(&mut self.rng);

    self.working_set = learning
      .into_iter()
      .chain(consolidating)
      .chain(unseen)
      .chain(fluent)
      .take(self.target_size())
      .collect();

    tracing::debug!(level = self.level.id(), working_set = ?self.working_set, "Built drill working set");
  }

  fn level_mastered(&self, mastery: &MasteryMap) -> bool {
    self
      .level
      .all_fact_ids()
      .iter()
      .all(|id| strength_of(mastery, id) >= MASTERY_STRENGTH)
  }

  /// Replace the working set with a fresh random sample of the level
  fn resample(&mut self) {
    let mut facts = self.level.all_fact_ids().to_vec();
    facts.shuffle(&mut self.rng);
    facts.truncate(self.target_size());
    self.working_set = facts;
  }

  /// Add the weakest fact outside the working set: lowest strength first,
  /// then oldest, with a soft bias among those ties.
  fn backfill(&mut self, mastery: &MasteryMap) {
    let mut outside: Vec<&String> = self
      .level
      .all_fact_ids()
      .iter()
      .filter(|id| !self.working_set.contains(id))
      .collect();
    let Some(weakest) = outside.iter().map(|id| strength_of(mastery, id)).min() else {
      return;
    };
    outside.retain(|id| strength_of(mastery, id) == weakest);
    outside.sort_by_key(|id| last_tested_of(mastery, id));

    if let Some(index) = soft_recency_index(outside.len(), &mut *self.rng) {
      let chosen = outside[index].clone();
      tracing::debug!(level = self.level.id(), fact = %chosen, "Backfilled working set");
      self.working_set.push(chosen);
    }
  }

  fn next_strength(&mut self, current: &FactMastery, was_correct: bool, now_ms: i64) -> u8 {
    let counter = self.consecutive_correct.entry(current.fact_id.clone()).or_insert(0);
    if !was_correct {
      *counter = 0;
      return 0;
    }

    let strength = current.strength;
    if strength < config::CONSOLIDATING_STRENGTH {
      *counter += 1;
      if *counter >= config::CONSECUTIVE_ANSWERS_FOR_PROMOTION {
        *counter = 0;
        config::CONSOLIDATING_STRENGTH
      } else {
        strength + 1
      }
    } else if strength + 1 < MASTERY_STRENGTH {
      strength + 1
    } else if strength < MASTERY_STRENGTH {
      // Only a previous session's attempt counts towards fluency
      if now_ms - current.last_tested_ms >= config::MIN_SESSION_SPACING_MS {
        MASTERY_STRENGTH
      } else {
        strength
      }
    } else {
      strength
    }
  }
}

impl ExerciseProvider for DrillStrategy {
  fn name(&self) -> &'static str {
    "drill"
  }

  fn next_exercise(&mut self, mastery: &MasteryMap) -> Result<Option<Exercise>> {
    // Nothing left to learn: keep sampling the level for maintenance
    if self.level_mastered(mastery) {
      self.resample();
    } else if self.working_set.is_empty() {
      self.build_working_set(mastery);
    }

    let Some(index) = soft_recency_index(self.working_set.len(), &mut *self.rng) else {
      return Err(EngineError::EmptyLevel(self.level.id().to_string()));
    };
    let fact_id = self.working_set.remove(index);
    self.working_set.push(fact_id.clone());

    let exercise = self.level.create_exercise(&fact_id, &mut *self.rng)?;
    Ok(Some(exercise))
  }

  fn record_attempt(
    &mut self,
    mastery: &mut MasteryMap,
    exercise: &Exercise,
    was_correct: bool,
  ) -> Result<Vec<FactMastery>> {
    let fact_id = exercise.fact_id();
    let now_ms = self.clock.now_ms();
    let current = mastery_or_new(mastery, &fact_id, self.user_id, self.level.id());
    let strength = self.next_strength(&current, was_correct, now_ms);

    let updated = FactMastery {
      strength,
      last_tested_ms: now_ms,
      avg_duration_ms: moving_average_ms(current.avg_duration_ms, exercise.time_taken_ms.unwrap_or(0)),
      level: self.level.id().to_string(),
      ..current.clone()
    };
    mastery.insert(fact_id.clone(), updated.clone());

    if !was_correct {
      tracing::debug!(fact = %fact_id, from = current.strength, "Drill demotion");
      self.working_set.retain(|id| *id != fact_id);
      self.working_set.insert(0, fact_id);
      self.working_set.truncate(self.target_size());
    } else if strength >= config::REPLACEABLE_STRENGTH {
      if strength > current.strength {
        tracing::debug!(fact = %fact_id, from = current.strength, to = strength, "Drill promotion");
      }
      let before = self.working_set.len();
      self.working_set.retain(|id| *id != fact_id);
      if self.working_set.len() < before {
        self.backfill(mastery);
      }
    }

    Ok(vec![updated])
  }

  fn working_set(&self) -> &[String] {
    &self.working_set
  }
}
