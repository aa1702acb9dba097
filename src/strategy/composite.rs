//! Working-set drill over two-digit problems.
//!
//! Candidates are literal problems, one per pairing of a ones-column and a
//! tens-column fact, ranked by the average strength of the two columns.
//! Each answer updates both column facts and the problem itself through the
//! speed-gated spaced repetition rule.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{mastery_or_new, soft_recency_index, ExerciseProvider};
use crate::clock::Clock;
use crate::config;
use crate::curriculum::{ColumnFacts, Level, TwoDigitComputationLevel};
use crate::domain::mastery::strength_of;
use crate::domain::{Equation, Exercise, FactMastery, MasteryMap, MASTERY_STRENGTH};
use crate::error::{EngineError, Result};
use crate::srs::update_mastery;

pub struct CompositeDrillStrategy {
  level: TwoDigitComputationLevel,
  /// Problem fact id with the columns it is made of
  combinations: Vec<(String, ColumnFacts)>,
  user_id: i64,
  working_set_size: usize,
  working_set: Vec<String>,
  clock: Arc<dyn Clock>,
  rng: Box<dyn RngCore + Send>,
}

fn column_average(mastery: &MasteryMap, columns: &ColumnFacts) -> f64 {
  (strength_of(mastery, &columns.ones) as f64 + strength_of(mastery, &columns.tens) as f64) / 2.0
}

impl CompositeDrillStrategy {
  pub fn new(
    level: TwoDigitComputationLevel,
    mastery: &MasteryMap,
    user_id: i64,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Result<Self> {
    let combinations: Vec<(String, ColumnFacts)> = level
      .column_combinations()
      .into_iter()
      .map(|(columns, equation)| (equation.fact_id(), columns))
      .collect();
    if combinations.is_empty() {
      return Err(EngineError::EmptyLevel(level.id().to_string()));
    }

    let mut strategy = Self {
      level,
      combinations,
      user_id,
      working_set_size: config::WORKING_SET_SIZE,
      working_set: Vec::new(),
      clock,
      rng,
    };
    strategy.build_working_set(mastery);
    Ok(strategy)
  }

  fn target_size(&self) -> usize {
    self.working_set_size.min(self.combinations.len())
  }

  /// Problems outside the working set, weakest first, ties in random order
  fn ranked(&mut self, mastery: &MasteryMap) -> Vec<(f64, String)> {
    let mut ranked: Vec<(f64, String)> = self
      .combinations
      .iter()
      .filter(|(problem, _)| !self.working_set.contains(problem))
      .map(|(problem, columns)| (column_average(mastery, columns), problem.clone()))
      .collect();
    ranked.shuffle(&mut self.rng);
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked
  }

  fn build_working_set(&mut self, mastery: &MasteryMap) {
    self.working_set.clear();
    let size = self.target_size();
    self.working_set = self.ranked(mastery).into_iter().take(size).map(|(_, id)| id).collect();
    tracing::debug!(level = self.level.id(), working_set = ?self.working_set, "Built composite working set");
  }

  /// Add one of the weakest problems outside the working set
  fn backfill(&mut self, mastery: &MasteryMap) {
    let ranked = self.ranked(mastery);
    let Some(weakest) = ranked.first().map(|(avg, _)| *avg) else {
      return;
    };
    let ties: Vec<String> = ranked
      .into_iter()
      .take_while(|(avg, _)| *avg == weakest)
      .map(|(_, id)| id)
      .collect();
    if let Some(index) = soft_recency_index(ties.len(), &mut *self.rng) {
      self.working_set.push(ties[index].clone());
    }
  }

  fn level_mastered(&self, mastery: &MasteryMap) -> bool {
    self
      .level
      .all_fact_ids()
      .iter()
      .all(|id| strength_of(mastery, id) >= MASTERY_STRENGTH)
  }
}

impl ExerciseProvider for CompositeDrillStrategy {
  fn name(&self) -> &'static str {
    "composite_drill"
  }

  fn next_exercise(&mut self, mastery: &MasteryMap) -> Result<Option<Exercise>> {
    if self.working_set.is_empty() || self.level_mastered(mastery) {
      self.build_working_set(mastery);
    }
    let Some(index) = soft_recency_index(self.working_set.len(), &mut *self.rng) else {
      return Err(EngineError::EmptyLevel(self.level.id().to_string()));
    };
    let problem = self.working_set.remove(index);
    self.working_set.push(problem.clone());

    let exercise = self.level.create_exercise(&problem, &mut *self.rng)?;
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

    let mut updated = Vec::new();
    for fact_id in self.level.affected_fact_ids(exercise) {
      let current = mastery_or_new(mastery, &fact_id, self.user_id, self.level.id());
      let mut record = update_mastery(&current, was_correct, duration_ms, exercise.speed_badge, now_ms);
      record.level = self.level.id().to_string();
      mastery.insert(fact_id, record.clone());
      updated.push(record);
    }

    let problem = exercise.fact_id();
    if !was_correct {
      self.working_set.retain(|id| *id != problem);
      self.working_set.insert(0, problem);
      self.working_set.truncate(self.target_size());
      return Ok(updated);
    }

    if let Equation::TwoDigit { op1, op2, .. } = exercise.equation {
      let average = column_average(mastery, &self.level.column_facts(op1, op2));
      let before = self.working_set.len();
      if average >= config::REPLACEABLE_STRENGTH as f64 {
        self.working_set.retain(|id| *id != problem);
      }
      if self.working_set.len() < before {
        tracing::debug!(problem = %problem, average, "Composite problem learned");
        self.backfill(mastery);
      }
    }
    Ok(updated)
  }

  fn working_set(&self) -> &[String] {
    &self.working_set
  }
}
