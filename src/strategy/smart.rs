//! Mixed practice across a slice of the curriculum.
//!
//! The current level is the first unlocked, unmastered one. Most picks come
//! from it; the rest review a level that is already mastered.
//!
//! Within a level, the weakest practiced facts are drilled first and unseen
//! facts only top up that list, rather than sorting unseen facts as
//! strength 0 ahead of everything else.

use std::sync::Arc;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore};

use super::{mastery_or_new, ExerciseProvider};
use crate::clock::Clock;
use crate::config;
use crate::curriculum::Level;
use crate::domain::{Equation, Exercise, FactMastery, MasteryMap, MASTERY_STRENGTH};
use crate::error::{EngineError, Result};
use crate::srs::moving_average_ms;

pub struct SmartPracticeStrategy {
  levels: Vec<Arc<dyn Level>>,
  user_id: i64,
  learning_probability: f64,
  /// Level the last exercise was drawn from
  last_level: Option<Arc<dyn Level>>,
  clock: Arc<dyn Clock>,
  rng: Box<dyn RngCore + Send>,
}

impl SmartPracticeStrategy {
  pub fn new(
    levels: Vec<Arc<dyn Level>>,
    user_id: i64,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Result<Self> {
    if levels.is_empty() {
      return Err(EngineError::EmptyCurriculum);
    }
    if let Some(empty) = levels.iter().find(|l| l.all_fact_ids().is_empty()) {
      return Err(EngineError::EmptyLevel(empty.id().to_string()));
    }
    Ok(Self {
      levels,
      user_id,
      learning_probability: config::LEARNING_PROBABILITY,
      last_level: None,
      clock,
      rng,
    })
  }

  /// A prerequisite outside this slice of levels counts as met
  fn is_unlocked(&self, level: &dyn Level, mastery: &MasteryMap) -> bool {
    level.prerequisites().iter().all(|prerequisite| {
      self
        .levels
        .iter()
        .find(|l| l.id() == prerequisite)
        .is_none_or(|l| l.is_mastered(mastery))
    })
  }

  /// Index of the first unlocked level that is not mastered, or the last
  /// level once everything is mastered
  pub fn current_level_index(&self, mastery: &MasteryMap) -> usize {
    self
      .levels
      .iter()
      .position(|l| self.is_unlocked(l.as_ref(), mastery) && !l.is_mastered(mastery))
      .unwrap_or(self.levels.len() - 1)
  }

  pub fn current_level(&self, mastery: &MasteryMap) -> &Arc<dyn Level> {
    &self.levels[self.current_level_index(mastery)]
  }

  fn choose_level(&mut self, mastery: &MasteryMap) -> Arc<dyn Level> {
    let current = self.current_level_index(mastery);
    let mastered: Vec<&Arc<dyn Level>> = self.levels[..current]
      .iter()
      .filter(|l| l.is_mastered(mastery))
      .collect();

    if mastered.is_empty() || self.rng.random_bool(self.learning_probability) {
      return self.levels[current].clone();
    }
    match mastered.choose(&mut self.rng) {
      Some(&level) => Arc::clone(level),
      None => self.levels[current].clone(),
    }
  }

  /// The weakest seen facts of `level`, topped up with random unseen ones
  fn weakest_candidates(&mut self, level: &dyn Level, mastery: &MasteryMap) -> Result<Vec<String>> {
    let mut practiced = Vec::new();
    let mut unseen = Vec::new();
    for id in level.all_fact_ids() {
      match mastery.get(id) {
        Some(m) if m.strength < MASTERY_STRENGTH => {
          let (_, op1, op2) = Equation::parse(id)?.fact();
          practiced.push((m.strength, m.last_tested_ms, op1, op2, id.clone()));
        }
        Some(_) => {}
        None => unseen.push(id.clone()),
      }
    }

    practiced.sort();
    let mut candidates: Vec<String> = practiced
      .into_iter()
      .take(config::SMART_CANDIDATE_COUNT)
      .map(|(.., id)| id)
      .collect();

    let missing = config::SMART_CANDIDATE_COUNT.saturating_sub(candidates.len());
    unseen.shuffle(&mut self.rng);
    candidates.extend(unseen.into_iter().take(missing));

    if candidates.is_empty() {
      // Fully mastered, e.g. a review pick
      candidates = level.all_fact_ids().to_vec();
    }
    Ok(candidates)
  }
}

impl ExerciseProvider for SmartPracticeStrategy {
  fn name(&self) -> &'static str {
    "smart_practice"
  }

  fn next_exercise(&mut self, mastery: &MasteryMap) -> Result<Option<Exercise>> {
    let level = self.choose_level(mastery);
    let candidates = self.weakest_candidates(level.as_ref(), mastery)?;
    let fact_id = candidates
      .choose(&mut self.rng)
      .ok_or_else(|| EngineError::EmptyLevel(level.id().to_string()))?;
    let exercise = level.create_exercise(fact_id, &mut *self.rng)?;
    self.last_level = Some(level);
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
    let owner = self
      .last_level
      .as_ref()
      .filter(|l| l.recognizes(&exercise.equation))
      .or_else(|| self.levels.iter().find(|l| l.recognizes(&exercise.equation)));
    let (level_id, fact_ids) = match owner {
      Some(level) => (level.id().to_string(), level.affected_fact_ids(exercise)),
      None => (String::new(), vec![exercise.fact_id()]),
    };

    let mut updated = Vec::with_capacity(fact_ids.len());
    for fact_id in fact_ids {
      let current = mastery_or_new(mastery, &fact_id, self.user_id, &level_id);
      let strength = match was_correct {
        false => 1,
        true if current.strength >= MASTERY_STRENGTH => current.strength,
        true => current.strength + 1,
      };
      let record = FactMastery {
        strength,
        last_tested_ms: now_ms,
        avg_duration_ms: moving_average_ms(current.avg_duration_ms, duration_ms),
        level: level_id.clone(),
        ..current
      };
      mastery.insert(fact_id, record.clone());
      updated.push(record);
    }
    Ok(updated)
  }
}
