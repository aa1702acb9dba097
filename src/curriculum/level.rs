//! The `Level` abstraction: one teachable skill and the closed set of facts
//! it is responsible for.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::two_digit::TwoDigitComputationLevel;
use crate::domain::{Equation, Exercise, MasteryMap, Operation};
use crate::error::Result;

/// How a level prefers to be practiced when chosen on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseStrategy {
  Drill,
  Review,
}

impl ExerciseStrategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Drill => "DRILL",
      Self::Review => "REVIEW",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s.to_ascii_uppercase().as_str() {
      "DRILL" => Some(Self::Drill),
      "REVIEW" => Some(Self::Review),
      _ => None,
    }
  }
}

pub trait Level: Send + Sync + std::fmt::Debug {
  fn id(&self) -> &str;

  fn operation(&self) -> Operation;

  fn prerequisites(&self) -> &[String];

  fn strategy(&self) -> ExerciseStrategy;

  fn generate_exercise(&self, rng: &mut dyn RngCore) -> Exercise;

  /// Every atomic fact this level accounts mastery for
  fn all_fact_ids(&self) -> &[String];

  /// Build an exercise practicing `fact_id`.
  fn create_exercise(&self, fact_id: &str, _rng: &mut dyn RngCore) -> Result<Exercise> {
    Ok(Exercise::new(Equation::parse(fact_id)?))
  }

  /// Fact ids whose mastery an answer to `exercise` should update.
  ///
  /// Plain levels update the exercise's own fact only; composite levels
  /// also update the component facts the exercise is made of.
  fn affected_fact_ids(&self, exercise: &Exercise) -> Vec<String> {
    vec![exercise.fact_id()]
  }

  /// Whether this level could have produced `equation`.
  ///
  /// Two-digit problems belong to two-digit levels only, even when their
  /// text matches a single-digit fact such as `15 - 12 = ?`.
  fn recognizes(&self, equation: &Equation) -> bool {
    if matches!(equation, Equation::TwoDigit { .. }) {
      return false;
    }
    let fact_id = equation.fact_id();
    self.all_fact_ids().iter().any(|id| *id == fact_id)
  }

  /// Weighted share of the level's facts that are learned, in `0.0..=1.0`.
  ///
  /// Strength 4 counts half, strength 5 and above counts fully.
  fn calculate_progress(&self, mastery: &MasteryMap) -> f32 {
    let fact_ids = self.all_fact_ids();
    if fact_ids.is_empty() {
      return 0.0;
    }
    let total: f64 = fact_ids
      .iter()
      .map(|id| match mastery.get(id).map_or(0, |m| m.strength) {
        0 => 0.0,
        1..=3 => 0.1,
        4 => 0.5,
        _ => 1.0,
      })
      .sum();
    (total / fact_ids.len() as f64) as f32
  }

  fn calculate_stars(&self, mastery: &MasteryMap) -> u8 {
    (self.calculate_progress(mastery) * 3.0) as u8
  }

  fn is_mastered(&self, mastery: &MasteryMap) -> bool {
    let fact_ids = self.all_fact_ids();
    !fact_ids.is_empty()
      && fact_ids
        .iter()
        .all(|id| mastery.get(id).is_some_and(|m| m.is_mastered()))
  }

  fn as_two_digit(&self) -> Option<&TwoDigitComputationLevel> {
    None
  }
}
