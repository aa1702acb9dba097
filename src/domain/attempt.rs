use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Exercise, Operation, NOT_RECOGNIZED};
use crate::srs::SpeedBadge;

/// A single answered exercise, as stored in the attempt history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAttempt {
  pub id: i64,
  pub user_id: i64,
  pub timestamp: DateTime<Utc>,
  pub problem_text: String,
  pub operation: Operation,
  pub correct_answer: i32,
  pub submitted_answer: i32,
  pub was_correct: bool,
  pub duration_ms: u64,
}

impl ExerciseAttempt {
  pub fn from_exercise(
    user_id: i64,
    exercise: &Exercise,
    submitted_answer: i32,
    duration_ms: u64,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      id: 0,
      user_id,
      timestamp,
      problem_text: exercise.equation.question(),
      operation: exercise.equation.operation(),
      correct_answer: exercise.equation.expected_result(),
      submitted_answer,
      was_correct: exercise.is_correct(),
      duration_ms,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
  Correct,
  Incorrect,
  NotRecognized,
}

impl ResultStatus {
  pub fn of(exercise: &Exercise) -> Self {
    match exercise.submitted_solution {
      Some(NOT_RECOGNIZED) | None => Self::NotRecognized,
      Some(_) if exercise.is_correct() => Self::Correct,
      Some(_) => Self::Incorrect,
    }
  }
}

/// Feedback for one answered exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDescription {
  pub equation: String,
  pub status: ResultStatus,
  pub elapsed_ms: u64,
  pub speed_badge: SpeedBadge,
}

impl ResultDescription {
  pub fn of(exercise: &Exercise) -> Self {
    Self {
      equation: exercise.equation_string(),
      status: ResultStatus::of(exercise),
      elapsed_ms: exercise.time_taken_ms.unwrap_or(0),
      speed_badge: exercise.speed_badge,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarProgress {
  pub initial_stars: u8,
  pub final_stars: u8,
}

/// Everything the caller needs to render the end of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
  pub results: Vec<ResultDescription>,
  pub star_progress: Option<StarProgress>,
}

impl SessionResult {
  pub fn correct_count(&self) -> usize {
    self
      .results
      .iter()
      .filter(|r| r.status == ResultStatus::Correct)
      .count()
  }
}
