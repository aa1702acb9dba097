use serde::{Deserialize, Serialize};

use super::Equation;
use crate::srs::{speed_badge, SpeedBadge};

/// Reserved answer value meaning the input could not be read
pub const NOT_RECOGNIZED: i32 = -1000;

/// One presentation of an equation to the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  pub equation: Equation,
  pub submitted_solution: Option<i32>,
  pub solved: bool,
  pub time_taken_ms: Option<u64>,
  pub speed_badge: SpeedBadge,
}

impl Exercise {
  pub fn new(equation: Equation) -> Self {
    Self {
      equation,
      submitted_solution: None,
      solved: false,
      time_taken_ms: None,
      speed_badge: SpeedBadge::None,
    }
  }

  /// Record an answer. Returns whether it matches the expected result.
  ///
  /// The unrecognized sentinel is stored but leaves the exercise unsolved.
  pub fn solve(&mut self, solution: i32, elapsed_ms: Option<u64>) -> bool {
    self.submitted_solution = Some(solution);
    if solution == NOT_RECOGNIZED {
      return false;
    }
    self.solved = true;
    self.time_taken_ms = elapsed_ms;
    if let Some(ms) = elapsed_ms {
      let (op, op1, op2) = self.equation.fact();
      self.speed_badge = speed_badge(op, op1, op2, ms);
    }
    self.is_correct()
  }

  pub fn is_correct(&self) -> bool {
    match self.submitted_solution {
      Some(NOT_RECOGNIZED) | None => false,
      Some(value) => self.solved && value == self.equation.expected_result(),
    }
  }

  /// Question text reflecting the answer state: `=` becomes `≠` for wrong answers
  pub fn equation_string(&self) -> String {
    if !self.solved {
      return self.equation.question();
    }
    let solved = self.equation.question_as_solved(self.submitted_solution);
    if self.is_correct() {
      solved
    } else {
      solved.replacen('=', "≠", 1)
    }
  }

  pub fn fact_id(&self) -> String {
    self.equation.fact_id()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn addition(a: i32, b: i32) -> Exercise {
    Exercise::new(Equation::Addition { a, b })
  }

  #[test]
  fn test_new_exercise_is_unsolved() {
    let exercise = addition(2, 3);
    assert!(!exercise.solved);
    assert!(!exercise.is_correct());
    assert_eq!(exercise.speed_badge, SpeedBadge::None);
    assert_eq!(exercise.equation_string(), "2 + 3 = ?");
  }

  #[test]
  fn test_solve_correct() {
    let mut exercise = addition(2, 3);
    assert!(exercise.solve(5, Some(1000)));
    assert!(exercise.solved);
    assert_eq!(exercise.time_taken_ms, Some(1000));
    assert_eq!(exercise.speed_badge, SpeedBadge::Gold);
    assert_eq!(exercise.equation_string(), "2 + 3 = 5");
  }

  #[test]
  fn test_solve_wrong_still_marks_solved() {
    let mut exercise = addition(2, 3);
    assert!(!exercise.solve(6, Some(1000)));
    assert!(exercise.solved);
    assert!(!exercise.is_correct());
    assert_eq!(exercise.equation_string(), "2 + 3 ≠ 6");
  }

  #[test]
  fn test_not_recognized_leaves_exercise_unsolved() {
    let mut exercise = addition(2, 3);
    assert!(!exercise.solve(NOT_RECOGNIZED, Some(1000)));
    assert!(!exercise.solved);
    assert_eq!(exercise.submitted_solution, Some(NOT_RECOGNIZED));
    assert_eq!(exercise.speed_badge, SpeedBadge::None);
  }

  #[test]
  fn test_solve_without_timing_keeps_no_badge() {
    let mut exercise = addition(2, 3);
    assert!(exercise.solve(5, None));
    assert_eq!(exercise.speed_badge, SpeedBadge::None);
  }

  #[test]
  fn test_wrong_subtraction_marks_inequality() {
    let mut exercise = Exercise::new(Equation::Subtraction { a: 10, b: 4 });
    exercise.solve(5, None);
    assert_eq!(exercise.equation_string(), "10 - 4 ≠ 5");
  }

  #[test]
  fn test_fact_id_handles_zero_values() {
    assert_eq!(addition(0, 0).fact_id(), "0 + 0 = ?");
  }
}
