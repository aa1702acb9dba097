//! Speed classification of an answer relative to an operation-specific
//! baseline time.

use serde::{Deserialize, Serialize};

use crate::domain::Operation;

/// Ordered from slowest to fastest so badges compare naturally
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedBadge {
  None,
  Bronze,
  Silver,
  Gold,
}

impl SpeedBadge {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::None => "none",
      Self::Bronze => "bronze",
      Self::Silver => "silver",
      Self::Gold => "gold",
    }
  }
}

const GOLD_RATIO: f64 = 0.5;
const SILVER_RATIO: f64 = 0.7;
const BRONZE_RATIO: f64 = 1.0;

pub fn speed_badge(operation: Operation, op1: i32, op2: i32, duration_ms: u64) -> SpeedBadge {
  if duration_ms == 0 {
    return SpeedBadge::None;
  }

  let ratio = duration_ms as f64 / speed_threshold_ms(operation, op1, op2) as f64;
  if ratio <= GOLD_RATIO {
    SpeedBadge::Gold
  } else if ratio <= SILVER_RATIO {
    SpeedBadge::Silver
  } else if ratio <= BRONZE_RATIO {
    SpeedBadge::Bronze
  } else {
    SpeedBadge::None
  }
}

/// Baseline answer time for a fact, in milliseconds
pub fn speed_threshold_ms(operation: Operation, op1: i32, op2: i32) -> u64 {
  match operation {
    Operation::Addition => {
      if op1 < 10 && op2 < 10 && op1 + op2 < 10 {
        2500 // single digit, no carry
      } else if op1 < 10 && op2 < 10 {
        4000 // single digit, carry
      } else if op1 < 100 && op2 < 100 && (op1 % 10) + (op2 % 10) < 10 {
        7000 // double digit, no carry
      } else {
        10000
      }
    }
    Operation::Subtraction => {
      if op1 < 10 && op2 < 10 {
        3000
      } else if op1 < 100 && op2 < 100 && (op1 % 10) >= (op2 % 10) {
        7500 // double digit, no borrow
      } else {
        10500
      }
    }
    Operation::Multiplication => {
      if op1 <= 10 && op2 <= 10 {
        3000
      } else if op1 <= 12 || op2 <= 12 {
        5000
      } else {
        12000
      }
    }
    Operation::Division => 4000,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_duration_has_no_badge() {
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 0), SpeedBadge::None);
  }

  #[test]
  fn test_single_digit_addition_buckets() {
    // Threshold 2500ms
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 1000), SpeedBadge::Gold);
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 1250), SpeedBadge::Gold);
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 1750), SpeedBadge::Silver);
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 2000), SpeedBadge::Bronze);
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 2500), SpeedBadge::Bronze);
    assert_eq!(speed_badge(Operation::Addition, 2, 3, 3000), SpeedBadge::None);
  }

  #[test]
  fn test_addition_thresholds() {
    assert_eq!(speed_threshold_ms(Operation::Addition, 4, 5), 2500);
    assert_eq!(speed_threshold_ms(Operation::Addition, 7, 8), 4000);
    assert_eq!(speed_threshold_ms(Operation::Addition, 23, 45), 7000);
    assert_eq!(speed_threshold_ms(Operation::Addition, 28, 45), 10000);
  }

  #[test]
  fn test_subtraction_thresholds() {
    assert_eq!(speed_threshold_ms(Operation::Subtraction, 9, 4), 3000);
    assert_eq!(speed_threshold_ms(Operation::Subtraction, 75, 23), 7500);
    assert_eq!(speed_threshold_ms(Operation::Subtraction, 72, 28), 10500);
  }

  #[test]
  fn test_multiplication_and_division_thresholds() {
    assert_eq!(speed_threshold_ms(Operation::Multiplication, 7, 8), 3000);
    assert_eq!(speed_threshold_ms(Operation::Multiplication, 12, 7), 5000);
    assert_eq!(speed_threshold_ms(Operation::Multiplication, 13, 14), 12000);
    assert_eq!(speed_threshold_ms(Operation::Division, 56, 8), 4000);
  }

  #[test]
  fn test_badges_are_ordered() {
    assert!(SpeedBadge::Gold > SpeedBadge::Silver);
    assert!(SpeedBadge::Silver > SpeedBadge::Bronze);
    assert!(SpeedBadge::Bronze > SpeedBadge::None);
  }
}
