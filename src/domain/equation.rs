//! Arithmetic relations presented to the learner.
//!
//! Every equation renders its question with a `?` at the unknown position,
//! knows its expected result, and maps to a canonical `(operation, op1, op2)`
//! fact plus a stable fact identifier used as the mastery key.

use serde::{Deserialize, Serialize};

use super::Operation;

/// Which operand of a missing-addend equation is hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
  First,
  Second,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactIdError {
  #[error("malformed fact id: {0:?}")]
  Malformed(String),

  #[error("fact id {0:?} does not describe a valid equation")]
  Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equation {
  Addition { a: i32, b: i32 },
  Subtraction { a: i32, b: i32 },
  Multiplication { a: i32, b: i32 },
  Division { a: i32, b: i32 },
  /// `known + ? = result` or `? + known = result`
  MissingAddend { known: i32, result: i32, slot: Slot },
  /// `minuend - ? = difference`
  MissingSubtrahend { minuend: i32, difference: i32 },
  /// A two-digit addition or subtraction built from a ones-column and a
  /// tens-column component fact
  TwoDigit { operation: Operation, op1: i32, op2: i32 },
}

impl Equation {
  pub fn question(&self) -> String {
    self.render(Operation::symbol, "?")
  }

  pub fn expected_result(&self) -> i32 {
    match *self {
      Self::Addition { a, b } => a + b,
      Self::Subtraction { a, b } => a - b,
      Self::Multiplication { a, b } => a * b,
      Self::Division { a, b } => Operation::Division.apply(a, b),
      Self::MissingAddend { known, result, .. } => result - known,
      Self::MissingSubtrahend { minuend, difference } => minuend - difference,
      Self::TwoDigit { operation, op1, op2 } => operation.apply(op1, op2),
    }
  }

  /// Question with `submitted` written into the unknown slot.
  pub fn question_as_solved(&self, submitted: Option<i32>) -> String {
    match submitted {
      Some(value) => self.render(Operation::symbol, &value.to_string()),
      None => self.question(),
    }
  }

  /// Canonical `(operation, op1, op2)` triple, with missing operands filled in
  pub fn fact(&self) -> (Operation, i32, i32) {
    match *self {
      Self::Addition { a, b } => (Operation::Addition, a, b),
      Self::Subtraction { a, b } => (Operation::Subtraction, a, b),
      Self::Multiplication { a, b } => (Operation::Multiplication, a, b),
      Self::Division { a, b } => (Operation::Division, a, b),
      Self::MissingAddend { known, result, slot } => match slot {
        Slot::Second => (Operation::Addition, known, result - known),
        Slot::First => (Operation::Addition, result - known, known),
      },
      Self::MissingSubtrahend { minuend, difference } => {
        (Operation::Subtraction, minuend, minuend - difference)
      }
      Self::TwoDigit { operation, op1, op2 } => (operation, op1, op2),
    }
  }

  pub fn operation(&self) -> Operation {
    self.fact().0
  }

  pub fn fact_id(&self) -> String {
    self.render(Operation::id_symbol, "?")
  }

  fn render(&self, symbol: fn(&Operation) -> &'static str, unknown: &str) -> String {
    match *self {
      Self::Addition { a, b } => binary(a, symbol(&Operation::Addition), b, unknown),
      Self::Subtraction { a, b } => binary(a, symbol(&Operation::Subtraction), b, unknown),
      Self::Multiplication { a, b } => binary(a, symbol(&Operation::Multiplication), b, unknown),
      Self::Division { a, b } => binary(a, symbol(&Operation::Division), b, unknown),
      Self::TwoDigit { operation, op1, op2 } => binary(op1, symbol(&operation), op2, unknown),
      Self::MissingAddend { known, result, slot } => match slot {
        Slot::Second => format!("{} + {} = {}", known, unknown, result),
        Slot::First => format!("{} + {} = {}", unknown, known, result),
      },
      Self::MissingSubtrahend { minuend, difference } => {
        format!("{} - {} = {}", minuend, unknown, difference)
      }
    }
  }

  /// Parse a fact identifier back into an equation.
  ///
  /// Accepts `a <op> b = ?` (op one of `+ - * /`), `a + ? = c`, `? + b = c`
  /// and `a - ? = c`.
  pub fn parse(fact_id: &str) -> Result<Self, FactIdError> {
    let malformed = || FactIdError::Malformed(fact_id.to_string());
    let tokens: Vec<&str> = fact_id.split_whitespace().collect();
    let [lhs, op, rhs, eq, result] = tokens.as_slice() else {
      return Err(malformed());
    };
    if *eq != "=" {
      return Err(malformed());
    }
    let operation = Operation::from_id_symbol(op).ok_or_else(malformed)?;
    let number = |s: &str| s.parse::<i32>().map_err(|_| malformed());

    let equation = match (*lhs, *rhs, *result) {
      (a, b, "?") => {
        let (a, b) = (number(a)?, number(b)?);
        match operation {
          Operation::Addition => Self::Addition { a, b },
          Operation::Subtraction => Self::Subtraction { a, b },
          Operation::Multiplication => Self::Multiplication { a, b },
          Operation::Division if b != 0 => Self::Division { a, b },
          Operation::Division => return Err(FactIdError::Invalid(fact_id.to_string())),
        }
      }
      ("?", known, result) if operation == Operation::Addition => Self::MissingAddend {
        known: number(known)?,
        result: number(result)?,
        slot: Slot::First,
      },
      (known, "?", result) if operation == Operation::Addition => Self::MissingAddend {
        known: number(known)?,
        result: number(result)?,
        slot: Slot::Second,
      },
      (minuend, "?", difference) if operation == Operation::Subtraction => {
        Self::MissingSubtrahend {
          minuend: number(minuend)?,
          difference: number(difference)?,
        }
      }
      _ => return Err(malformed()),
    };
    Ok(equation)
  }
}

fn binary(a: i32, symbol: &str, b: i32, unknown: &str) -> String {
  format!("{} {} {} = {}", a, symbol, b, unknown)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_addition_question_and_fact_id() {
    let eq = Equation::Addition { a: 5, b: 3 };
    assert_eq!(eq.question(), "5 + 3 = ?");
    assert_eq!(eq.fact_id(), "5 + 3 = ?");
    assert_eq!(eq.expected_result(), 8);
    assert_eq!(eq.question_as_solved(Some(8)), "5 + 3 = 8");
    assert_eq!(eq.question_as_solved(None), "5 + 3 = ?");
  }

  #[test]
  fn test_subtraction_solved_substitutes_result() {
    let eq = Equation::Subtraction { a: 10, b: 4 };
    assert_eq!(eq.question(), "10 - 4 = ?");
    assert_eq!(eq.question_as_solved(Some(6)), "10 - 4 = 6");
  }

  #[test]
  fn test_multiplication_uses_ascii_in_fact_id() {
    let eq = Equation::Multiplication { a: 7, b: 6 };
    assert_eq!(eq.question(), "7 × 6 = ?");
    assert_eq!(eq.fact_id(), "7 * 6 = ?");
    assert_eq!(eq.question_as_solved(Some(42)), "7 × 6 = 42");
  }

  #[test]
  fn test_division_uses_ascii_in_fact_id() {
    let eq = Equation::Division { a: 20, b: 5 };
    assert_eq!(eq.question(), "20 ÷ 5 = ?");
    assert_eq!(eq.fact_id(), "20 / 5 = ?");
    assert_eq!(eq.question_as_solved(Some(4)), "20 ÷ 5 = 4");
  }

  #[test]
  fn test_missing_addend_second_slot() {
    let eq = Equation::MissingAddend { known: 5, result: 12, slot: Slot::Second };
    assert_eq!(eq.question(), "5 + ? = 12");
    assert_eq!(eq.fact_id(), "5 + ? = 12");
    assert_eq!(eq.expected_result(), 7);
    assert_eq!(eq.question_as_solved(Some(7)), "5 + 7 = 12");
    assert_eq!(eq.fact(), (Operation::Addition, 5, 7));
  }

  #[test]
  fn test_missing_addend_first_slot() {
    let eq = Equation::MissingAddend { known: 3, result: 10, slot: Slot::First };
    assert_eq!(eq.question(), "? + 3 = 10");
    assert_eq!(eq.question_as_solved(Some(7)), "7 + 3 = 10");
    assert_eq!(eq.fact(), (Operation::Addition, 7, 3));
  }

  #[test]
  fn test_missing_subtrahend() {
    let eq = Equation::MissingSubtrahend { minuend: 10, difference: 4 };
    assert_eq!(eq.question(), "10 - ? = 4");
    assert_eq!(eq.expected_result(), 6);
    assert_eq!(eq.question_as_solved(Some(6)), "10 - 6 = 4");
    assert_eq!(eq.fact(), (Operation::Subtraction, 10, 6));
  }

  #[test]
  fn test_two_digit_formats() {
    let add = Equation::TwoDigit { operation: Operation::Addition, op1: 13, op2: 24 };
    assert_eq!(add.question(), "13 + 24 = ?");
    assert_eq!(add.question_as_solved(Some(37)), "13 + 24 = 37");
    assert_eq!(add.fact_id(), "13 + 24 = ?");

    let sub = Equation::TwoDigit { operation: Operation::Subtraction, op1: 23, op2: 14 };
    assert_eq!(sub.question_as_solved(Some(9)), "23 - 14 = 9");
    assert_eq!(sub.expected_result(), 9);
  }

  #[test]
  fn test_parse_inverts_fact_ids() {
    let equations = [
      Equation::Addition { a: 0, b: 7 },
      Equation::Subtraction { a: 14, b: 9 },
      Equation::Multiplication { a: 12, b: 7 },
      Equation::Division { a: 60, b: 6 },
      Equation::MissingAddend { known: 3, result: 10, slot: Slot::First },
      Equation::MissingAddend { known: 3, result: 10, slot: Slot::Second },
      Equation::MissingSubtrahend { minuend: 9, difference: 2 },
    ];
    for eq in equations {
      assert_eq!(Equation::parse(&eq.fact_id()), Ok(eq));
    }
  }

  #[test]
  fn test_parse_rejects_malformed_ids() {
    assert!(matches!(Equation::parse("ADD_1_2"), Err(FactIdError::Malformed(_))));
    assert!(matches!(Equation::parse("1 ^ 2 = ?"), Err(FactIdError::Malformed(_))));
    assert!(matches!(Equation::parse("a + 2 = ?"), Err(FactIdError::Malformed(_))));
    assert!(matches!(Equation::parse("1 + 2 ? ?"), Err(FactIdError::Malformed(_))));
    assert!(matches!(Equation::parse("? * 2 = 4"), Err(FactIdError::Malformed(_))));
    assert!(matches!(Equation::parse("4 / 0 = ?"), Err(FactIdError::Invalid(_))));
  }
}
