use serde::{Deserialize, Serialize};

/// The arithmetic operation behind a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
  Addition,
  Subtraction,
  Multiplication,
  Division,
}

impl Operation {
  pub const ALL: [Operation; 4] = [
    Self::Addition,
    Self::Subtraction,
    Self::Multiplication,
    Self::Division,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Addition => "addition",
      Self::Subtraction => "subtraction",
      Self::Multiplication => "multiplication",
      Self::Division => "division",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
  }

  /// Symbol shown to the learner
  pub fn symbol(&self) -> &'static str {
    match self {
      Self::Addition => "+",
      Self::Subtraction => "-",
      Self::Multiplication => "×",
      Self::Division => "÷",
    }
  }

  /// Symbol used inside fact identifiers (ASCII only)
  pub fn id_symbol(&self) -> &'static str {
    match self {
      Self::Addition => "+",
      Self::Subtraction => "-",
      Self::Multiplication => "*",
      Self::Division => "/",
    }
  }

  pub fn from_id_symbol(symbol: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|op| op.id_symbol() == symbol)
  }

  pub fn apply(&self, a: i32, b: i32) -> i32 {
    match self {
      Self::Addition => a + b,
      Self::Subtraction => a - b,
      Self::Multiplication => a * b,
      Self::Division if b != 0 => a / b,
      Self::Division => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_str_ignores_case() {
    assert_eq!(Operation::from_str("Addition"), Some(Operation::Addition));
    assert_eq!(Operation::from_str("DIVISION"), Some(Operation::Division));
    assert_eq!(Operation::from_str("modulo"), None);
  }

  #[test]
  fn test_as_str_roundtrip() {
    for op in Operation::ALL {
      assert_eq!(Operation::from_str(op.as_str()), Some(op));
    }
  }

  #[test]
  fn test_id_symbols_are_ascii() {
    for op in Operation::ALL {
      assert!(op.id_symbol().is_ascii());
      assert_eq!(Operation::from_id_symbol(op.id_symbol()), Some(op));
    }
    assert_eq!(Operation::from_id_symbol("×"), None);
  }

  #[test]
  fn test_apply() {
    assert_eq!(Operation::Addition.apply(3, 4), 7);
    assert_eq!(Operation::Subtraction.apply(10, 4), 6);
    assert_eq!(Operation::Multiplication.apply(7, 6), 42);
    assert_eq!(Operation::Division.apply(20, 5), 4);
  }
}
