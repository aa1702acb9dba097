//! Two-digit addition and subtraction, with or without regrouping.
//!
//! The level does not track mastery of whole two-digit problems (there are
//! thousands). Instead it accounts for the column facts those problems are
//! made of: a ones-column fact such as `9 + 9 = ?` and a tens-column fact
//! such as `10 + 10 = ?`. Answering `19 + 19 = ?` updates both, plus the
//! literal problem itself.

use rand::{Rng, RngCore};

use super::level::{ExerciseStrategy, Level};
use crate::domain::{Equation, Exercise, FactIdError, Operation};
use crate::error::Result;

/// The column facts one two-digit problem exercises
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFacts {
  pub ones: String,
  pub tens: String,
}

#[derive(Debug, Clone)]
pub struct TwoDigitComputationLevel {
  id: String,
  operation: Operation,
  /// Carry for addition, borrow for subtraction
  with_regrouping: bool,
  prerequisites: Vec<String>,
  /// Ones digits `(o1, o2)` of each ones-column fact
  ones: Vec<(i32, i32)>,
  /// Tens digits `(t1, t2)` of each tens-column fact; for borrowing
  /// subtraction `t1` is the tens digit left after the borrow
  tens: Vec<(i32, i32)>,
  fact_ids: Vec<String>,
}

impl TwoDigitComputationLevel {
  /// # Panics
  ///
  /// Panics unless `operation` is addition or subtraction.
  pub fn new(id: &str, operation: Operation, with_regrouping: bool) -> Self {
    let (ones, tens, prerequisite): (Vec<(i32, i32)>, Vec<(i32, i32)>, &str) = match operation {
      Operation::Addition => {
        let max_tens_sum = if with_regrouping { 8 } else { 9 };
        let ones = (0..=9)
          .flat_map(|o1| (0..=9).map(move |o2| (o1, o2)))
          .filter(|(o1, o2)| (o1 + o2 >= 10) == with_regrouping)
          .collect();
        let tens = (1..=9)
          .flat_map(|t1| (1..=9).map(move |t2| (t1, t2)))
          .filter(|(t1, t2)| t1 + t2 <= max_tens_sum)
          .collect();
        (ones, tens, "ADD_TENS")
      }
      Operation::Subtraction => {
        let ones = (0..=9)
          .flat_map(|o1| (0..=9).map(move |o2| (o1, o2)))
          .filter(|(o1, o2)| (o1 < o2) == with_regrouping)
          .collect();
        let max_t1 = if with_regrouping { 8 } else { 9 };
        let tens = (1..=max_t1)
          .flat_map(|t1| (1..=t1).map(move |t2| (t1, t2)))
          .collect();
        (ones, tens, "SUB_TENS")
      }
      other => panic!("two-digit levels only support addition and subtraction, got {}", other.as_str()),
    };

    let mut level = Self {
      id: id.to_string(),
      operation,
      with_regrouping,
      prerequisites: vec![prerequisite.to_string()],
      ones,
      tens,
      fact_ids: Vec::new(),
    };
    level.fact_ids = level
      .ones
      .iter()
      .map(|&(o1, o2)| level.ones_fact_id(o1, o2))
      .chain(level.tens.iter().map(|&(t1, t2)| level.tens_fact_id(t1, t2)))
      .collect();
    level
  }

  fn ones_fact_id(&self, o1: i32, o2: i32) -> String {
    match self.operation {
      Operation::Subtraction if self.with_regrouping => Equation::Subtraction { a: 10 + o1, b: o2 },
      Operation::Subtraction => Equation::Subtraction { a: o1, b: o2 },
      _ => Equation::Addition { a: o1, b: o2 },
    }
    .fact_id()
  }

  fn tens_fact_id(&self, t1: i32, t2: i32) -> String {
    match self.operation {
      Operation::Subtraction => Equation::Subtraction { a: t1 * 10, b: t2 * 10 },
      _ => Equation::Addition { a: t1 * 10, b: t2 * 10 },
    }
    .fact_id()
  }

  fn ones_fact_ids(&self) -> impl Iterator<Item = &String> {
    self.fact_ids[..self.ones.len()].iter()
  }

  fn tens_fact_ids(&self) -> impl Iterator<Item = &String> {
    self.fact_ids[self.ones.len()..].iter()
  }

  /// Whether `op1 <op> op2` is a two-digit problem of this level
  pub fn accepts(&self, op1: i32, op2: i32) -> bool {
    let (o1, o2) = (op1 % 10, op2 % 10);
    match self.operation {
      Operation::Addition => {
        (10..100).contains(&op1)
          && (10..100).contains(&op2)
          && op1 + op2 < 100
          && (o1 + o2 >= 10) == self.with_regrouping
      }
      Operation::Subtraction => {
        (10..100).contains(&op1) && (10..=op1).contains(&op2) && (o1 < o2) == self.with_regrouping
      }
      _ => false,
    }
  }

  /// Split a two-digit problem into its ones-column and tens-column facts.
  pub fn column_facts(&self, op1: i32, op2: i32) -> ColumnFacts {
    let (o1, o2) = (op1 % 10, op2 % 10);
    let (t1, t2) = (op1 / 10, op2 / 10);
    match self.operation {
      Operation::Subtraction if o1 < o2 => ColumnFacts {
        ones: Equation::Subtraction { a: 10 + o1, b: o2 }.fact_id(),
        tens: Equation::Subtraction { a: (t1 - 1) * 10, b: t2 * 10 }.fact_id(),
      },
      Operation::Subtraction => ColumnFacts {
        ones: Equation::Subtraction { a: o1, b: o2 }.fact_id(),
        tens: Equation::Subtraction { a: t1 * 10, b: t2 * 10 }.fact_id(),
      },
      _ => ColumnFacts {
        ones: Equation::Addition { a: o1, b: o2 }.fact_id(),
        tens: Equation::Addition { a: t1 * 10, b: t2 * 10 }.fact_id(),
      },
    }
  }

  /// Every pairing of a ones-column fact with a tens-column fact, each with
  /// the problem built from exactly those two columns
  pub fn column_combinations(&self) -> Vec<(ColumnFacts, Equation)> {
    let (ones_ids, tens_ids) = self.fact_ids.split_at(self.ones.len());
    self
      .ones
      .iter()
      .zip(ones_ids)
      .flat_map(|(&ones, ones_id)| {
        self.tens.iter().zip(tens_ids).map(move |(&tens, tens_id)| {
          let columns = ColumnFacts { ones: ones_id.clone(), tens: tens_id.clone() };
          (columns, self.compose(ones, tens))
        })
      })
      .collect()
  }

  /// Assemble a problem from ones digits and tens-fact digits
  fn compose(&self, (o1, o2): (i32, i32), (t1, t2): (i32, i32)) -> Equation {
    let op1_tens = match self.operation {
      Operation::Subtraction if self.with_regrouping => t1 + 1,
      _ => t1,
    };
    Equation::TwoDigit {
      operation: self.operation,
      op1: op1_tens * 10 + o1,
      op2: t2 * 10 + o2,
    }
  }

  fn random_ones(&self, rng: &mut dyn RngCore) -> (i32, i32) {
    self.ones[rng.random_range(0..self.ones.len())]
  }

  fn random_tens(&self, rng: &mut dyn RngCore) -> (i32, i32) {
    self.tens[rng.random_range(0..self.tens.len())]
  }

  fn two_digit_operands(&self, equation: &Equation) -> Option<(i32, i32)> {
    let (operation, op1, op2) = match *equation {
      Equation::TwoDigit { operation, op1, op2 } => (operation, op1, op2),
      Equation::Addition { a, b } => (Operation::Addition, a, b),
      Equation::Subtraction { a, b } => (Operation::Subtraction, a, b),
      _ => return None,
    };
    (operation == self.operation && self.accepts(op1, op2)).then_some((op1, op2))
  }
}

impl Level for TwoDigitComputationLevel {
  fn id(&self) -> &str {
    &self.id
  }

  fn operation(&self) -> Operation {
    self.operation
  }

  fn prerequisites(&self) -> &[String] {
    &self.prerequisites
  }

  fn strategy(&self) -> ExerciseStrategy {
    ExerciseStrategy::Drill
  }

  fn generate_exercise(&self, rng: &mut dyn RngCore) -> Exercise {
    let ones = self.random_ones(rng);
    let tens = self.random_tens(rng);
    Exercise::new(self.compose(ones, tens))
  }

  fn all_fact_ids(&self) -> &[String] {
    &self.fact_ids
  }

  /// Column facts get a random partner column attached; anything else must
  /// be a literal two-digit problem of this level.
  fn create_exercise(&self, fact_id: &str, rng: &mut dyn RngCore) -> Result<Exercise> {
    if let Some(index) = self.ones_fact_ids().position(|id| id == fact_id) {
      let tens = self.random_tens(rng);
      return Ok(Exercise::new(self.compose(self.ones[index], tens)));
    }
    if let Some(index) = self.tens_fact_ids().position(|id| id == fact_id) {
      let ones = self.random_ones(rng);
      return Ok(Exercise::new(self.compose(ones, self.tens[index])));
    }

    let equation = Equation::parse(fact_id)?;
    let (op1, op2) = self
      .two_digit_operands(&equation)
      .ok_or_else(|| FactIdError::Invalid(fact_id.to_string()))?;
    Ok(Exercise::new(Equation::TwoDigit { operation: self.operation, op1, op2 }))
  }

  fn affected_fact_ids(&self, exercise: &Exercise) -> Vec<String> {
    match self.two_digit_operands(&exercise.equation) {
      Some((op1, op2)) => {
        let columns = self.column_facts(op1, op2);
        vec![exercise.fact_id(), columns.ones, columns.tens]
      }
      None => vec![exercise.fact_id()],
    }
  }

  fn recognizes(&self, equation: &Equation) -> bool {
    self.two_digit_operands(equation).is_some() || {
      let fact_id = equation.fact_id();
      self.fact_ids.iter().any(|id| *id == fact_id)
    }
  }

  fn as_two_digit(&self) -> Option<&TwoDigitComputationLevel> {
    Some(self)
  }
}
