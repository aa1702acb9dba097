//! Single-digit and table levels.

use std::collections::HashSet;
use std::sync::Arc;

use rand::{Rng, RngCore};

use super::level::{ExerciseStrategy, Level};
use crate::domain::{Equation, Exercise, Operation, Slot};
use crate::error::Result;

fn ids(equations: impl IntoIterator<Item = Equation>) -> Vec<String> {
  let mut seen = HashSet::new();
  equations
    .into_iter()
    .map(|eq| eq.fact_id())
    .filter(|id| seen.insert(id.clone()))
    .collect()
}

fn owned(prerequisites: &[&str]) -> Vec<String> {
  prerequisites.iter().map(|s| s.to_string()).collect()
}

// ==================== Range ====================

/// Addition facts whose sum, or subtraction facts whose minuend, lies in
/// `min..=max`.
#[derive(Debug, Clone)]
pub struct RangeLevel {
  id: String,
  operation: Operation,
  min: i32,
  max: i32,
  prerequisites: Vec<String>,
  fact_ids: Vec<String>,
}

impl RangeLevel {
  pub fn addition(id: &str, min_sum: i32, max_sum: i32, prerequisites: &[&str]) -> Self {
    let facts = (min_sum..=max_sum)
      .flat_map(|sum| (0..=sum).map(move |a| Equation::Addition { a, b: sum - a }));
    Self {
      id: id.to_string(),
      operation: Operation::Addition,
      min: min_sum,
      max: max_sum,
      prerequisites: owned(prerequisites),
      fact_ids: ids(facts),
    }
  }

  pub fn subtraction(id: &str, min_minuend: i32, max_minuend: i32, prerequisites: &[&str]) -> Self {
    let facts = (min_minuend..=max_minuend)
      .flat_map(|a| (0..=a).map(move |b| Equation::Subtraction { a, b }));
    Self {
      id: id.to_string(),
      operation: Operation::Subtraction,
      min: min_minuend,
      max: max_minuend,
      prerequisites: owned(prerequisites),
      fact_ids: ids(facts),
    }
  }
}

impl Level for RangeLevel {
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
    let whole = rng.random_range(self.min..=self.max);
    let part = rng.random_range(0..=whole);
    let equation = match self.operation {
      Operation::Subtraction => Equation::Subtraction { a: whole, b: part },
      _ => Equation::Addition { a: part, b: whole - part },
    };
    Exercise::new(equation)
  }

  fn all_fact_ids(&self) -> &[String] {
    &self.fact_ids
  }
}

// ==================== Tables ====================

const TABLE_MIN: i32 = 2;
const MUL_TABLE_MAX: i32 = 12;
const DIV_QUOTIENT_MAX: i32 = 10;

/// A multiplication table or a division-by-n level
#[derive(Debug, Clone)]
pub struct TableLevel {
  id: String,
  operation: Operation,
  operand: i32,
  fact_ids: Vec<String>,
}

impl TableLevel {
  /// `operand × 2..=12` in both orders
  pub fn multiplication(table: i32) -> Self {
    let facts = (TABLE_MIN..=MUL_TABLE_MAX).flat_map(|n| {
      [
        Equation::Multiplication { a: table, b: n },
        Equation::Multiplication { a: n, b: table },
      ]
    });
    Self {
      id: format!("MUL_TABLE_{}", table),
      operation: Operation::Multiplication,
      operand: table,
      fact_ids: ids(facts),
    }
  }

  /// Exact divisions by `divisor` with quotients `2..=10`
  pub fn division(divisor: i32) -> Self {
    let facts = (TABLE_MIN..=DIV_QUOTIENT_MAX).map(|q| Equation::Division { a: divisor * q, b: divisor });
    Self {
      id: format!("DIV_BY_{}", divisor),
      operation: Operation::Division,
      operand: divisor,
      fact_ids: ids(facts),
    }
  }
}

impl Level for TableLevel {
  fn id(&self) -> &str {
    &self.id
  }

  fn operation(&self) -> Operation {
    self.operation
  }

  fn prerequisites(&self) -> &[String] {
    &[]
  }

  fn strategy(&self) -> ExerciseStrategy {
    ExerciseStrategy::Drill
  }

  fn generate_exercise(&self, rng: &mut dyn RngCore) -> Exercise {
    let equation = match self.operation {
      Operation::Division => {
        let quotient = rng.random_range(TABLE_MIN..=DIV_QUOTIENT_MAX);
        Equation::Division { a: self.operand * quotient, b: self.operand }
      }
      _ => {
        let other = rng.random_range(TABLE_MIN..=MUL_TABLE_MAX);
        if rng.random_bool(0.5) {
          Equation::Multiplication { a: self.operand, b: other }
        } else {
          Equation::Multiplication { a: other, b: self.operand }
        }
      }
    };
    Exercise::new(equation)
  }

  fn all_fact_ids(&self) -> &[String] {
    &self.fact_ids
  }
}

// ==================== Mixed review ====================

/// Union of several source levels, practiced as a review.
#[derive(Debug, Clone)]
pub struct MixedReviewLevel {
  id: String,
  operation: Operation,
  sources: Vec<Arc<dyn Level>>,
  prerequisites: Vec<String>,
  fact_ids: Vec<String>,
}

impl MixedReviewLevel {
  /// # Panics
  ///
  /// Panics if `sources` is empty.
  pub fn new(id: &str, operation: Operation, sources: Vec<Arc<dyn Level>>) -> Self {
    assert!(!sources.is_empty(), "mixed review level {} needs at least one source", id);
    let prerequisites = sources.iter().map(|l| l.id().to_string()).collect();
    let mut seen = HashSet::new();
    let fact_ids = sources
      .iter()
      .flat_map(|l| l.all_fact_ids().iter().cloned())
      .filter(|id| seen.insert(id.clone()))
      .collect();
    Self {
      id: id.to_string(),
      operation,
      sources,
      prerequisites,
      fact_ids,
    }
  }

  fn source_for(&self, equation: &Equation) -> Option<&Arc<dyn Level>> {
    self.sources.iter().find(|l| l.recognizes(equation))
  }
}

impl Level for MixedReviewLevel {
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
    ExerciseStrategy::Review
  }

  fn generate_exercise(&self, rng: &mut dyn RngCore) -> Exercise {
    let index = rng.random_range(0..self.sources.len());
    self.sources[index].generate_exercise(rng)
  }

  fn all_fact_ids(&self) -> &[String] {
    &self.fact_ids
  }

  fn create_exercise(&self, fact_id: &str, rng: &mut dyn RngCore) -> Result<Exercise> {
    match self.sources.iter().find(|l| l.all_fact_ids().iter().any(|id| id == fact_id)) {
      Some(source) => source.create_exercise(fact_id, rng),
      None => Ok(Exercise::new(Equation::parse(fact_id)?)),
    }
  }

  fn affected_fact_ids(&self, exercise: &Exercise) -> Vec<String> {
    match self.source_for(&exercise.equation) {
      Some(source) => source.affected_fact_ids(exercise),
      None => vec![exercise.fact_id()],
    }
  }

  fn recognizes(&self, equation: &Equation) -> bool {
    self.source_for(equation).is_some()
  }
}

// ==================== Patterns ====================

/// A pedagogical pattern with its own fact enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
  /// `n + n` for `n` in 1..=10
  Doubles,
  /// `n + (n + 1)` in both orders
  NearDoubles,
  /// Missing addend to make 10
  MakingTens,
  /// Single-digit sums crossing 10, from a 6..=9 anchor
  SumsOver10,
  /// Multiples of ten added together
  AddingTens,
  /// Multiples of ten subtracted from a larger multiple of ten
  SubtractingTens,
}

impl Pattern {
  pub fn operation(&self) -> Operation {
    match self {
      Self::SubtractingTens => Operation::Subtraction,
      _ => Operation::Addition,
    }
  }

  fn equations(&self) -> Vec<Equation> {
    match self {
      Self::Doubles => (1..=10).map(|n| Equation::Addition { a: n, b: n }).collect(),
      Self::NearDoubles => (1..=9)
        .flat_map(|n| [Equation::Addition { a: n, b: n + 1 }, Equation::Addition { a: n + 1, b: n }])
        .collect(),
      Self::MakingTens => [Slot::Second, Slot::First]
        .into_iter()
        .flat_map(|slot| (1..=9).map(move |known| Equation::MissingAddend { known, result: 10, slot }))
        .collect(),
      Self::SumsOver10 => (6..=9)
        .flat_map(|a| (11 - a..=9).flat_map(move |b| [Equation::Addition { a, b }, Equation::Addition { a: b, b: a }]))
        .collect(),
      Self::AddingTens => (1..=9)
        .flat_map(|a| (1..=9).map(move |b| Equation::Addition { a: a * 10, b: b * 10 }))
        .collect(),
      Self::SubtractingTens => (2..=9)
        .flat_map(|a| (1..a).map(move |b| Equation::Subtraction { a: a * 10, b: b * 10 }))
        .collect(),
    }
  }

  fn generate(&self, rng: &mut dyn RngCore) -> Equation {
    match self {
      Self::Doubles => {
        let n = rng.random_range(1..=10);
        Equation::Addition { a: n, b: n }
      }
      Self::NearDoubles => {
        let n = rng.random_range(1..=9);
        if rng.random_bool(0.5) {
          Equation::Addition { a: n, b: n + 1 }
        } else {
          Equation::Addition { a: n + 1, b: n }
        }
      }
      Self::MakingTens => {
        let known = rng.random_range(1..=9);
        let slot = if rng.random_bool(0.5) { Slot::First } else { Slot::Second };
        Equation::MissingAddend { known, result: 10, slot }
      }
      Self::SumsOver10 => {
        let a = rng.random_range(6..=9);
        let b = rng.random_range(11 - a..=9);
        if rng.random_bool(0.5) {
          Equation::Addition { a, b }
        } else {
          Equation::Addition { a: b, b: a }
        }
      }
      Self::AddingTens => Equation::Addition {
        a: rng.random_range(1..=9) * 10,
        b: rng.random_range(1..=9) * 10,
      },
      Self::SubtractingTens => {
        let a = rng.random_range(2..=9);
        let b = rng.random_range(1..a);
        Equation::Subtraction { a: a * 10, b: b * 10 }
      }
    }
  }
}

#[derive(Debug, Clone)]
pub struct PatternLevel {
  id: String,
  pattern: Pattern,
  prerequisites: Vec<String>,
  fact_ids: Vec<String>,
}

impl PatternLevel {
  pub fn new(id: &str, pattern: Pattern, prerequisites: &[&str]) -> Self {
    Self {
      id: id.to_string(),
      pattern,
      prerequisites: owned(prerequisites),
      fact_ids: ids(pattern.equations()),
    }
  }
}

impl Level for PatternLevel {
  fn id(&self) -> &str {
    &self.id
  }

  fn operation(&self) -> Operation {
    self.pattern.operation()
  }

  fn prerequisites(&self) -> &[String] {
    &self.prerequisites
  }

  fn strategy(&self) -> ExerciseStrategy {
    ExerciseStrategy::Drill
  }

  fn generate_exercise(&self, rng: &mut dyn RngCore) -> Exercise {
    Exercise::new(self.pattern.generate(rng))
  }

  fn all_fact_ids(&self) -> &[String] {
    &self.fact_ids
  }
}
