//! The catalog of levels.
//!
//! `Curriculum::standard()` builds the full catalog; tests and embedders can
//! build smaller ones with `Curriculum::new`.

pub mod level;
pub mod levels;
pub mod two_digit;

use std::sync::Arc;

pub use level::{ExerciseStrategy, Level};
pub use levels::{MixedReviewLevel, Pattern, PatternLevel, RangeLevel, TableLevel};
pub use two_digit::{ColumnFacts, TwoDigitComputationLevel};

use crate::domain::{Exercise, Operation};

#[derive(Debug, Clone)]
pub struct Curriculum {
  levels: Vec<Arc<dyn Level>>,
}

impl Curriculum {
  pub fn new(levels: Vec<Arc<dyn Level>>) -> Self {
    Self { levels }
  }

  pub fn standard() -> Self {
    let sum_5: Arc<dyn Level> = Arc::new(RangeLevel::addition("ADD_SUM_5", 0, 5, &[]));
    let sum_10: Arc<dyn Level> = Arc::new(RangeLevel::addition("ADD_SUM_10", 6, 10, &["ADD_SUM_5"]));
    let sub_5: Arc<dyn Level> = Arc::new(RangeLevel::subtraction("SUB_FROM_5", 0, 5, &[]));
    let sub_10: Arc<dyn Level> = Arc::new(RangeLevel::subtraction("SUB_FROM_10", 6, 10, &["SUB_FROM_5"]));

    let mut levels: Vec<Arc<dyn Level>> = vec![
      // Addition
      sum_5.clone(),
      sum_10.clone(),
      Arc::new(PatternLevel::new("ADD_DOUBLES", Pattern::Doubles, &["ADD_SUM_10"])),
      Arc::new(PatternLevel::new("ADD_NEAR_DOUBLES", Pattern::NearDoubles, &["ADD_DOUBLES"])),
      Arc::new(PatternLevel::new("ADD_MAKING_10S", Pattern::MakingTens, &["ADD_SUM_10"])),
      Arc::new(PatternLevel::new(
        "ADD_SUM_OVER_10",
        Pattern::SumsOver10,
        &["ADD_MAKING_10S", "ADD_NEAR_DOUBLES"],
      )),
      Arc::new(RangeLevel::addition("ADD_SUM_20", 11, 20, &["ADD_SUM_OVER_10"])),
      Arc::new(PatternLevel::new("ADD_TENS", Pattern::AddingTens, &["ADD_SUM_20"])),
      Arc::new(TwoDigitComputationLevel::new("ADD_TWO_DIGIT_NO_CARRY", Operation::Addition, false)),
      Arc::new(TwoDigitComputationLevel::new("ADD_TWO_DIGIT_CARRY", Operation::Addition, true)),
      // Subtraction
      sub_5.clone(),
      sub_10.clone(),
      Arc::new(RangeLevel::subtraction("SUB_FROM_20", 11, 20, &["SUB_FROM_10"])),
      Arc::new(PatternLevel::new("SUB_TENS", Pattern::SubtractingTens, &["SUB_FROM_20"])),
      Arc::new(TwoDigitComputationLevel::new("SUB_TWO_DIGIT_NO_BORROW", Operation::Subtraction, false)),
      Arc::new(TwoDigitComputationLevel::new("SUB_TWO_DIGIT_BORROW", Operation::Subtraction, true)),
    ];

    let tables: Vec<Arc<dyn Level>> = (2..=12)
      .map(|n| Arc::new(TableLevel::multiplication(n)) as Arc<dyn Level>)
      .collect();
    let divisions: Vec<Arc<dyn Level>> = (2..=10)
      .map(|n| Arc::new(TableLevel::division(n)) as Arc<dyn Level>)
      .collect();
    // tables[0] is 2, divisions[0] is 2
    let pick = |source: &[Arc<dyn Level>], ns: &[usize]| -> Vec<Arc<dyn Level>> {
      ns.iter().map(|n| source[n - 2].clone()).collect()
    };
    let reviews = [
      MixedReviewLevel::new("ADD_REVIEW_1", Operation::Addition, vec![sum_5, sum_10]),
      MixedReviewLevel::new("SUB_REVIEW_1", Operation::Subtraction, vec![sub_5, sub_10]),
      MixedReviewLevel::new("MUL_REVIEW_2_5_10", Operation::Multiplication, pick(&tables, &[2, 5, 10])),
      MixedReviewLevel::new("MUL_REVIEW_2_4_8", Operation::Multiplication, pick(&tables, &[2, 4, 8])),
      MixedReviewLevel::new("MUL_REVIEW_2_3_6_9", Operation::Multiplication, pick(&tables, &[2, 3, 6, 9])),
      MixedReviewLevel::new("DIV_REVIEW_2_5_10", Operation::Division, pick(&divisions, &[2, 5, 10])),
      MixedReviewLevel::new("DIV_REVIEW_2_4_8", Operation::Division, pick(&divisions, &[2, 4, 8])),
      MixedReviewLevel::new("DIV_REVIEW_2_3_6_9", Operation::Division, pick(&divisions, &[2, 3, 6, 9])),
    ];

    levels.extend(tables);
    levels.extend(divisions);
    levels.extend(reviews.into_iter().map(|l| Arc::new(l) as Arc<dyn Level>));

    Self { levels }
  }

  pub fn all_levels(&self) -> &[Arc<dyn Level>] {
    &self.levels
  }

  pub fn level(&self, id: &str) -> Option<&Arc<dyn Level>> {
    self.levels.iter().find(|l| l.id() == id)
  }

  /// First level, in catalog order, that recognizes the exercise
  pub fn level_for_exercise(&self, exercise: &Exercise) -> Option<&Arc<dyn Level>> {
    self.levels.iter().find(|l| l.recognizes(&exercise.equation))
  }

  pub fn levels_for(&self, operation: Operation) -> Vec<Arc<dyn Level>> {
    self
      .levels
      .iter()
      .filter(|l| l.operation() == operation)
      .cloned()
      .collect()
  }

  pub fn is_empty(&self) -> bool {
    self.levels.is_empty()
  }
}

impl Default for Curriculum {
  fn default() -> Self {
    Self::standard()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Equation;
  use std::collections::HashSet;

  #[test]
  fn test_standard_catalog_ids_are_unique() {
    let curriculum = Curriculum::standard();
    let ids: HashSet<&str> = curriculum.all_levels().iter().map(|l| l.id()).collect();
    assert_eq!(ids.len(), curriculum.all_levels().len());
    assert_eq!(curriculum.all_levels().len(), 10 + 6 + 11 + 9 + 8);
  }

  #[test]
  fn test_prerequisites_refer_to_known_levels() {
    let curriculum = Curriculum::standard();
    for level in curriculum.all_levels() {
      for prerequisite in level.prerequisites() {
        assert!(
          curriculum.level(prerequisite).is_some(),
          "{} requires unknown level {}",
          level.id(),
          prerequisite
        );
      }
    }
  }

  #[test]
  fn test_every_level_has_facts() {
    for level in Curriculum::standard().all_levels() {
      assert!(!level.all_fact_ids().is_empty(), "{} is empty", level.id());
    }
  }

  #[test]
  fn test_levels_for_operation() {
    let curriculum = Curriculum::standard();
    let multiplication = curriculum.levels_for(Operation::Multiplication);
    assert_eq!(multiplication.len(), 11 + 3);
    assert!(multiplication.iter().all(|l| l.operation() == Operation::Multiplication));
    assert_eq!(multiplication[0].id(), "MUL_TABLE_2");
  }

  #[test]
  fn test_mixed_reviews_use_review_strategy() {
    let curriculum = Curriculum::standard();
    let review = curriculum.level("MUL_REVIEW_2_4_8").unwrap();
    assert_eq!(review.strategy(), ExerciseStrategy::Review);
    assert_eq!(
      review.prerequisites(),
      &["MUL_TABLE_2".to_string(), "MUL_TABLE_4".to_string(), "MUL_TABLE_8".to_string()]
    );
  }

  #[test]
  fn test_level_for_exercise() {
    let curriculum = Curriculum::standard();
    let find = |eq| curriculum.level_for_exercise(&Exercise::new(eq)).map(|l| l.id().to_string());

    assert_eq!(find(Equation::Addition { a: 2, b: 3 }).as_deref(), Some("ADD_SUM_5"));
    assert_eq!(find(Equation::Multiplication { a: 7, b: 6 }).as_deref(), Some("MUL_TABLE_6"));
    assert_eq!(find(Equation::Division { a: 20, b: 5 }).as_deref(), Some("DIV_BY_5"));
    assert_eq!(
      find(Equation::TwoDigit { operation: Operation::Addition, op1: 19, op2: 19 }).as_deref(),
      Some("ADD_TWO_DIGIT_CARRY")
    );
    assert_eq!(find(Equation::Addition { a: 99, b: 99 }), None);
  }

  #[test]
  fn test_two_digit_levels_are_discoverable() {
    let curriculum = Curriculum::standard();
    let level = curriculum.level("SUB_TWO_DIGIT_BORROW").unwrap();
    assert!(level.as_two_digit().is_some());
    assert!(curriculum.level("SUB_FROM_20").unwrap().as_two_digit().is_none());
  }
}
