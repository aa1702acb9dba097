use std::collections::VecDeque;

use super::ExerciseProvider;
use crate::domain::{Exercise, FactMastery, MasteryMap};
use crate::error::Result;

/// Serves a prebuilt list of exercises once each, then reports the end.
///
/// Answers are not scored against mastery: a fixed list is a test, not
/// practice.
#[derive(Debug, Clone, Default)]
pub struct FixedListProvider {
  remaining: VecDeque<Exercise>,
}

impl FixedListProvider {
  pub fn new(exercises: impl IntoIterator<Item = Exercise>) -> Self {
    Self {
      remaining: exercises.into_iter().collect(),
    }
  }

  pub fn remaining(&self) -> usize {
    self.remaining.len()
  }
}

impl ExerciseProvider for FixedListProvider {
  fn name(&self) -> &'static str {
    "fixed_list"
  }

  fn next_exercise(&mut self, _mastery: &MasteryMap) -> Result<Option<Exercise>> {
    Ok(self.remaining.pop_front())
  }

  fn record_attempt(
    &mut self,
    _mastery: &mut MasteryMap,
    _exercise: &Exercise,
    _was_correct: bool,
  ) -> Result<Vec<FactMastery>> {
    Ok(Vec::new())
  }
}
