//! Speed-gated mastery update shared by the composite drill and the
//! two-digit column facts.
//!
//! Low strengths advance on accuracy alone; the upper rungs require an
//! increasingly fast answer. A wrong answer drops the fact back to 1.

use super::SpeedBadge;
use crate::domain::{FactMastery, MAX_STRENGTH};

const DURATION_HISTORY_WEIGHT: f64 = 0.8;
const DURATION_SAMPLE_WEIGHT: f64 = 0.2;

/// Fold a new answer duration into a running average
pub fn moving_average_ms(previous_ms: u64, sample_ms: u64) -> u64 {
  if previous_ms > 0 {
    (previous_ms as f64 * DURATION_HISTORY_WEIGHT + sample_ms as f64 * DURATION_SAMPLE_WEIGHT).round()
      as u64
  } else {
    sample_ms
  }
}

pub fn update_mastery(
  current: &FactMastery,
  was_correct: bool,
  duration_ms: u64,
  badge: SpeedBadge,
  now_ms: i64,
) -> FactMastery {
  let strength = if was_correct {
    match current.strength {
      0 | 1 => current.strength + 1,
      2 if badge >= SpeedBadge::Bronze => 3,
      3 if badge >= SpeedBadge::Silver => 4,
      4 if badge == SpeedBadge::Gold => 5,
      s => s,
    }
  } else {
    1
  };

  FactMastery {
    strength: strength.min(MAX_STRENGTH),
    last_tested_ms: now_ms,
    avg_duration_ms: moving_average_ms(current.avg_duration_ms, duration_ms),
    ..current.clone()
  }
}
