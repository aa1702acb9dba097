//! Activity summaries over the attempt history: practice streaks and the
//! highlights shown after a session.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::domain::ExerciseAttempt;

const MAX_HIGHLIGHTS: usize = 2;

/// Attempts per calendar day (UTC)
pub fn daily_activity(attempts: &[ExerciseAttempt]) -> BTreeMap<NaiveDate, u32> {
  let mut activity = BTreeMap::new();
  for attempt in attempts {
    *activity.entry(attempt.timestamp.date_naive()).or_insert(0) += 1;
  }
  activity
}

/// Consecutive active days ending today, or ending yesterday when nothing
/// has been practiced yet today.
pub fn calculate_streak(daily_activity: &BTreeMap<NaiveDate, u32>, today: NaiveDate) -> u32 {
  let active = |day: &NaiveDate| daily_activity.get(day).is_some_and(|&count| count > 0);

  let mut day = if active(&today) {
    today
  } else {
    match today.checked_sub_days(Days::new(1)) {
      Some(yesterday) => yesterday,
      None => return 0,
    }
  };

  let mut streak = 0;
  while active(&day) {
    streak += 1;
    match day.checked_sub_days(Days::new(1)) {
      Some(previous) => day = previous,
      None => break,
    }
  }
  streak
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Highlight {
  /// At least 30 attempts
  Unstoppable { total: usize },
  /// At least 10 attempts and 95% accuracy
  LaserFocus { correct: usize },
  /// A short session with no mistakes
  PerfectPrecision,
  /// Correct answers averaging under 3 seconds
  SpeedyPaws { seconds: u64 },
}

impl Highlight {
  pub fn icon(&self) -> &'static str {
    match self {
      Self::Unstoppable { .. } => "🚀",
      Self::LaserFocus { .. } => "🎯",
      Self::PerfectPrecision => "✨",
      Self::SpeedyPaws { .. } => "⚡",
    }
  }

  pub fn message(&self) -> String {
    match self {
      Self::Unstoppable { total } => format!("Unstoppable! {} problems solved", total),
      Self::LaserFocus { correct } => format!("Laser focus: {} correct answers", correct),
      Self::PerfectPrecision => "Perfect precision: not a single mistake".to_string(),
      Self::SpeedyPaws { seconds } => format!("Speedy paws: about {}s per answer", seconds),
    }
  }
}

/// Up to two highlights, most impressive first
pub fn generate_highlights(attempts: &[ExerciseAttempt]) -> Vec<Highlight> {
  let total = attempts.len();
  if total == 0 {
    return Vec::new();
  }
  let correct: Vec<&ExerciseAttempt> = attempts.iter().filter(|a| a.was_correct).collect();
  let accuracy = correct.len() as f64 / total as f64;
  let avg_duration_ms = if correct.is_empty() {
    0.0
  } else {
    correct.iter().map(|a| a.duration_ms as f64).sum::<f64>() / correct.len() as f64
  };

  let mut highlights = Vec::new();
  if total >= 30 {
    highlights.push(Highlight::Unstoppable { total });
  }
  if total >= 10 && accuracy >= 0.95 {
    highlights.push(Highlight::LaserFocus { correct: correct.len() });
  } else if (5..=9).contains(&total) && correct.len() == total {
    highlights.push(Highlight::PerfectPrecision);
  }
  if total >= 10 && (1.0..=3000.0).contains(&avg_duration_ms) {
    highlights.push(Highlight::SpeedyPaws {
      seconds: (avg_duration_ms / 1000.0).round() as u64,
    });
  }

  highlights.truncate(MAX_HIGHLIGHTS);
  highlights
}
