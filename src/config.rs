//! Application configuration.
//!
//! Engine tuning constants live here alongside the runtime settings that
//! are read from `config.toml`, `.env` or fall back to defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ==================== Drill Configuration ====================

/// Number of facts rotated through by a drill
pub const WORKING_SET_SIZE: usize = 4;

/// Strength at which a drilled fact leaves the working set
pub const REPLACEABLE_STRENGTH: u8 = 4;

/// Strengths below this are still being learned (L1)
pub const CONSOLIDATING_STRENGTH: u8 = 3;

/// Consecutive correct answers that promote a learning fact straight to L2
pub const CONSECUTIVE_ANSWERS_FOR_PROMOTION: u32 = 2;

/// Minimum gap since the last attempt before a fact may become fluent.
/// 5 minutes stands in for "a separate session".
pub const MIN_SESSION_SPACING_MS: i64 = 5 * 60 * 1000;

/// Probability of stopping at each position of the soft recency scan
pub const SOFT_PICK_PROBABILITY: f64 = 0.5;

// ==================== Review Configuration ====================

/// Facts whose urgency exceeds this are due for review
pub const REVIEW_URGENCY_THRESHOLD: f64 = 0.75;

/// Ideal review interval by strength, in seconds: 30s, 10min, 1h, 1d, 3d, 14d
pub const REVIEW_INTERVALS_SECS: [i64; 6] = [30, 600, 3_600, 86_400, 259_200, 1_209_600];

/// Ideal review interval for a fact at `strength`
pub fn review_interval_ms(strength: u8) -> i64 {
  let index = (strength as usize).min(REVIEW_INTERVALS_SECS.len() - 1);
  REVIEW_INTERVALS_SECS[index] * 1000
}

// ==================== Smart Practice Configuration ====================

/// Chance of practicing the current level instead of reviewing a mastered one
pub const LEARNING_PROBABILITY: f64 = 0.8;

/// Number of weakest facts a smart practice pick chooses among
pub const SMART_CANDIDATE_COUNT: usize = 5;

// ==================== Runtime Configuration ====================

const DEFAULT_DATABASE_PATH: &str = "data/math_drill.db";
const DEFAULT_USER_ID: i64 = 1;
const DEFAULT_EXERCISE_COUNT: usize = 10;

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
  database: Option<DatabaseSection>,
  session: Option<SessionSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
  path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionSection {
  user_id: Option<i64>,
  count: Option<usize>,
}

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  pub database_path: PathBuf,
  pub user_id: i64,
  pub exercise_count: usize,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
      user_id: DEFAULT_USER_ID,
      exercise_count: DEFAULT_EXERCISE_COUNT,
    }
  }
}

impl AppConfig {
  /// Load settings with priority: config.toml > .env > default
  pub fn load() -> Self {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    Self::load_from(Path::new("config.toml"))
  }

  /// Same as [`AppConfig::load`] with an explicit config file and without
  /// reading `.env`
  pub fn load_from(config_path: &Path) -> Self {
    let file = match std::fs::read_to_string(config_path) {
      Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
        Ok(file) => file,
        Err(e) => {
          tracing::warn!("Ignoring invalid {}: {}", config_path.display(), e);
          ConfigFile::default()
        }
      },
      Err(_) => ConfigFile::default(),
    };
    let database = file.database.unwrap_or_default();
    let session = file.session.unwrap_or_default();

    // Priority 1: config.toml, Priority 2: environment
    let database_path = match database.path {
      Some(path) => {
        tracing::info!("Using database from {}: {}", config_path.display(), path);
        PathBuf::from(path)
      }
      None => match std::env::var("DATABASE_PATH") {
        Ok(path) => {
          tracing::info!("Using database from DATABASE_PATH env: {}", path);
          PathBuf::from(path)
        }
        Err(_) => {
          tracing::info!("Using default database path: {}", DEFAULT_DATABASE_PATH);
          PathBuf::from(DEFAULT_DATABASE_PATH)
        }
      },
    };

    let user_id = session
      .user_id
      .or_else(|| {
        std::env::var("MATH_DRILL_USER")
          .ok()
          .and_then(|v| v.parse().ok())
      })
      .unwrap_or(DEFAULT_USER_ID);

    Self {
      database_path,
      user_id,
      exercise_count: session.count.unwrap_or(DEFAULT_EXERCISE_COUNT),
    }
  }
}
