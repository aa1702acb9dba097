//! Practice session controller.
//!
//! Owns the learner's mastery map for the length of a session, lends it to
//! the active strategy, and persists every changed record and attempt
//! through a [`MasteryStore`] on the blocking pool.

use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::curriculum::{Curriculum, ExerciseStrategy, Level};
use crate::db::LogOnError;
use crate::domain::{
  Exercise, ExerciseAttempt, FactMastery, MasteryMap, Operation, ResultDescription, SessionResult,
  StarProgress, NOT_RECOGNIZED,
};
use crate::error::{EngineError, Result};
use crate::store::MasteryStore;
use crate::strategy::{create_strategy, ExerciseProvider, SmartPracticeStrategy};

const DEFAULT_DIFFICULTY: u32 = 10;

/// What to practice and for how long
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseConfig {
  pub operation: Operation,
  /// Number range hint for callers; the adaptive strategies size exercises
  /// from their level instead
  pub difficulty: u32,
  pub count: usize,
  /// `None` practices the whole curriculum for `operation`
  pub level_id: Option<String>,
  /// Overrides the level's own strategy kind
  pub strategy: Option<ExerciseStrategy>,
}

impl ExerciseConfig {
  pub fn new(operation: Operation, count: usize) -> Self {
    Self {
      operation,
      difficulty: DEFAULT_DIFFICULTY,
      count,
      level_id: None,
      strategy: None,
    }
  }

  pub fn with_level(mut self, level_id: impl Into<String>) -> Self {
    self.level_id = Some(level_id.into());
    self
  }

  pub fn with_strategy(mut self, strategy: ExerciseStrategy) -> Self {
    self.strategy = Some(strategy);
    self
  }
}

pub struct PracticeSession {
  config: ExerciseConfig,
  user_id: i64,
  store: Arc<dyn MasteryStore>,
  clock: Arc<dyn Clock>,
  provider: Box<dyn ExerciseProvider>,
  mastery: MasteryMap,
  level: Option<Arc<dyn Level>>,
  initial_stars: Option<u8>,
  current: Option<Exercise>,
  presented: usize,
  results: Vec<ResultDescription>,
  attempts: Vec<ExerciseAttempt>,
}

impl PracticeSession {
  /// Load the user's mastery and build the strategy `config` asks for
  pub async fn initialize(
    config: ExerciseConfig,
    user_id: i64,
    curriculum: &Curriculum,
    store: Arc<dyn MasteryStore>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
  ) -> Result<Self> {
    let mastery = load_mastery(&store, user_id).await?;

    let level = match &config.level_id {
      Some(id) => Some(
        curriculum
          .level(id)
          .cloned()
          .ok_or_else(|| EngineError::UnknownLevel(id.clone()))?,
      ),
      None => None,
    };

    let provider: Box<dyn ExerciseProvider> = match &level {
      Some(level) => create_strategy(
        Arc::clone(level),
        config.strategy,
        &mastery,
        user_id,
        Arc::clone(&clock),
        rng,
      )?,
      None => Box::new(SmartPracticeStrategy::new(
        curriculum.levels_for(config.operation),
        user_id,
        Arc::clone(&clock),
        rng,
      )?),
    };

    tracing::info!(
      "Starting {} session for user {}: {} x {} ({})",
      provider.name(),
      user_id,
      config.count,
      config.operation.as_str(),
      config.level_id.as_deref().unwrap_or("all levels")
    );

    Ok(Self::assemble(config, user_id, store, clock, provider, mastery, level))
  }

  /// Session over a caller-built provider, such as a fixed exercise list
  pub async fn with_provider(
    config: ExerciseConfig,
    user_id: i64,
    provider: Box<dyn ExerciseProvider>,
    store: Arc<dyn MasteryStore>,
    clock: Arc<dyn Clock>,
  ) -> Result<Self> {
    let mastery = load_mastery(&store, user_id).await?;
    tracing::info!("Starting {} session for user {}", provider.name(), user_id);
    Ok(Self::assemble(config, user_id, store, clock, provider, mastery, None))
  }

  fn assemble(
    config: ExerciseConfig,
    user_id: i64,
    store: Arc<dyn MasteryStore>,
    clock: Arc<dyn Clock>,
    provider: Box<dyn ExerciseProvider>,
    mastery: MasteryMap,
    level: Option<Arc<dyn Level>>,
  ) -> Self {
    let initial_stars = level.as_ref().map(|l| l.calculate_stars(&mastery));
    Self {
      config,
      user_id,
      store,
      clock,
      provider,
      mastery,
      level,
      initial_stars,
      current: None,
      presented: 0,
      results: Vec::new(),
      attempts: Vec::new(),
    }
  }

  pub fn strategy_name(&self) -> &'static str {
    self.provider.name()
  }

  pub fn mastery(&self) -> &MasteryMap {
    &self.mastery
  }

  pub fn working_set(&self) -> &[String] {
    self.provider.working_set()
  }

  pub fn results(&self) -> &[ResultDescription] {
    &self.results
  }

  /// Attempts answered in this session
  pub fn attempts(&self) -> &[ExerciseAttempt] {
    &self.attempts
  }

  pub fn current(&self) -> Option<&Exercise> {
    self.current.as_ref()
  }

  pub fn is_complete(&self) -> bool {
    self.presented >= self.config.count && self.current.is_none()
  }

  /// The exercise to show next. An unanswered exercise is shown again.
  pub fn next(&mut self) -> Result<Option<Exercise>> {
    if let Some(current) = &self.current {
      return Ok(Some(current.clone()));
    }
    if self.presented >= self.config.count {
      return Ok(None);
    }

    let exercise = self.provider.next_exercise(&self.mastery)?;
    if let Some(exercise) = &exercise {
      self.presented += 1;
      self.current = Some(exercise.clone());
    }
    Ok(exercise)
  }

  /// Answer the current exercise.
  ///
  /// Returns `None` when nothing is waiting for an answer. An unreadable
  /// answer is reported but leaves the exercise open for another try.
  pub async fn submit(&mut self, answer: i32, elapsed_ms: u64) -> Result<Option<ResultDescription>> {
    let Some(mut exercise) = self.current.take() else {
      return Ok(None);
    };

    if answer == NOT_RECOGNIZED {
      exercise.solve(NOT_RECOGNIZED, None);
      let description = ResultDescription::of(&exercise);
      self.current = Some(exercise);
      return Ok(Some(description));
    }

    let was_correct = exercise.solve(answer, Some(elapsed_ms));
    let updated = self
      .provider
      .record_attempt(&mut self.mastery, &exercise, was_correct)?;
    let attempt = ExerciseAttempt::from_exercise(
      self.user_id,
      &exercise,
      answer,
      elapsed_ms,
      self.clock.now(),
    );

    self.persist(attempt.clone(), updated).await;

    let description = ResultDescription::of(&exercise);
    self.attempts.push(attempt);
    self.results.push(description.clone());
    Ok(Some(description))
  }

  /// Failures are logged; the in-memory session stays authoritative
  async fn persist(&self, attempt: ExerciseAttempt, updated: Vec<FactMastery>) {
    let store = Arc::clone(&self.store);
    let outcome = tokio::task::spawn_blocking(move || -> Result<()> {
      store
        .record_attempt(&attempt)
        .log_warn("Failed to record attempt");
      store.save_mastery(&updated)
    })
    .await;

    match outcome {
      Ok(saved) => {
        saved.log_warn("Failed to save mastery");
      }
      Err(e) => tracing::warn!("Persistence task failed: {}", e),
    }
  }

  /// Close the session and report what happened
  pub fn finish(self) -> SessionResult {
    let star_progress = match (&self.level, self.initial_stars) {
      (Some(level), Some(initial_stars)) => Some(StarProgress {
        initial_stars,
        final_stars: level.calculate_stars(&self.mastery),
      }),
      _ => None,
    };

    let result = SessionResult {
      results: self.results,
      star_progress,
    };
    tracing::info!(
      "Finished {} session for user {}: {}/{} correct",
      self.provider.name(),
      self.user_id,
      result.correct_count(),
      result.results.len()
    );
    result
  }
}

async fn load_mastery(store: &Arc<dyn MasteryStore>, user_id: i64) -> Result<MasteryMap> {
  let store = Arc::clone(store);
  tokio::task::spawn_blocking(move || store.load_mastery(user_id)).await?
}
