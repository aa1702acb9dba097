use crate::domain::FactIdError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  #[error("level {0} has no facts to practice")]
  EmptyLevel(String),

  #[error("no levels to practice")]
  EmptyCurriculum,

  #[error("unknown level: {0}")]
  UnknownLevel(String),

  #[error(transparent)]
  MalformedFactId(#[from] FactIdError),

  #[error("storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("database unavailable")]
  Lock,

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
