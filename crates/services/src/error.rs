//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::Level;
use storage::StorageError;

/// Errors emitted by `QuizSession` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("answer index {index} is out of range for {options} options")]
    InvalidAnswer { index: usize, options: usize },
    #[error("no current question")]
    NoCurrentQuestion,
    #[error("session already completed")]
    Completed,
}

/// Strict-mode rejections when starting a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("unknown level key: {key}")]
    UnknownLevel { key: String },
    #[error("no configuration for level {level}")]
    MissingLevelConfig { level: Level },
    #[error("no questions registered for level {level}")]
    EmptyBank { level: Level },
}

/// Errors emitted while bootstrapping a `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
