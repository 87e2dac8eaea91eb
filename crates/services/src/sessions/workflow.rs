use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{Level, LevelConfig, Question};
use storage::seed::builtin_bank;
use storage::{LevelCatalog, QuestionRepository};

use super::plan::QuestionSelector;
use super::service::QuizSession;
use crate::error::{ConfigurationError, ServiceError};

/// Entry point for callers: owns the reference data and starts attempts.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    bank: Arc<dyn QuestionRepository>,
    catalog: LevelCatalog,
}

impl QuizService {
    #[must_use]
    pub fn new(bank: Arc<dyn QuestionRepository>, catalog: LevelCatalog) -> Self {
        Self {
            clock: Clock::system(),
            bank,
            catalog,
        }
    }

    /// Service over the embedded question set and built-in level table.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the embedded data fails to load.
    pub fn builtin() -> Result<Self, ServiceError> {
        Ok(Self::new(Arc::new(builtin_bank()?), LevelCatalog::builtin()))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Stratified question list for `level`; empty if the level is unconfigured or has no questions.
    #[must_use]
    pub fn select_questions(&self, level: Level) -> Vec<Question> {
        self.catalog
            .get(level)
            .map(|config| self.selector().select(config).questions)
            .unwrap_or_default()
    }

    /// Like [`QuizService::select_questions`], addressed by key. Unknown keys yield an empty list.
    #[must_use]
    pub fn select_questions_by_key(&self, key: &str) -> Vec<Question> {
        match self.catalog.get_by_key(key) {
            Some(config) => self.selector().select(config).questions,
            None => {
                log::warn!("unknown level key {key:?}, no questions selected");
                Vec::new()
            }
        }
    }

    /// Start an attempt. A level without questions yields a `NoContent` session.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingLevelConfig` if the catalog has no entry for `level`;
    /// a session cannot be timed or scored without one.
    pub fn start_session(&self, level: Level) -> Result<QuizSession, ConfigurationError> {
        let config = self.config_for(level)?;
        let plan = self.selector().select(config);
        if plan.is_empty() {
            log::warn!("no questions available for {level}");
        } else if plan.total() < config.target_count() as usize {
            log::warn!(
                "{level} session has {} of {} configured questions",
                plan.total(),
                config.target_count()
            );
        }
        Ok(QuizSession::new(config.clone(), plan.questions, self.clock))
    }

    /// Start an attempt from a caller-supplied level key. An unknown key yields a
    /// `NoContent` session without a level.
    ///
    /// # Errors
    ///
    /// Any error from [`QuizService::start_session`] for a recognized key.
    pub fn start_session_by_key(&self, key: &str) -> Result<QuizSession, ConfigurationError> {
        match key.parse::<Level>() {
            Ok(level) => self.start_session(level),
            Err(_) => {
                log::warn!("unknown level key {key:?}, starting an empty session");
                Ok(QuizSession::without_level(self.clock))
            }
        }
    }

    /// Like [`QuizService::start_session_by_key`], rejecting unknown keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownLevel` if `key` names no level, plus any error
    /// from [`QuizService::start_session`].
    pub fn start_session_by_key_strict(&self, key: &str) -> Result<QuizSession, ConfigurationError> {
        let level = key
            .parse::<Level>()
            .map_err(|_| ConfigurationError::UnknownLevel {
                key: key.to_owned(),
            })?;
        self.start_session(level)
    }

    /// Start an attempt, rejecting levels that cannot supply any question.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingLevelConfig` or `ConfigurationError::EmptyBank`.
    pub fn start_session_strict(&self, level: Level) -> Result<QuizSession, ConfigurationError> {
        self.config_for(level)?;
        if self.bank.questions_for_level(level).is_empty() {
            return Err(ConfigurationError::EmptyBank { level });
        }
        self.start_session(level)
    }

    fn config_for(&self, level: Level) -> Result<&LevelConfig, ConfigurationError> {
        self.catalog
            .get(level)
            .ok_or(ConfigurationError::MissingLevelConfig { level })
    }

    fn selector(&self) -> QuestionSelector<'_> {
        QuestionSelector::new(self.bank.as_ref())
    }
}
