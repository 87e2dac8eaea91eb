use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use quiz_core::model::{Level, LevelConfigError, Question, QuestionDraft, QuestionError, QuestionId};

/// Errors surfaced while building or loading reference data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("duplicate question id {id}")]
    DuplicateQuestion { id: QuestionId },

    #[error("invalid question {id}: {source}")]
    InvalidQuestion {
        id: QuestionId,
        #[source]
        source: QuestionError,
    },

    #[error("invalid config for level {level}: {source}")]
    InvalidLevelConfig {
        level: Level,
        #[source]
        source: LevelConfigError,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Read access to the reference question table.
pub trait QuestionRepository: Send + Sync {
    /// All questions tagged with `level`, in registration order.
    fn questions_for_level(&self, level: Level) -> Vec<&Question>;

    fn get(&self, id: QuestionId) -> Option<&Question>;
}

/// Immutable in-memory question table, built once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    by_level: HashMap<Level, Vec<usize>>,
    by_id: HashMap<QuestionId, usize>,
}

impl QuestionBank {
    /// Build a bank from validated questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateQuestion` if two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, StorageError> {
        let mut by_level: HashMap<Level, Vec<usize>> = HashMap::new();
        let mut by_id = HashMap::with_capacity(questions.len());
        for (idx, q) in questions.iter().enumerate() {
            if by_id.insert(q.id(), idx).is_some() {
                return Err(StorageError::DuplicateQuestion { id: q.id() });
            }
            by_level.entry(q.level()).or_default().push(idx);
        }

        Ok(Self {
            questions,
            by_level,
            by_id,
        })
    }

    /// Validate drafts and build a bank from them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidQuestion` for the first draft that fails validation,
    /// or `StorageError::DuplicateQuestion` on a repeated id.
    pub fn from_drafts(drafts: impl IntoIterator<Item = QuestionDraft>) -> Result<Self, StorageError> {
        let mut seen = HashSet::new();
        let mut questions = Vec::new();
        for draft in drafts {
            let id = draft.id;
            if !seen.insert(id) {
                return Err(StorageError::DuplicateQuestion { id });
            }
            let question = draft
                .validate()
                .map_err(|source| StorageError::InvalidQuestion { id, source })?;
            questions.push(question);
        }
        Self::new(questions)
    }

    /// Parse a JSON array of question drafts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` on malformed JSON, plus any error from
    /// [`QuestionBank::from_drafts`].
    pub fn from_json_str(json: &str) -> Result<Self, StorageError> {
        let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;
        Self::from_drafts(drafts)
    }

    /// Read and parse a JSON question file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read, plus any error from
    /// [`QuestionBank::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn count_for_level(&self, level: Level) -> usize {
        self.by_level.get(&level).map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

impl QuestionRepository for QuestionBank {
    fn questions_for_level(&self, level: Level) -> Vec<&Question> {
        self.by_level
            .get(&level)
            .map(|idxs| idxs.iter().map(|&i| &self.questions[i]).collect())
            .unwrap_or_default()
    }

    fn get(&self, id: QuestionId) -> Option<&Question> {
        self.by_id.get(&id).map(|&i| &self.questions[i])
    }
}
