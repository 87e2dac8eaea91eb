use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::level::{DifficultyBand, Level};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least two options, got {len}")]
    TooFewOptions { len: usize },

    #[error("correct answer index {index} is out of range for {options} options")]
    CorrectAnswerOutOfRange { index: usize, options: usize },

    #[error("difficulty must be between 1 and 10, got {provided}")]
    InvalidDifficulty { provided: u8 },

    #[error("time limit must be > 0")]
    InvalidTimeLimit,
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// Cognitive area a question exercises; results are broken down by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Spatial,
    Logical,
    Abstract,
    Numerical,
    Verbal,
    Memory,
}

impl QuestionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Spatial => "spatial",
            QuestionType::Logical => "logical",
            QuestionType::Abstract => "abstract",
            QuestionType::Numerical => "numerical",
            QuestionType::Verbal => "verbal",
            QuestionType::Memory => "memory",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question record, as authored or loaded from a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub level: Level,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub time_limit_secs: u32,
    pub difficulty: u8,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is blank, there are fewer than two options,
    /// the correct index does not address an option, the difficulty is outside 1-10,
    /// or the time limit is zero.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                len: self.options.len(),
            });
        }
        if self.correct_answer >= self.options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: self.correct_answer,
                options: self.options.len(),
            });
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty) {
            return Err(QuestionError::InvalidDifficulty {
                provided: self.difficulty,
            });
        }
        if self.time_limit_secs == 0 {
            return Err(QuestionError::InvalidTimeLimit);
        }

        Ok(Question {
            id: self.id,
            level: self.level,
            question_type: self.question_type,
            prompt: self.prompt,
            options: self.options,
            correct_answer: self.correct_answer,
            time_limit_secs: self.time_limit_secs,
            difficulty: self.difficulty,
            explanation: self.explanation,
            category: self.category,
            hints: self.hints,
        })
    }
}

/// Immutable reference question. Only constructible through `QuestionDraft::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    level: Level,
    #[serde(rename = "type")]
    question_type: QuestionType,
    prompt: String,
    options: Vec<String>,
    correct_answer: usize,
    time_limit_secs: u32,
    difficulty: u8,
    explanation: String,
    category: String,
    hints: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    #[must_use]
    pub fn band(&self) -> DifficultyBand {
        DifficultyBand::of(self.difficulty)
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Whether `option` addresses one of this question's options.
    #[must_use]
    pub fn accepts(&self, option: usize) -> bool {
        option < self.options.len()
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
