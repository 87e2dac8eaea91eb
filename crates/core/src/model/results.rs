use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::ids::QuestionId;
use crate::model::level::Level;
use crate::model::question::QuestionType;

/// Correct/total tally for one question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Correctly answered questions per difficulty band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DifficultyProgression {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

/// Outcome of a single question, in session order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub chosen: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    /// Correct over answered, in percent.
    pub accuracy: f64,
    /// Seconds, over every selected question.
    pub avg_time_per_question: f64,
    pub strengths: Vec<QuestionType>,
    pub weaknesses: Vec<QuestionType>,
    pub recommendations: Vec<String>,
    pub difficulty_progression: DifficultyProgression,
}

/// Result snapshot handed back to the caller once per attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResults {
    /// `None` for an attempt started from an unrecognized level key.
    pub level: Option<Level>,
    /// Accuracy rounded to a whole percent.
    pub score: u32,
    pub correct_count: u32,
    pub answered_count: u32,
    pub total_questions: u32,
    /// Whole seconds since the session started.
    pub time_spent: u64,
    pub percentile: u32,
    pub iq_estimate: u32,
    pub passed: bool,
    pub detailed_analysis: DetailedAnalysis,
    pub category_scores: BTreeMap<QuestionType, CategoryScore>,
    pub question_reviews: Vec<QuestionReview>,
}
