use chrono::{DateTime, Duration, Utc};
use std::fmt;

use quiz_core::Clock;
use quiz_core::model::{AttemptRecord, Level, LevelConfig, Question, QuizResults};
use quiz_core::scoring;
use quiz_core::time::elapsed_ms;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz attempt. A session is live from construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The level had no questions to offer; nothing can be answered.
    NoContent,
    InProgress,
    /// Results were computed; the session accepts no further input.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    At(usize),
    /// Past the last question.
    Finished,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt: steps through the selected questions, records an answer or skip
/// and the time spent for each, and produces a result snapshot once.
///
/// Every time-dependent operation has an `_at` variant taking an explicit timestamp;
/// the plain variant reads the session clock.
pub struct QuizSession {
    config: Option<LevelConfig>,
    questions: Vec<Question>,
    records: Vec<AttemptRecord>,
    cursor: Cursor,
    clock: Clock,
    started_at: DateTime<Utc>,
    question_started_at: DateTime<Utc>,
    results: Option<QuizResults>,
}

impl QuizSession {
    /// Start an attempt over `questions`. An empty list yields a `NoContent` session.
    #[must_use]
    pub fn new(config: LevelConfig, questions: Vec<Question>, clock: Clock) -> Self {
        Self::build(Some(config), questions, clock)
    }

    /// A `NoContent` session with no level behind it, for callers that named an unknown level.
    ///
    /// It has no time budget and scores to [`scoring::unleveled_results`].
    #[must_use]
    pub fn without_level(clock: Clock) -> Self {
        Self::build(None, Vec::new(), clock)
    }

    fn build(config: Option<LevelConfig>, questions: Vec<Question>, clock: Clock) -> Self {
        let started_at = clock.now();
        let records = vec![AttemptRecord::default(); questions.len()];
        let cursor = if questions.is_empty() {
            Cursor::Finished
        } else {
            Cursor::At(0)
        };

        Self {
            config,
            questions,
            records,
            cursor,
            clock,
            started_at,
            question_started_at: started_at,
            results: None,
        }
    }

    #[must_use]
    pub fn level(&self) -> Option<Level> {
        self.config.as_ref().map(LevelConfig::level)
    }

    #[must_use]
    pub fn config(&self) -> Option<&LevelConfig> {
        self.config.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Zero-based cursor; equals `total_questions()` once every question was consumed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        match self.cursor {
            Cursor::At(i) => i,
            Cursor::Finished => self.questions.len(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.results.is_some() {
            SessionState::Completed
        } else if self.questions.is_empty() {
            SessionState::NoContent
        } else {
            SessionState::InProgress
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.results.is_some()
    }

    /// True once the cursor has moved past the last question.
    #[must_use]
    pub fn is_all_visited(&self) -> bool {
        self.cursor == Cursor::Finished
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.cursor {
            Cursor::At(i) => self.questions.get(i),
            Cursor::Finished => None,
        }
    }

    #[must_use]
    pub fn results(&self) -> Option<&QuizResults> {
        self.results.as_ref()
    }

    //
    // ─── ANSWERING ────────────────────────────────────────────────────────────
    //

    /// Record `option` for the current question and advance.
    ///
    /// Returns whether more questions remain.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` if results were already computed.
    /// - `SessionError::NoCurrentQuestion` if the cursor is past the last question.
    /// - `SessionError::InvalidAnswer` if `option` does not address one of the question's options.
    pub fn submit_answer(&mut self, option: usize) -> Result<bool, SessionError> {
        let now = self.clock.now();
        self.submit_answer_at(option, now)
    }

    /// Same as [`QuizSession::submit_answer`] at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::submit_answer`].
    pub fn submit_answer_at(&mut self, option: usize, now: DateTime<Utc>) -> Result<bool, SessionError> {
        let index = self.writable_index()?;
        let options = self.questions[index].options().len();
        if option >= options {
            return Err(SessionError::InvalidAnswer {
                index: option,
                options,
            });
        }

        let elapsed = elapsed_ms(self.question_started_at, now);
        self.records[index].record_answer(option, elapsed);
        log::debug!("question {index}: answered {option} in {elapsed} ms");
        Ok(self.advance(index, now))
    }

    /// Record a skip for the current question and advance. Skips score as incorrect.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` if results were already computed.
    /// - `SessionError::NoCurrentQuestion` if the cursor is past the last question.
    pub fn skip_question(&mut self) -> Result<bool, SessionError> {
        let now = self.clock.now();
        self.skip_question_at(now)
    }

    /// Same as [`QuizSession::skip_question`] at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::skip_question`].
    pub fn skip_question_at(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        let index = self.writable_index()?;
        let elapsed = elapsed_ms(self.question_started_at, now);
        self.records[index].record_skip(elapsed);
        log::debug!("question {index}: skipped after {elapsed} ms");
        Ok(self.advance(index, now))
    }

    /// Step back one question without clearing what was recorded there.
    ///
    /// Returns `false` when already at the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if results were already computed.
    pub fn go_to_previous_question(&mut self) -> Result<bool, SessionError> {
        let now = self.clock.now();
        self.go_to_previous_question_at(now)
    }

    /// Same as [`QuizSession::go_to_previous_question`] at an explicit timestamp.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::go_to_previous_question`].
    pub fn go_to_previous_question_at(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let current = self.current_index();
        if current == 0 {
            return Ok(false);
        }

        self.cursor = Cursor::At(current - 1);
        self.question_started_at = now;
        log::debug!("moved back to question {}", current - 1);
        Ok(true)
    }

    fn writable_index(&self) -> Result<usize, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        match self.cursor {
            Cursor::At(i) => Ok(i),
            Cursor::Finished => Err(SessionError::NoCurrentQuestion),
        }
    }

    fn advance(&mut self, index: usize, now: DateTime<Utc>) -> bool {
        let next = index + 1;
        self.cursor = if next < self.questions.len() {
            Cursor::At(next)
        } else {
            Cursor::Finished
        };
        self.question_started_at = now;
        !self.is_all_visited()
    }

    //
    // ─── TIMING & PROGRESS ────────────────────────────────────────────────────
    //

    /// Position snapshot. `current` is one-based and stays at `total` once every
    /// question was consumed, rather than reporting `total + 1`.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let current = (self.current_index() + 1).min(total);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let percentage = if total == 0 {
            0
        } else {
            (current as f64 / total as f64 * 100.0).round() as u32
        };

        SessionProgress {
            current,
            total,
            percentage,
            visited: self.records.iter().filter(|r| r.is_visited()).count(),
            is_complete: self.is_complete(),
        }
    }

    /// Time left in the level's session budget. Informational: the session never ends itself.
    ///
    /// A session without a level has no budget and always reports zero.
    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.time_remaining_at(self.clock.now())
    }

    /// Same as [`QuizSession::time_remaining`] at an explicit timestamp.
    #[must_use]
    pub fn time_remaining_at(&self, now: DateTime<Utc>) -> Duration {
        let Some(config) = &self.config else {
            return Duration::zero();
        };
        let used = now - self.started_at;
        (config.duration() - used).max(Duration::zero())
    }

    #[must_use]
    pub fn is_time_up(&self) -> bool {
        self.time_remaining() <= Duration::zero()
    }

    /// Time left on the current question's own limit, or `None` past the last question.
    #[must_use]
    pub fn current_question_time_remaining(&self) -> Option<Duration> {
        self.current_question_time_remaining_at(self.clock.now())
    }

    /// Same as [`QuizSession::current_question_time_remaining`] at an explicit timestamp.
    #[must_use]
    pub fn current_question_time_remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let question = self.current_question()?;
        let limit = Duration::seconds(i64::from(question.time_limit_secs()));
        Some((limit - (now - self.question_started_at)).max(Duration::zero()))
    }

    //
    // ─── RESULTS ──────────────────────────────────────────────────────────────
    //

    /// Score the attempt and complete the session.
    ///
    /// Valid mid-session: only what was recorded so far is scored. Later calls return
    /// the first snapshot unchanged.
    pub fn calculate_results(&mut self) -> &QuizResults {
        let now = self.clock.now();
        self.calculate_results_at(now)
    }

    /// Same as [`QuizSession::calculate_results`] at an explicit timestamp.
    pub fn calculate_results_at(&mut self, now: DateTime<Utc>) -> &QuizResults {
        let results = match self.results.take() {
            Some(existing) => existing,
            None => {
                let elapsed = now - self.started_at;
                let results = match &self.config {
                    Some(config) => {
                        scoring::synthesize(config, &self.questions, &self.records, elapsed)
                    }
                    None => scoring::unleveled_results(elapsed),
                };
                log::info!(
                    "{} session finished: {}/{} correct, accuracy {:.1}%, iq {}, percentile {}",
                    results.level.map_or_else(|| "unleveled".to_owned(), |l| l.to_string()),
                    results.correct_count,
                    results.total_questions,
                    results.detailed_analysis.accuracy,
                    results.iq_estimate,
                    results.percentile
                );
                results
            }
        };
        self.results.insert(results)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("level", &self.level())
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("started_at", &self.started_at)
            .field("completed", &self.results.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
