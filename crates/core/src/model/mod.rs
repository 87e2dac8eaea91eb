mod attempt;
mod ids;
mod level;
mod question;
mod results;

pub use attempt::{AttemptRecord, Response};
pub use ids::{ParseIdError, QuestionId};
pub use level::{BandRatios, DifficultyBand, Level, LevelConfig, LevelConfigError, LevelError};
pub use question::{MAX_DIFFICULTY, MIN_DIFFICULTY, Question, QuestionDraft, QuestionError, QuestionType};
pub use results::{
    CategoryScore, DetailedAnalysis, DifficultyProgression, QuestionReview, QuizResults,
};
