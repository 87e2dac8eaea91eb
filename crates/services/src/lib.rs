#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{ConfigurationError, ServiceError, SessionError};

pub use sessions::{
    QuestionSelector, QuizService, QuizSession, SelectionPlan, SessionProgress, SessionState,
};
