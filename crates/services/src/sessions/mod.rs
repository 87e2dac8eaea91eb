mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{QuestionSelector, SelectionPlan};
pub use progress::SessionProgress;
pub use service::{QuizSession, SessionState};
pub use workflow::QuizService;
