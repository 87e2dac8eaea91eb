//! Built-in reference question set, embedded at compile time.

use crate::repository::{QuestionBank, StorageError};

const BUILTIN_QUESTIONS: &str = include_str!("../data/questions.json");

/// Load the embedded question set.
///
/// The set is intentionally smaller than every level's target count, so sessions
/// built from it exercise the short-bank path.
///
/// # Errors
///
/// Returns `StorageError` if the embedded data fails to parse or validate.
pub fn builtin_bank() -> Result<QuestionBank, StorageError> {
    QuestionBank::from_json_str(BUILTIN_QUESTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::QuestionRepository;
    use quiz_core::model::Level;

    #[test]
    fn builtin_bank_loads_every_level() {
        let bank = builtin_bank().unwrap();
        for level in Level::ALL {
            assert!(bank.count_for_level(level) > 0, "{level} has no questions");
            for q in bank.questions_for_level(level) {
                assert_eq!(q.level(), level);
                assert!(q.accepts(q.correct_answer()));
            }
        }
    }
}
