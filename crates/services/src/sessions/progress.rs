use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    /// One-based position of the current question, capped at `total`.
    pub current: usize,
    pub total: usize,
    pub percentage: u32,
    pub visited: usize,
    pub is_complete: bool,
}
