/// What the taker did with a question slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Response {
    /// Never submitted or skipped.
    #[default]
    Unvisited,
    /// Skipped; scored as incorrect and excluded from the accuracy denominator.
    Skipped,
    /// Chosen option index.
    Answered(usize),
}

/// Per-question attempt slot: the recorded response and time spent on it.
///
/// One record exists for every selected question, addressed by the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptRecord {
    response: Response,
    elapsed_ms: u64,
}

impl AttemptRecord {
    #[must_use]
    pub fn response(&self) -> Response {
        self.response
    }

    /// The chosen option, or `None` for skipped and unvisited slots.
    #[must_use]
    pub fn answer(&self) -> Option<usize> {
        match self.response {
            Response::Answered(option) => Some(option),
            Response::Skipped | Response::Unvisited => None,
        }
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    #[must_use]
    pub fn is_visited(&self) -> bool {
        !matches!(self.response, Response::Unvisited)
    }

    pub fn record_answer(&mut self, option: usize, elapsed_ms: u64) {
        self.response = Response::Answered(option);
        self.elapsed_ms = elapsed_ms;
    }

    pub fn record_skip(&mut self, elapsed_ms: u64) {
        self.response = Response::Skipped;
        self.elapsed_ms = elapsed_ms;
    }
}
