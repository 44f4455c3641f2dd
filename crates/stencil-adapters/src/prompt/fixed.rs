//! Non-interactive prompter.

use stencil_core::{application::ports::Prompter, error::StencilResult};
use tracing::debug;

/// Answers every question the same way without asking anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrompter {
    answer: bool,
}

impl FixedPrompter {
    pub fn new(answer: bool) -> Self {
        Self { answer }
    }

    pub fn yes() -> Self {
        Self::new(true)
    }

    pub fn no() -> Self {
        Self::new(false)
    }
}

impl Prompter for FixedPrompter {
    fn confirm(&self, question: &str, _default: Option<bool>) -> StencilResult<bool> {
        debug!(question, answer = self.answer, "Answering prompt");
        Ok(self.answer)
    }
}
