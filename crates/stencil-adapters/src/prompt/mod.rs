//! Prompter adapters.

mod fixed;
mod line;

pub use fixed::FixedPrompter;
pub use line::LinePrompter;
