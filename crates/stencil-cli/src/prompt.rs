//! Picks the prompter for a run.

use std::io::IsTerminal as _;

use stencil_adapters::{FixedPrompter, LinePrompter};
use stencil_core::{application::ports::Prompter, domain::ExistingPolicy};

/// Prompter matching the run's policy.
///
/// Only `Prompt` ever asks. On an interactive terminal (with the
/// `interactive` feature) questions use `dialoguer`; otherwise answers are
/// read line by line from stdin, which lets scripts pipe them in.
pub fn for_policy(policy: ExistingPolicy) -> Box<dyn Prompter> {
    match policy {
        ExistingPolicy::Skip | ExistingPolicy::Overwrite => Box::new(FixedPrompter::no()),
        ExistingPolicy::Prompt if std::io::stdin().is_terminal() => terminal_prompter(),
        ExistingPolicy::Prompt => Box::new(LinePrompter::terminal()),
    }
}

#[cfg(feature = "interactive")]
fn terminal_prompter() -> Box<dyn Prompter> {
    Box::new(dialog::DialogPrompter)
}

#[cfg(not(feature = "interactive"))]
fn terminal_prompter() -> Box<dyn Prompter> {
    Box::new(LinePrompter::terminal())
}

#[cfg(feature = "interactive")]
mod dialog {
    use dialoguer::Confirm;
    use stencil_core::{
        application::{ApplicationError, ports::Prompter},
        error::StencilResult,
    };

    /// Yes/no questions through `dialoguer` on stderr.
    #[derive(Debug, Clone, Copy)]
    pub struct DialogPrompter;

    impl Prompter for DialogPrompter {
        fn confirm(&self, question: &str, default: Option<bool>) -> StencilResult<bool> {
            let mut confirm = Confirm::new().with_prompt(question).show_default(true);
            if let Some(default) = default {
                confirm = confirm.default(default);
            }
            confirm.interact().map_err(|e| {
                ApplicationError::Prompt {
                    reason: e.to_string(),
                }
                .into()
            })
        }
    }
}
