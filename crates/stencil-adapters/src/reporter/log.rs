//! Reporter that forwards events to `tracing`.

use stencil_core::{
    application::ports::Reporter,
    domain::{ActionEvent, Severity},
};
use tracing::{error, info};

/// Emits one `tracing` event per action: `info` normally, `error` for
/// rejected entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: &ActionEvent) {
        let action = event.action().as_str();
        let source = event.source().display();
        let target = event.target().display();

        match event.severity() {
            Severity::Info => info!(action, %source, %target, "{}", event.message()),
            Severity::Error => error!(action, %source, %target, "{}", event.message()),
        }
    }
}
