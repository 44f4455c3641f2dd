//! Collecting reporter for tests and embedding.

use std::sync::{Arc, Mutex, PoisonError};

use stencil_core::{
    application::ports::Reporter,
    domain::{ActionEvent, ReconciliationOutcome},
};

/// Keeps every reported event in order. Clones share the same buffer, so a
/// clone can be handed to the service and the original inspected later.
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    events: Arc<Mutex<Vec<ActionEvent>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ActionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Outcomes in reporting order.
    pub fn outcomes(&self) -> Vec<ReconciliationOutcome> {
        self.events().iter().map(ActionEvent::outcome).collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: &ActionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
