//! Reporter adapters.

mod log;
mod memory;

pub use log::TracingReporter;
pub use memory::MemoryReporter;
