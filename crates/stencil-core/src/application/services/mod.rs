//! Application services - orchestrate use cases.
//!
//! `ScaffoldService` walks the source trees and hands every entry to a
//! `Reconciler`, which decides what happens at the entry's target path.

pub mod reconciler;
pub mod scaffold_service;

pub use reconciler::{Change, Reconciler, Resolution, TargetState, resolve};
pub use scaffold_service::ScaffoldService;
