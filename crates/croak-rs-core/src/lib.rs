//! Core pipeline: character registry, prompt assembly, and the navigation
//! orchestrator.

pub mod characters;
mod error;
mod orchestrator;
pub mod prompt;
pub mod quips;

pub use error::CroakCoreError;
pub use orchestrator::{BackendFactory, CycleOutcome, DEFAULT_PAGE_TEXT_TIMEOUT, Orchestrator};
