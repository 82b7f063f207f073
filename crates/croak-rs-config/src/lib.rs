//! Settings schema and loading for the quip pipeline.
//!
//! This crate owns the flat settings record, its default values, and the
//! merge-over-defaults semantics used everywhere a settings blob is read.

mod error;
mod loader;
mod model;

/// Public error type returned by settings loading APIs.
pub use error::ConfigError;
/// Settings schema models.
pub use model::{BackendKind, Settings};
