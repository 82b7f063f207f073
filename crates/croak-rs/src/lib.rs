//! Public surface for the Croak quip pipeline.
//!
//! Re-exports the building blocks so embedders depend on one crate.

/// Re-export for convenience.
pub use croak_rs_backend as backend;
/// Re-export for convenience.
pub use croak_rs_config as config;
pub use croak_rs_core as core;
/// Re-export for convenience.
pub use croak_rs_history as history;
/// Re-export for convenience.
pub use croak_rs_protocol as protocol;
