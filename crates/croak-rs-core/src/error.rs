//! Core error type.

use croak_rs_history::StoreError;
use thiserror::Error;

/// Errors surfaced by core maintenance operations.
///
/// A navigation cycle itself never fails; it resolves to a
/// [`CycleOutcome`](crate::CycleOutcome) instead.
#[derive(Debug, Error)]
pub enum CroakCoreError {
    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
