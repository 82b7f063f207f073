//! Test helpers shared across Croak crates.

pub mod backend;
pub mod overlay;
pub mod store;

pub use backend::{FixedBackend, RecordedCall};
pub use overlay::{PageTextScript, ShownQuip, StubOverlay};
pub use store::MemoryQuipStore;
