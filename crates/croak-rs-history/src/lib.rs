//! Quip history, blocklist, rate limiting, and two-scope persistence.

mod blocklist;
mod error;
mod model;
pub mod ratelimit;
mod store;

pub use blocklist::BlockedUrlSet;
pub use error::StoreError;
pub use model::{HistoryEntry, append, digest_for};
pub use store::{JsonFileStore, QuipStore};
