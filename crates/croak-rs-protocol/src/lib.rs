//! Wire contracts shared between the quip pipeline and its collaborators.

mod backend;
mod canonical;
mod character;
mod overlay;

/// Backend client contract.
pub use backend::QuipBackend;
/// Canonical URL reduction shared by deduplication, history, and blocklist.
pub use canonical::canonical_url;
/// Character definition types.
pub use character::{CharacterDefinition, CharacterSource};
/// Overlay contract, navigation events, and page-text sentinels.
pub use overlay::{
    NavigationEvent, NavigationStatus, OverlayError, OverlayMessage, OverlayPort,
    PAGE_TEXT_ERROR, PAGE_TEXT_MAX_LEN, PAGE_TEXT_NOT_RECEIVED, TabId,
};
