//! Overlay collaborator contract: quip delivery and page-text extraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host-assigned tab identifier.
pub type TabId = u64;

/// Page load state reported by a navigation event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NavigationStatus {
    /// The page is still loading; never triggers a cycle.
    Loading,
    /// The page finished loading.
    Complete,
}

/// A single tab navigation notification from the host browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationEvent {
    /// Tab the navigation happened in.
    pub tab_id: TabId,
    /// Full page URL at the time of the event.
    pub url: String,
    /// Load state carried by the event.
    pub status: NavigationStatus,
}

impl NavigationEvent {
    /// Convenience constructor for a completed page load.
    pub fn complete(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            status: NavigationStatus::Complete,
        }
    }
}

/// Maximum page-text length the overlay may return.
pub const PAGE_TEXT_MAX_LEN: usize = 4000;

/// Sentinel for a page-text reply that was malformed or missing.
pub const PAGE_TEXT_NOT_RECEIVED: &str = "[Page content not received]";

/// Sentinel for a page-text request that errored or timed out.
pub const PAGE_TEXT_ERROR: &str = "[Error retrieving page content]";

/// Messages exchanged with the in-page overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OverlayMessage {
    /// Display or update the character bubble.
    #[serde(rename = "SHOW_QUIP", rename_all = "camelCase")]
    ShowQuip {
        /// Text for the bubble; may itself be a diagnostic sentence.
        quip: String,
        /// Resolved image reference for the character.
        image_path: String,
    },
    /// Request visible page text, truncated to [`PAGE_TEXT_MAX_LEN`].
    #[serde(rename = "GET_PAGE_TEXT")]
    GetPageText,
}

/// Errors surfaced by overlay delivery and page-text extraction.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// The page has no active listener; callers swallow this case.
    #[error("no listener on target page")]
    NoListener,
    /// The overlay did not answer within the caller's deadline.
    #[error("overlay response timeout")]
    Timeout,
    /// Any other transport failure.
    #[error("overlay transport error: {0}")]
    Transport(String),
}

#[async_trait]
/// Delivery and extraction port implemented by the page overlay host.
pub trait OverlayPort: Send + Sync {
    /// Show a quip bubble on the given tab.
    async fn show_quip(
        &self,
        tab_id: TabId,
        quip: &str,
        image_path: &str,
    ) -> Result<(), OverlayError>;

    /// Extract visible page text from the given tab.
    async fn page_text(&self, tab_id: TabId) -> Result<String, OverlayError>;
}
