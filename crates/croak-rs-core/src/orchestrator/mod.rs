//! Navigation orchestrator: runs one generation cycle per qualifying page
//! load, from eligibility gates through overlay delivery.

mod tabs;

use crate::error::CroakCoreError;
use crate::{characters, prompt, quips};
use chrono::Utc;
use croak_rs_config::Settings;
use croak_rs_history::{BlockedUrlSet, HistoryEntry, QuipStore, append, digest_for, ratelimit};
use croak_rs_protocol::{
    CharacterDefinition, CharacterSource, NavigationEvent, NavigationStatus, OverlayError,
    OverlayPort, PAGE_TEXT_ERROR, PAGE_TEXT_MAX_LEN, QuipBackend, TabId, canonical_url,
};
use log::{debug, error, info, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tabs::TabTracker;

/// How long to wait for captured page text before giving up.
pub const DEFAULT_PAGE_TEXT_TIMEOUT: Duration = Duration::from_secs(3);

/// Builds a backend client for the current settings snapshot.
///
/// Resolved fresh on every cycle so settings changes take effect without a
/// restart.
pub trait BackendFactory: Send + Sync {
    /// Create a client matching the settings' backend selection.
    fn create(&self, settings: &Settings) -> Arc<dyn QuipBackend>;
}

/// Terminal state of one navigation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A quip (or in-band diagnostic sentence) reached the overlay stage.
    Delivered {
        /// The text handed to the overlay.
        quip: String,
    },
    /// The event was not a completed navigation.
    Ignored,
    /// The tab already ran a cycle for this canonical URL.
    DuplicateUrl,
    /// The URL is not a web page.
    InvalidUrl,
    /// The canonical URL is on the user's blocklist.
    BlockedUrl,
    /// The appearance chance draw failed.
    ChanceSkipped,
    /// No character could be resolved.
    NoCharacter,
    /// The metered backend hit a request ceiling.
    RateLimited,
    /// Persistence failed before generation could start.
    StoreUnavailable,
}

/// Drives the quip pipeline.
pub struct Orchestrator {
    store: Arc<dyn QuipStore>,
    overlay: Arc<dyn OverlayPort>,
    backends: Arc<dyn BackendFactory>,
    tabs: TabTracker,
    /// Prefix joined onto built-in character image paths.
    asset_base: String,
    page_text_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        store: Arc<dyn QuipStore>,
        overlay: Arc<dyn OverlayPort>,
        backends: Arc<dyn BackendFactory>,
        asset_base: impl Into<String>,
    ) -> Self {
        Self {
            store,
            overlay,
            backends,
            tabs: TabTracker::default(),
            asset_base: asset_base.into(),
            page_text_timeout: DEFAULT_PAGE_TEXT_TIMEOUT,
        }
    }

    /// Override the page text deadline.
    pub fn with_page_text_timeout(mut self, timeout: Duration) -> Self {
        self.page_text_timeout = timeout;
        self
    }

    /// Forget a closed tab.
    pub fn remove_tab(&self, tab_id: TabId) {
        debug!("forgetting closed tab (tab_id={tab_id})");
        self.tabs.remove(tab_id);
    }

    /// Run one cycle for a navigation event.
    ///
    /// Never fails: every exit is a [`CycleOutcome`], and store or overlay
    /// trouble is logged rather than propagated.
    pub async fn on_navigation(&self, event: &NavigationEvent) -> CycleOutcome {
        if event.status != NavigationStatus::Complete {
            return CycleOutcome::Ignored;
        }
        let Some(canonical) = canonical_url(&event.url) else {
            debug!("ignoring non-web navigation (url={})", event.url);
            return CycleOutcome::InvalidUrl;
        };
        if !self.tabs.record_if_new(event.tab_id, &canonical) {
            debug!(
                "duplicate navigation suppressed (tab_id={}, url={canonical})",
                event.tab_id
            );
            return CycleOutcome::DuplicateUrl;
        }

        // One consistent snapshot of pipeline state for the whole cycle.
        let Some((settings, stored_characters, history, blocked)) = self.load_snapshot().await
        else {
            return CycleOutcome::StoreUnavailable;
        };

        if blocked.contains(&canonical) {
            debug!("url is blocklisted, skipping (url={canonical})");
            return CycleOutcome::BlockedUrl;
        }

        let draw: f64 = rand::rng().random_range(0.0..100.0);
        if draw >= f64::from(settings.chance) {
            debug!(
                "appearance draw failed (draw={draw:.1}, chance={})",
                settings.chance
            );
            return CycleOutcome::ChanceSkipped;
        }

        let available = if stored_characters.is_empty() {
            characters::builtin_characters()
        } else {
            stored_characters
        };
        let Some(character) =
            characters::resolve(settings.selected_character_id.as_deref(), &available)
        else {
            error!("no character available, aborting cycle");
            return CycleOutcome::NoCharacter;
        };

        let backend = self.backends.create(&settings);
        if backend.metered()
            && !ratelimit::allow_now(&history, settings.gemini_rpm, settings.gemini_rpd)
        {
            info!("rate limited, skipping cycle (url={canonical})");
            return CycleOutcome::RateLimited;
        }

        let template = prompt::effective_template(&character);
        let wants_page_text = if backend.metered() {
            prompt::references_page_text(template)
        } else {
            settings.ollama_send_page_content
        };
        let page_text = if wants_page_text {
            Some(self.fetch_page_text(event.tab_id).await)
        } else {
            None
        };

        let digest = if settings.max_history_size > 0 {
            digest_for(&history, &canonical)
        } else {
            String::new()
        };
        let final_prompt = prompt::build(&character, &event.url, &digest, page_text.as_deref());

        info!(
            "generating quip (tab_id={}, url={canonical}, character={})",
            event.tab_id, character.id
        );
        let quip = backend.generate(&event.url, &final_prompt).await;

        if quips::is_error_quip(&quip) {
            debug!("diagnostic quip, history unchanged (url={canonical})");
        } else if settings.max_history_size > 0 {
            let entry = HistoryEntry::new(
                Utc::now().timestamp_millis(),
                event.url.clone(),
                quip.clone(),
            );
            let next = append(&history, entry, settings.max_history_size);
            // Delivery proceeds even when the write fails.
            if let Err(err) = self.store.save_history(&next).await {
                error!("failed to persist history (err={err})");
            }
        }

        self.deliver(event.tab_id, &quip, &character).await;
        CycleOutcome::Delivered { quip }
    }

    /// Refresh the stored registry from the shipped built-ins and make sure
    /// a character is selected. Run once at startup.
    pub async fn sync_builtin_characters(&self) -> Result<(), CroakCoreError> {
        let stored = self.store.load_characters().await?;
        let merged = characters::sync_builtins(&stored);
        info!(
            "synchronized character registry (stored={}, merged={})",
            stored.len(),
            merged.len()
        );
        self.store.save_characters(&merged).await?;

        let mut settings = self.store.load_settings().await?;
        if settings.selected_character_id.is_none() {
            let default_id = merged
                .iter()
                .find(|c| c.source == CharacterSource::Builtin)
                .or_else(|| merged.first())
                .map(|c| c.id.clone());
            if let Some(id) = default_id {
                info!("selecting default character (id={id})");
                settings.selected_character_id = Some(id);
                self.store.save_settings(&settings).await?;
            }
        }
        Ok(())
    }

    async fn load_snapshot(
        &self,
    ) -> Option<(
        Settings,
        Vec<CharacterDefinition>,
        Vec<HistoryEntry>,
        BlockedUrlSet,
    )> {
        let settings = match self.store.load_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                error!("failed to load settings (err={err})");
                return None;
            }
        };
        let characters = match self.store.load_characters().await {
            Ok(characters) => characters,
            Err(err) => {
                error!("failed to load characters (err={err})");
                return None;
            }
        };
        let history = match self.store.load_history().await {
            Ok(history) => history,
            Err(err) => {
                error!("failed to load history (err={err})");
                return None;
            }
        };
        let blocked = match self.store.load_blocked_urls().await {
            Ok(blocked) => blocked,
            Err(err) => {
                error!("failed to load blocklist (err={err})");
                return None;
            }
        };
        Some((settings, characters, history, blocked))
    }

    /// Ask the overlay for page text, degrading to the error sentinel on
    /// timeout or transport failure.
    async fn fetch_page_text(&self, tab_id: TabId) -> String {
        match tokio::time::timeout(self.page_text_timeout, self.overlay.page_text(tab_id)).await {
            // Overlays cap the snippet themselves; enforce the contract anyway.
            Ok(Ok(text)) if text.chars().count() > PAGE_TEXT_MAX_LEN => {
                text.chars().take(PAGE_TEXT_MAX_LEN).collect()
            }
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!("page text request failed (tab_id={tab_id}, err={err})");
                PAGE_TEXT_ERROR.to_string()
            }
            Err(_) => {
                warn!("page text request timed out (tab_id={tab_id})");
                PAGE_TEXT_ERROR.to_string()
            }
        }
    }

    async fn deliver(&self, tab_id: TabId, quip: &str, character: &CharacterDefinition) {
        let image_path = characters::image_reference(character, &self.asset_base);
        match self.overlay.show_quip(tab_id, quip, &image_path).await {
            Ok(()) => debug!("quip delivered (tab_id={tab_id}, len={})", quip.len()),
            Err(OverlayError::NoListener) => {
                warn!("no overlay listener in tab (tab_id={tab_id})")
            }
            Err(err) => error!("overlay delivery failed (tab_id={tab_id}, err={err})"),
        }
    }
}
