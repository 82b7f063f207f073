//! End-to-end cycles over stubbed collaborators.

use chrono::Utc;
use croak_rs_config::Settings;
use croak_rs_core::{BackendFactory, CycleOutcome, Orchestrator};
use croak_rs_history::HistoryEntry;
use croak_rs_protocol::{NavigationEvent, PAGE_TEXT_ERROR, QuipBackend};
use croak_rs_test_utils::{FixedBackend, MemoryQuipStore, PageTextScript, StubOverlay};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const ASSET_BASE: &str = "assets://croak";

struct FixedFactory {
    backend: Arc<FixedBackend>,
}

impl BackendFactory for FixedFactory {
    fn create(&self, _settings: &Settings) -> Arc<dyn QuipBackend> {
        self.backend.clone()
    }
}

struct Harness {
    store: Arc<MemoryQuipStore>,
    overlay: Arc<StubOverlay>,
    backend: Arc<FixedBackend>,
    orchestrator: Orchestrator,
}

fn harness(settings: Settings, backend: FixedBackend, overlay: StubOverlay) -> Harness {
    let store = Arc::new(MemoryQuipStore::with_settings(settings));
    let overlay = Arc::new(overlay);
    let backend = Arc::new(backend);
    let orchestrator = Orchestrator::new(
        store.clone(),
        overlay.clone(),
        Arc::new(FixedFactory {
            backend: backend.clone(),
        }),
        ASSET_BASE,
    );
    Harness {
        store,
        overlay,
        backend,
        orchestrator,
    }
}

fn base_settings() -> Settings {
    let mut settings = Settings::default();
    settings.max_history_size = 5;
    settings
}

#[tokio::test]
async fn plain_cycle_delivers_and_records_history() {
    let h = harness(
        base_settings(),
        FixedBackend::new("Try juggling geese."),
        StubOverlay::new(),
    );
    let event = NavigationEvent::complete(1, "https://example.com/");

    let outcome = h.orchestrator.on_navigation(&event).await;
    assert_eq!(
        outcome,
        CycleOutcome::Delivered {
            quip: "Try juggling geese.".to_string()
        }
    );

    // Page content was neither requested nor sent for the local backend.
    assert_eq!(h.overlay.page_text_requests(), Vec::<u64>::new());

    let history = h.store.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].quip, "Try juggling geese.");
    assert_eq!(history[0].url, "https://example.com/");

    let shown = h.overlay.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].quip, "Try juggling geese.");
    assert_eq!(
        shown[0].image_path,
        format!("{ASSET_BASE}/characters/toad/character.png")
    );
}

#[tokio::test]
async fn blocklisted_url_stops_before_the_backend() {
    let h = harness(
        base_settings(),
        FixedBackend::new("Try juggling geese."),
        StubOverlay::new(),
    );
    h.store
        .set_blocked(["https://example.com/".to_string()].into_iter().collect());

    let event = NavigationEvent::complete(1, "https://example.com/");
    assert_eq!(h.orchestrator.on_navigation(&event).await, CycleOutcome::BlockedUrl);
    assert_eq!(h.backend.call_count(), 0);
    assert_eq!(h.store.history(), Vec::new());
    assert_eq!(h.overlay.shown(), Vec::new());
}

#[tokio::test]
async fn zero_chance_always_skips() {
    let mut settings = base_settings();
    settings.chance = 0;
    let h = harness(settings, FixedBackend::new("quip"), StubOverlay::new());

    for i in 0..20u64 {
        let event = NavigationEvent::complete(i, format!("https://example.com/{i}"));
        assert_eq!(
            h.orchestrator.on_navigation(&event).await,
            CycleOutcome::ChanceSkipped
        );
    }
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn diagnostic_quips_are_shown_but_not_recorded() {
    let h = harness(
        base_settings(),
        FixedBackend::new("Gemini API Key is missing in settings."),
        StubOverlay::new(),
    );
    let event = NavigationEvent::complete(1, "https://example.com/");

    let outcome = h.orchestrator.on_navigation(&event).await;
    assert_eq!(
        outcome,
        CycleOutcome::Delivered {
            quip: "Gemini API Key is missing in settings.".to_string()
        }
    );
    assert_eq!(h.overlay.shown().len(), 1);
    assert_eq!(h.store.history(), Vec::new());
}

#[tokio::test]
async fn rapid_duplicate_navigations_run_one_cycle() {
    let h = harness(
        base_settings(),
        FixedBackend::new("Try juggling geese."),
        StubOverlay::new(),
    );
    let event = NavigationEvent::complete(1, "https://example.com/page?utm=1");
    let repeat = NavigationEvent::complete(1, "https://example.com/page?utm=2");

    assert!(matches!(
        h.orchestrator.on_navigation(&event).await,
        CycleOutcome::Delivered { .. }
    ));
    assert_eq!(
        h.orchestrator.on_navigation(&repeat).await,
        CycleOutcome::DuplicateUrl
    );
    assert_eq!(h.backend.call_count(), 1);

    // Closing the tab clears the suppression.
    h.orchestrator.remove_tab(1);
    assert!(matches!(
        h.orchestrator.on_navigation(&event).await,
        CycleOutcome::Delivered { .. }
    ));
}

#[tokio::test]
async fn non_web_and_incomplete_events_are_ignored() {
    let h = harness(base_settings(), FixedBackend::new("quip"), StubOverlay::new());

    let loading = NavigationEvent {
        tab_id: 1,
        url: "https://example.com/".to_string(),
        status: croak_rs_protocol::NavigationStatus::Loading,
    };
    assert_eq!(h.orchestrator.on_navigation(&loading).await, CycleOutcome::Ignored);

    let internal = NavigationEvent::complete(1, "chrome://settings");
    assert_eq!(h.orchestrator.on_navigation(&internal).await, CycleOutcome::InvalidUrl);
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn metered_backend_respects_the_minute_ceiling() {
    let mut settings = base_settings();
    settings.gemini_rpm = 2;
    let h = harness(
        settings,
        FixedBackend::new("quip").metered(),
        StubOverlay::new(),
    );
    let now = Utc::now().timestamp_millis();
    h.store.set_history(vec![
        HistoryEntry::new(now - 1_000, "https://a.com/1", "one"),
        HistoryEntry::new(now - 2_000, "https://a.com/2", "two"),
    ]);

    let event = NavigationEvent::complete(1, "https://example.com/");
    assert_eq!(h.orchestrator.on_navigation(&event).await, CycleOutcome::RateLimited);
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn local_backend_sends_page_text_when_enabled() {
    let mut settings = base_settings();
    settings.ollama_send_page_content = true;
    let h = harness(
        settings,
        FixedBackend::new("quip"),
        StubOverlay::with_page_text(PageTextScript::Text("a page about geese".to_string())),
    );

    let event = NavigationEvent::complete(1, "https://example.com/");
    assert!(matches!(
        h.orchestrator.on_navigation(&event).await,
        CycleOutcome::Delivered { .. }
    ));
    assert_eq!(h.overlay.page_text_requests(), vec![1]);
    let calls = h.backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("a page about geese"));
}

#[tokio::test]
async fn hung_page_text_degrades_to_the_error_sentinel() {
    let mut settings = base_settings();
    settings.ollama_send_page_content = true;
    let h = harness(
        settings,
        FixedBackend::new("quip"),
        StubOverlay::with_page_text(PageTextScript::Hang),
    );
    let orchestrator = h
        .orchestrator
        .with_page_text_timeout(Duration::from_millis(20));

    let event = NavigationEvent::complete(1, "https://example.com/");
    assert!(matches!(
        orchestrator.on_navigation(&event).await,
        CycleOutcome::Delivered { .. }
    ));
    let calls = h.backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains(PAGE_TEXT_ERROR));
}

#[tokio::test]
async fn history_digest_feeds_the_next_prompt() {
    let h = harness(
        base_settings(),
        FixedBackend::new("quip"),
        StubOverlay::new(),
    );
    h.store.set_history(vec![HistoryEntry::new(
        5,
        "https://example.com/page?old=1",
        "said this before",
    )]);

    let event = NavigationEvent::complete(1, "https://example.com/page");
    assert!(matches!(
        h.orchestrator.on_navigation(&event).await,
        CycleOutcome::Delivered { .. }
    ));
    let calls = h.backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("- said this before"));
}

#[tokio::test]
async fn store_failure_aborts_the_cycle() {
    let h = harness(base_settings(), FixedBackend::new("quip"), StubOverlay::new());
    h.store.fail_all();

    let event = NavigationEvent::complete(1, "https://example.com/");
    assert_eq!(
        h.orchestrator.on_navigation(&event).await,
        CycleOutcome::StoreUnavailable
    );
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn builtin_sync_seeds_the_registry_and_selection() {
    let h = harness(base_settings(), FixedBackend::new("quip"), StubOverlay::new());

    h.orchestrator
        .sync_builtin_characters()
        .await
        .expect("sync");

    let ids: Vec<String> = h.store.characters().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec!["builtin-toad", "builtin-cletus", "builtin-baphomet"]);
    assert_eq!(
        h.store.settings().selected_character_id,
        Some("builtin-toad".to_string())
    );
}
