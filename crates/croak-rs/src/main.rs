//! Command-line harness: run one quip cycle against a URL.

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use croak_rs_backend::HttpBackendFactory;
use croak_rs_core::{CycleOutcome, Orchestrator};
use croak_rs_history::{JsonFileStore, QuipStore};
use croak_rs_protocol::{NavigationEvent, OverlayError, OverlayPort, TabId};
use directories::BaseDirs;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the quip harness.
#[derive(Parser)]
#[command(name = "croak", version)]
struct Cli {
    /// Page URL to run a cycle for
    url: String,
    /// Optional path to a settings file (json5), merged over stored settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Data directory for pipeline state (defaults to ~/.croak)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Tab id used for deduplication
    #[arg(long, default_value_t = 1)]
    tab: TabId,
    /// Refresh the stored registry from the shipped built-ins first
    #[arg(long)]
    sync_characters: bool,
}

/// Overlay that prints to stdout. Page text is never available, so prompts
/// fall back to the absence markers.
struct TerminalOverlay;

#[async_trait]
impl OverlayPort for TerminalOverlay {
    async fn show_quip(
        &self,
        _tab_id: TabId,
        quip: &str,
        image_path: &str,
    ) -> Result<(), OverlayError> {
        println!("{quip}");
        println!("  (image: {image_path})");
        Ok(())
    }

    async fn page_text(&self, _tab_id: TabId) -> Result<String, OverlayError> {
        Err(OverlayError::NoListener)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    info!(
        "starting harness (url={}, data_dir={})",
        cli.url,
        data_dir.display()
    );

    let store = Arc::new(JsonFileStore::new(&data_dir).context("failed to open data directory")?);

    if let Some(path) = cli.config.as_ref() {
        let contents = std::fs::read_to_string(path).context("failed to read settings file")?;
        let overrides: serde_json::Value =
            json5::from_str(&contents).context("failed to parse settings file")?;
        let merged = store
            .load_settings()
            .await?
            .with_overrides(&overrides)
            .context("invalid settings overrides")?;
        store.save_settings(&merged).await?;
        info!("applied settings overrides from {}", path.display());
    }

    let orchestrator = Orchestrator::new(
        store,
        Arc::new(TerminalOverlay),
        Arc::new(HttpBackendFactory::new()),
        "",
    );

    if cli.sync_characters {
        orchestrator
            .sync_builtin_characters()
            .await
            .context("failed to sync built-in characters")?;
    }

    let event = NavigationEvent::complete(cli.tab, cli.url.clone());
    let outcome = orchestrator.on_navigation(&event).await;
    if let Some(reason) = silent_reason(&outcome) {
        println!("(no quip: {reason})");
    }
    Ok(())
}

/// Explain a silent cycle to the terminal user.
fn silent_reason(outcome: &CycleOutcome) -> Option<&'static str> {
    match outcome {
        CycleOutcome::Delivered { .. } => None,
        CycleOutcome::Ignored => Some("event ignored"),
        CycleOutcome::DuplicateUrl => Some("duplicate navigation for this tab"),
        CycleOutcome::InvalidUrl => Some("not a web page URL"),
        CycleOutcome::BlockedUrl => Some("URL is blocklisted"),
        CycleOutcome::ChanceSkipped => Some("appearance draw failed"),
        CycleOutcome::NoCharacter => Some("no character available"),
        CycleOutcome::RateLimited => Some("rate limit reached"),
        CycleOutcome::StoreUnavailable => Some("state store unavailable"),
    }
}

fn default_data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".croak"))
        .unwrap_or_else(|| PathBuf::from(".croak"))
}
