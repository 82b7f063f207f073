//! Settings-driven backend selection.

use crate::{GeminiClient, OllamaClient};
use croak_rs_config::{BackendKind, Settings};
use croak_rs_core::BackendFactory;
use croak_rs_protocol::QuipBackend;
use log::debug;
use std::sync::Arc;

/// Builds real HTTP clients from a settings snapshot.
///
/// The underlying connection pool is shared between cycles; only the client
/// configuration is rebuilt.
#[derive(Clone, Default)]
pub struct HttpBackendFactory {
    http: reqwest::Client,
}

impl HttpBackendFactory {
    /// Factory with a fresh connection pool.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackendFactory for HttpBackendFactory {
    fn create(&self, settings: &Settings) -> Arc<dyn QuipBackend> {
        debug!("selecting backend (kind={})", settings.backend.as_str());
        match settings.backend {
            BackendKind::Ollama => Arc::new(OllamaClient::new(
                self.http.clone(),
                settings.ollama_url.as_str(),
                settings.ollama_model.as_str(),
            )),
            BackendKind::Gemini => Arc::new(GeminiClient::new(
                self.http.clone(),
                settings.gemini_model.as_str(),
                settings.gemini_api_key.as_str(),
            )),
        }
    }
}
