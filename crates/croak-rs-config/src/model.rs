//! Settings schema for the quip pipeline.

use serde::{Deserialize, Serialize};

/// Which backend generates quips.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local HTTP endpoint; unmetered.
    #[default]
    Ollama,
    /// Remote hosted endpoint; subject to per-minute and per-day ceilings.
    Gemini,
}

impl BackendKind {
    /// Return the backend selector as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Gemini => "gemini",
        }
    }
}

/// Flat settings record merged over defaults on every read.
///
/// Field keys match the stored sync-scope blob of the original extension,
/// so a stored partial object deserializes with defaults filling the gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Appearance probability in percent, 0-100.
    #[serde(default = "default_chance")]
    pub chance: u8,
    /// Backend selector.
    #[serde(default, rename = "backendType")]
    pub backend: BackendKind,
    /// Ollama model identifier.
    #[serde(default = "default_ollama_model", rename = "ollamaModel")]
    pub ollama_model: String,
    /// Ollama endpoint base URL.
    #[serde(default = "default_ollama_url", rename = "ollamaUrl")]
    pub ollama_url: String,
    /// Whether the local backend should receive page text.
    #[serde(default, rename = "ollamaSendPageContent")]
    pub ollama_send_page_content: bool,
    /// Gemini API credential; empty means unset.
    #[serde(default, rename = "geminiApiKey")]
    pub gemini_api_key: String,
    /// Gemini model identifier.
    #[serde(default = "default_gemini_model", rename = "geminiModel")]
    pub gemini_model: String,
    /// Max metered requests per minute; 0 disables the ceiling.
    #[serde(default = "default_gemini_rpm", rename = "geminiRPM")]
    pub gemini_rpm: u32,
    /// Max metered requests per day; 0 disables the ceiling.
    #[serde(default = "default_gemini_rpd", rename = "geminiRPD")]
    pub gemini_rpd: u32,
    /// Max retained history entries; 0 disables history.
    #[serde(default = "default_max_history_size", rename = "maxHistorySize")]
    pub max_history_size: usize,
    /// Selected character id; None falls back to the first built-in.
    #[serde(default, rename = "selectedCharacterId")]
    pub selected_character_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chance: default_chance(),
            backend: BackendKind::default(),
            ollama_model: default_ollama_model(),
            ollama_url: default_ollama_url(),
            ollama_send_page_content: false,
            gemini_api_key: String::new(),
            gemini_model: default_gemini_model(),
            gemini_rpm: default_gemini_rpm(),
            gemini_rpd: default_gemini_rpd(),
            max_history_size: default_max_history_size(),
            selected_character_id: None,
        }
    }
}

/// Default appearance probability.
fn default_chance() -> u8 {
    100
}

/// Default Ollama model identifier.
fn default_ollama_model() -> String {
    "gemma3:1b-it-qat".to_string()
}

/// Default Ollama endpoint.
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Default Gemini model identifier.
fn default_gemini_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

/// Default Gemini per-minute ceiling.
fn default_gemini_rpm() -> u32 {
    30
}

/// Default Gemini per-day ceiling.
fn default_gemini_rpd() -> u32 {
    500
}

/// Default history bound.
fn default_max_history_size() -> usize {
    25
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, Settings};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_shipped_values() {
        let settings = Settings::default();
        assert_eq!(settings.chance, 100);
        assert_eq!(settings.backend, BackendKind::Ollama);
        assert_eq!(settings.ollama_model, "gemma3:1b-it-qat");
        assert_eq!(settings.ollama_url, "http://localhost:11434");
        assert_eq!(settings.ollama_send_page_content, false);
        assert_eq!(settings.gemini_model, "gemini-2.0-flash-lite");
        assert_eq!(settings.gemini_rpm, 30);
        assert_eq!(settings.gemini_rpd, 500);
        assert_eq!(settings.max_history_size, 25);
        assert_eq!(settings.selected_character_id, None);
    }

    #[test]
    fn partial_blob_fills_gaps_with_defaults() {
        let raw = r#"{ "backendType": "gemini", "geminiRPM": 5, "chance": 40 }"#;
        let settings: Settings = serde_json::from_str(raw).expect("parse");
        assert_eq!(settings.backend, BackendKind::Gemini);
        assert_eq!(settings.gemini_rpm, 5);
        assert_eq!(settings.chance, 40);
        assert_eq!(settings.gemini_rpd, 500);
        assert_eq!(settings.max_history_size, 25);
    }
}
