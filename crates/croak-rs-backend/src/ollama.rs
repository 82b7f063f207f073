//! Client for a local Ollama endpoint.

use async_trait::async_trait;
use croak_rs_protocol::QuipBackend;
use log::{debug, error};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Talks to `POST {base_url}/api/generate` with streaming disabled.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for the given endpoint and model.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuipBackend for OllamaClient {
    async fn generate(&self, url: &str, prompt: &str) -> String {
        debug!("requesting quip (url={url}, model={})", self.model);
        let body = json!({ "model": self.model, "prompt": prompt, "stream": false });
        let response = match self.http.post(self.endpoint()).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                error!("request failed (err={err})");
                return if err.is_connect() || err.is_timeout() {
                    "Can't reach Ollama. Is it running?".to_string()
                } else {
                    "Ollama error. Check console.".to_string()
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|data| data.get("error").and_then(Value::as_str).map(str::to_string));
            let message = failure_message(status, detail.as_deref(), &self.model);
            error!("api error (status={status}, message={message})");
            return message;
        }

        match response.json::<Value>().await {
            Ok(data) => parse_response(&data),
            Err(err) => {
                error!("response was not json (err={err})");
                "Ollama seems confused.".to_string()
            }
        }
    }
}

/// Map an HTTP failure onto the user-facing diagnostic sentence.
fn failure_message(status: StatusCode, detail: Option<&str>, model: &str) -> String {
    if status == StatusCode::FORBIDDEN {
        return "Ollama blocked request (check OLLAMA_ORIGINS).".to_string();
    }
    let mut message = format!(
        "Ollama API Error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    );
    if let Some(detail) = detail {
        message.push_str(&format!(" - {detail}"));
    }
    let lowered = message.to_lowercase();
    if lowered.contains("model") && lowered.contains("not found") {
        return format!("Ollama model '{model}' not found. Is it pulled?");
    }
    message
}

/// Pull the quip out of a generate response.
fn parse_response(data: &Value) -> String {
    match data.get("response").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => text.trim().to_string(),
        _ => {
            error!("invalid response shape (data={data})");
            "Ollama seems confused.".to_string()
        }
    }
}
