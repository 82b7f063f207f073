//! Client for the hosted Gemini API.

use async_trait::async_trait;
use croak_rs_protocol::QuipBackend;
use log::{debug, error, warn};
use reqwest::StatusCode;
use serde_json::{Value, json};

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Talks to the `generateContent` endpoint. Metered: subject to the
/// per-minute and per-day ceilings.
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client for the given model and credential.
    pub fn new(http: reqwest::Client, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{GEMINI_API_BASE_URL}{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

#[async_trait]
impl QuipBackend for GeminiClient {
    async fn generate(&self, url: &str, prompt: &str) -> String {
        debug!("requesting quip (url={url}, model={})", self.model);
        if self.api_key.is_empty() {
            return "Gemini API Key is missing in settings.".to_string();
        }
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = match self.http.post(self.endpoint()).json(&body).send().await {
            Ok(response) => response,
            Err(err) => {
                error!("request failed (err={err})");
                return if err.is_connect() || err.is_timeout() {
                    "Can't reach Gemini API. Check connection/firewall.".to_string()
                } else {
                    "Gemini error. Check console.".to_string()
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|data| {
                    data.pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                });
            let message = failure_message(status, detail.as_deref(), &self.model);
            error!("api error (status={status}, message={message})");
            return message;
        }

        match response.json::<Value>().await {
            Ok(data) => parse_response(&data),
            Err(err) => {
                error!("response was not json (err={err})");
                "Gemini returned an unexpected response.".to_string()
            }
        }
    }

    fn metered(&self) -> bool {
        true
    }
}

/// Map an HTTP failure onto the user-facing diagnostic sentence.
fn failure_message(status: StatusCode, detail: Option<&str>, model: &str) -> String {
    let detailed = match detail {
        Some(detail) => format!("Gemini API Error: {detail}"),
        None => format!(
            "Gemini API Error: {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        ),
    };
    if status == StatusCode::BAD_REQUEST {
        if detailed.contains("API key not valid") {
            return "Gemini API Key is invalid. Please check settings.".to_string();
        }
        if detailed.contains("model") && detailed.contains("not found") {
            return format!("Gemini model '{model}' not found or incompatible.");
        }
        if detailed.contains("Invalid JSON payload") {
            return "Gemini Error: Invalid request structure sent.".to_string();
        }
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return "Gemini rate limit exceeded. Try again later.".to_string();
    }
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        return "Gemini Server Error (500). Please try again later.".to_string();
    }
    detailed
}

/// Pull the quip (or the refusal reason) out of a generateContent response.
fn parse_response(data: &Value) -> String {
    if let Some(text) = data
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
    {
        return text.trim().to_string();
    }
    if let Some(reason) = data
        .pointer("/candidates/0/finishReason")
        .and_then(Value::as_str)
    {
        warn!("generation stopped early (reason={reason})");
        return format!("Gemini couldn't generate a quip (Reason: {reason}).");
    }
    if let Some(reason) = data
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        warn!("prompt was blocked (reason={reason})");
        return format!("Gemini blocked the prompt (Reason: {reason}).");
    }
    error!("invalid response shape (data={data})");
    "Gemini returned an unexpected response.".to_string()
}

#[cfg(test)]
mod tests {
    use super::{failure_message, parse_response};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn candidate_text_is_trimmed() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": " A quip. " }] } }]
        });
        assert_eq!(parse_response(&data), "A quip.");
    }

    #[test]
    fn finish_reason_becomes_a_refusal_sentence() {
        let data = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        assert_eq!(
            parse_response(&data),
            "Gemini couldn't generate a quip (Reason: SAFETY)."
        );
    }

    #[test]
    fn block_reason_becomes_a_blocked_sentence() {
        let data = json!({ "promptFeedback": { "blockReason": "PROHIBITED_CONTENT" } });
        assert_eq!(
            parse_response(&data),
            "Gemini blocked the prompt (Reason: PROHIBITED_CONTENT)."
        );
    }

    #[test]
    fn empty_shapes_are_unexpected() {
        assert_eq!(parse_response(&json!({})), "Gemini returned an unexpected response.");
        assert_eq!(
            parse_response(&json!({ "candidates": [] })),
            "Gemini returned an unexpected response."
        );
    }

    #[test]
    fn bad_request_variants_are_distinguished() {
        assert_eq!(
            failure_message(StatusCode::BAD_REQUEST, Some("API key not valid. Pass a valid key."), "m"),
            "Gemini API Key is invalid. Please check settings."
        );
        assert_eq!(
            failure_message(StatusCode::BAD_REQUEST, Some("model gemini-x not found"), "gemini-x"),
            "Gemini model 'gemini-x' not found or incompatible."
        );
        assert_eq!(
            failure_message(StatusCode::BAD_REQUEST, Some("Invalid JSON payload received"), "m"),
            "Gemini Error: Invalid request structure sent."
        );
    }

    #[test]
    fn quota_and_server_failures_have_fixed_sentences() {
        assert_eq!(
            failure_message(StatusCode::TOO_MANY_REQUESTS, None, "m"),
            "Gemini rate limit exceeded. Try again later."
        );
        assert_eq!(
            failure_message(StatusCode::INTERNAL_SERVER_ERROR, Some("internal"), "m"),
            "Gemini Server Error (500). Please try again later."
        );
    }

    #[test]
    fn unclassified_failures_carry_the_detail() {
        assert_eq!(
            failure_message(StatusCode::SERVICE_UNAVAILABLE, Some("overloaded"), "m"),
            "Gemini API Error: overloaded"
        );
    }
}
