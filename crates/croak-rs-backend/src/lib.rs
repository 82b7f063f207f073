//! HTTP backend clients and the factory that selects between them.
//!
//! Clients never fail: every network, HTTP, or decoding problem is reported
//! in-band as a short diagnostic sentence, which downstream classification
//! keeps out of history.

mod factory;
mod gemini;
mod ollama;

pub use factory::HttpBackendFactory;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
