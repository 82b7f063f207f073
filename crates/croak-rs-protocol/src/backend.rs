//! Backend client contract for quip generation.

use async_trait::async_trait;

#[async_trait]
/// A pluggable quip-generation function.
///
/// Implementations must never fail across this boundary: every expected
/// failure mode resolves to a short user-facing diagnostic sentence in
/// place of a quip.
pub trait QuipBackend: Send + Sync {
    /// Generate one quip for the page at `url` from the assembled prompt.
    async fn generate(&self, url: &str, prompt: &str) -> String;

    /// Whether requests against this backend count toward usage ceilings.
    fn metered(&self) -> bool {
        false
    }
}
