//! Canonical URL form used for deduplication, history, and blocklist keys.

use url::Url;

/// Reduce a full page URL to its canonical form: origin plus path, with
/// query and fragment dropped.
///
/// Returns `None` for anything that is not a parseable http/https URL;
/// callers treat that as "no cycle for this navigation".
pub fn canonical_url(full_url: &str) -> Option<String> {
    let parsed = Url::parse(full_url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    Some(format!(
        "{}{}",
        parsed.origin().ascii_serialization(),
        parsed.path()
    ))
}
