//! History entries and the operations over the bounded log.

use croak_rs_protocol::canonical_url;
use log::warn;
use serde::{Deserialize, Serialize};

/// One recorded quip delivery.
///
/// Keys match the stored `requestHistory` blob, and every field defaults so a
/// partially-formed entry still deserializes instead of poisoning the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch; `0` marks an invalid entry.
    #[serde(default)]
    pub timestamp: i64,
    /// Full page URL the quip was generated for.
    #[serde(default)]
    pub url: String,
    /// The delivered quip text.
    #[serde(default)]
    pub quip: String,
}

impl HistoryEntry {
    /// Build an entry from its parts.
    pub fn new(timestamp: i64, url: impl Into<String>, quip: impl Into<String>) -> Self {
        Self {
            timestamp,
            url: url.into(),
            quip: quip.into(),
        }
    }

    /// An entry counts only when it carries a positive timestamp.
    pub fn is_valid(&self) -> bool {
        self.timestamp > 0
    }
}

/// Append an entry to the log, dropping invalid entries and trimming the
/// oldest entries beyond `max_size`.
///
/// Returns the next log; the input slice is never mutated so a failed
/// persistence write leaves the caller's snapshot intact.
pub fn append(history: &[HistoryEntry], entry: HistoryEntry, max_size: usize) -> Vec<HistoryEntry> {
    if !entry.is_valid() {
        warn!("dropping history entry without timestamp (url={})", entry.url);
        return history.iter().filter(|e| e.is_valid()).cloned().collect();
    }
    if max_size == 0 {
        return Vec::new();
    }
    let mut next: Vec<HistoryEntry> = history.iter().filter(|e| e.is_valid()).cloned().collect();
    next.push(entry);
    let excess = next.len().saturating_sub(max_size);
    if excess > 0 {
        next.drain(..excess);
    }
    next
}

/// Collect the quips previously delivered for a canonical URL, newest last,
/// one `- ` bullet per line. Returns an empty string when nothing matches.
pub fn digest_for(history: &[HistoryEntry], canonical: &str) -> String {
    let bullets: Vec<String> = history
        .iter()
        .filter(|entry| entry.is_valid())
        .filter(|entry| canonical_url(&entry.url).as_deref() == Some(canonical))
        .map(|entry| format!("- {}", entry.quip))
        .collect();
    bullets.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{HistoryEntry, append, digest_for};
    use pretty_assertions::assert_eq;

    fn entry(timestamp: i64, url: &str, quip: &str) -> HistoryEntry {
        HistoryEntry::new(timestamp, url, quip)
    }

    #[test]
    fn append_trims_the_oldest_entries() {
        let log = vec![entry(1, "https://a.com/1", "one"), entry(2, "https://a.com/2", "two")];
        let next = append(&log, entry(3, "https://a.com/3", "three"), 2);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].quip, "two");
        assert_eq!(next[1].quip, "three");
    }

    #[test]
    fn append_rejects_entries_without_timestamps() {
        let log = vec![entry(1, "https://a.com/", "one")];
        let next = append(&log, entry(0, "https://a.com/", "bad"), 10);
        assert_eq!(next, log);
    }

    #[test]
    fn append_filters_invalid_stored_entries() {
        let log = vec![entry(0, "https://a.com/", "ghost"), entry(5, "https://a.com/", "kept")];
        let next = append(&log, entry(6, "https://a.com/", "new"), 10);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].quip, "kept");
    }

    #[test]
    fn append_with_zero_capacity_disables_the_log() {
        let log = vec![entry(1, "https://a.com/", "one")];
        let next = append(&log, entry(2, "https://a.com/", "two"), 0);
        assert_eq!(next, Vec::new());
    }

    #[test]
    fn digest_matches_on_canonical_url() {
        let log = vec![
            entry(1, "https://a.com/page?tab=1", "first"),
            entry(2, "https://b.com/other", "elsewhere"),
            entry(3, "https://a.com/page#bottom", "second"),
        ];
        assert_eq!(digest_for(&log, "https://a.com/page"), "- first\n- second");
    }

    #[test]
    fn digest_is_empty_for_unseen_urls() {
        let log = vec![entry(1, "https://a.com/page", "first")];
        assert_eq!(digest_for(&log, "https://a.com/elsewhere"), "");
    }

    #[test]
    fn partial_blob_deserializes_with_defaults() {
        let raw = r#"{ "quip": "orphan" }"#;
        let parsed: HistoryEntry = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.timestamp, 0);
        assert_eq!(parsed.is_valid(), false);
    }
}
