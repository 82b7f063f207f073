//! User blocklist of canonical URLs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Set of canonical URLs the user silenced.
///
/// Stored as a JSON array; membership is order-independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct BlockedUrlSet(HashSet<String>);

impl BlockedUrlSet {
    /// Empty blocklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the canonical URL is silenced.
    pub fn contains(&self, canonical: &str) -> bool {
        self.0.contains(canonical)
    }

    /// Silence a canonical URL; returns false when it was already present.
    pub fn insert(&mut self, canonical: impl Into<String>) -> bool {
        self.0.insert(canonical.into())
    }

    /// Unsilence a canonical URL; returns false when it was not present.
    pub fn remove(&mut self, canonical: &str) -> bool {
        self.0.remove(canonical)
    }

    /// Number of silenced URLs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the blocklist is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for BlockedUrlSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::BlockedUrlSet;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_remove_round_trip() {
        let mut blocked = BlockedUrlSet::new();
        assert_eq!(blocked.insert("https://a.com/page"), true);
        assert_eq!(blocked.insert("https://a.com/page"), false);
        assert_eq!(blocked.contains("https://a.com/page"), true);
        assert_eq!(blocked.remove("https://a.com/page"), true);
        assert_eq!(blocked.is_empty(), true);
    }

    #[test]
    fn serializes_as_a_plain_array() {
        let blocked: BlockedUrlSet = ["https://a.com/p".to_string()].into_iter().collect();
        let value = serde_json::to_value(&blocked).expect("encode");
        assert_eq!(value, serde_json::json!(["https://a.com/p"]));
    }
}
