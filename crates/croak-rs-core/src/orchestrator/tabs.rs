//! Per-tab navigation deduplication.

use croak_rs_protocol::TabId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Last canonical URL that started a cycle, per open tab.
#[derive(Debug, Default)]
pub(super) struct TabTracker {
    last_urls: Mutex<HashMap<TabId, String>>,
}

impl TabTracker {
    /// Record `canonical` for the tab. Returns false when it matches the
    /// previous entry, i.e. the navigation is a duplicate.
    ///
    /// The entry is written before any asynchronous work so reloads arriving
    /// mid-cycle are suppressed too.
    pub(super) fn record_if_new(&self, tab_id: TabId, canonical: &str) -> bool {
        let mut map = self.last_urls.lock();
        match map.get(&tab_id) {
            Some(previous) if previous == canonical => false,
            _ => {
                map.insert(tab_id, canonical.to_string());
                true
            }
        }
    }

    /// Forget a closed tab so the URL can fire again in a new tab.
    pub(super) fn remove(&self, tab_id: TabId) {
        self.last_urls.lock().remove(&tab_id);
    }
}
