//! Two-scope key-value store backing the pipeline state.

use crate::blocklist::BlockedUrlSet;
use crate::error::StoreError;
use crate::model::HistoryEntry;
use async_trait::async_trait;
use croak_rs_config::Settings;
use croak_rs_protocol::CharacterDefinition;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the synced scope (settings and blocklist).
const SYNC_SCOPE: &str = "sync.json";
/// File name of the local scope (characters and history).
const LOCAL_SCOPE: &str = "local.json";

const SETTINGS_BLOCKED_KEY: &str = "blockedUrls";
const CHARACTERS_KEY: &str = "availableCharacters";
const HISTORY_KEY: &str = "requestHistory";

#[async_trait]
/// Persistence abstraction used by the orchestrator.
///
/// Settings and the blocklist live in the synced scope; the character
/// registry and request history live in the local scope. Loads always
/// succeed over malformed contents by falling back to defaults, so only
/// genuine I/O failures surface as errors.
pub trait QuipStore: Send + Sync {
    /// Load settings merged over defaults.
    async fn load_settings(&self) -> Result<Settings, StoreError>;
    /// Persist the full settings record.
    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;
    /// Load the stored character registry.
    async fn load_characters(&self) -> Result<Vec<CharacterDefinition>, StoreError>;
    /// Replace the stored character registry.
    async fn save_characters(&self, characters: &[CharacterDefinition]) -> Result<(), StoreError>;
    /// Load the request history log.
    async fn load_history(&self) -> Result<Vec<HistoryEntry>, StoreError>;
    /// Replace the request history log.
    async fn save_history(&self, history: &[HistoryEntry]) -> Result<(), StoreError>;
    /// Load the blocklist of canonical URLs.
    async fn load_blocked_urls(&self) -> Result<BlockedUrlSet, StoreError>;
    /// Replace the blocklist of canonical URLs.
    async fn save_blocked_urls(&self, blocked: &BlockedUrlSet) -> Result<(), StoreError>;
}

/// File-backed store keeping each scope as one JSON object.
#[derive(Debug)]
pub struct JsonFileStore {
    /// Directory holding the scope files.
    root: PathBuf,
    /// Serializes read-modify-write cycles on the scope files.
    guard: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file store (root={})", root.display());
        Ok(Self {
            root,
            guard: Mutex::new(()),
        })
    }

    fn scope_path(&self, scope: &str) -> PathBuf {
        self.root.join(scope)
    }

    /// Read a scope object; a missing file or malformed contents yield an
    /// empty object so callers degrade to defaults.
    fn read_scope(&self, scope: &str) -> Result<Map<String, Value>, StoreError> {
        let path = self.scope_path(scope);
        if !path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!("scope contents are not a JSON object, resetting (scope={scope})");
                Ok(Map::new())
            }
        }
    }

    /// Rewrite a scope object atomically via a temp file rename.
    fn write_scope(&self, scope: &str, map: &Map<String, Value>) -> Result<(), StoreError> {
        let path = self.scope_path(scope);
        let temp_path = self.root.join(format!("{scope}.tmp"));
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let contents = serde_json::to_string_pretty(&Value::Object(map.clone()))?;
            file.write_all(contents.as_bytes())?;
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::rename(temp_path, path)?;
        debug!("wrote scope (scope={scope}, keys={})", map.len());
        Ok(())
    }

    /// Read-modify-write one key of a scope under the store guard.
    fn update_key(&self, scope: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let _lock = self.guard.lock();
        let mut map = self.read_scope(scope)?;
        map.insert(key.to_string(), value);
        self.write_scope(scope, &map)
    }

    /// Decode an array value item by item, dropping entries that fail.
    fn decode_items<T: serde::de::DeserializeOwned>(value: Option<Value>, key: &str) -> Vec<T> {
        let Some(Value::Array(items)) = value else {
            if value.is_some() {
                warn!("stored value is not an array, ignoring (key={key})");
            }
            return Vec::new();
        };
        let mut decoded = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<T>(item) {
                Ok(item) => decoded.push(item),
                Err(err) => warn!("dropping malformed stored item (key={key}, err={err})"),
            }
        }
        decoded
    }
}

#[async_trait]
impl QuipStore for JsonFileStore {
    async fn load_settings(&self) -> Result<Settings, StoreError> {
        let _lock = self.guard.lock();
        let mut map = self.read_scope(SYNC_SCOPE)?;
        map.remove(SETTINGS_BLOCKED_KEY);
        match Settings::from_value(Value::Object(map)) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!("stored settings are malformed, using defaults (err={err})");
                Ok(Settings::default())
            }
        }
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let _lock = self.guard.lock();
        let mut map = self.read_scope(SYNC_SCOPE)?;
        if let Value::Object(fields) = serde_json::to_value(settings)? {
            for (key, value) in fields {
                map.insert(key, value);
            }
        }
        self.write_scope(SYNC_SCOPE, &map)
    }

    async fn load_characters(&self) -> Result<Vec<CharacterDefinition>, StoreError> {
        let _lock = self.guard.lock();
        let mut map = self.read_scope(LOCAL_SCOPE)?;
        Ok(Self::decode_items(map.remove(CHARACTERS_KEY), CHARACTERS_KEY))
    }

    async fn save_characters(&self, characters: &[CharacterDefinition]) -> Result<(), StoreError> {
        self.update_key(LOCAL_SCOPE, CHARACTERS_KEY, serde_json::to_value(characters)?)
    }

    async fn load_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let _lock = self.guard.lock();
        let mut map = self.read_scope(LOCAL_SCOPE)?;
        Ok(Self::decode_items(map.remove(HISTORY_KEY), HISTORY_KEY))
    }

    async fn save_history(&self, history: &[HistoryEntry]) -> Result<(), StoreError> {
        self.update_key(LOCAL_SCOPE, HISTORY_KEY, serde_json::to_value(history)?)
    }

    async fn load_blocked_urls(&self) -> Result<BlockedUrlSet, StoreError> {
        let _lock = self.guard.lock();
        let mut map = self.read_scope(SYNC_SCOPE)?;
        let urls: Vec<String> = Self::decode_items(map.remove(SETTINGS_BLOCKED_KEY), SETTINGS_BLOCKED_KEY);
        Ok(urls.into_iter().collect())
    }

    async fn save_blocked_urls(&self, blocked: &BlockedUrlSet) -> Result<(), StoreError> {
        self.update_key(SYNC_SCOPE, SETTINGS_BLOCKED_KEY, serde_json::to_value(blocked)?)
    }
}
