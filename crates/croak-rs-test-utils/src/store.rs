use async_trait::async_trait;
use croak_rs_config::Settings;
use croak_rs_history::{BlockedUrlSet, HistoryEntry, QuipStore, StoreError};
use croak_rs_protocol::CharacterDefinition;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryQuipStore {
    settings: RwLock<Settings>,
    characters: RwLock<Vec<CharacterDefinition>>,
    history: RwLock<Vec<HistoryEntry>>,
    blocked: RwLock<BlockedUrlSet>,
    failing: RwLock<bool>,
}

impl MemoryQuipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = Self::default();
        *store.settings.write() = settings;
        store
    }

    pub fn set_settings(&self, settings: Settings) {
        *self.settings.write() = settings;
    }

    pub fn set_characters(&self, characters: Vec<CharacterDefinition>) {
        *self.characters.write() = characters;
    }

    pub fn set_history(&self, history: Vec<HistoryEntry>) {
        *self.history.write() = history;
    }

    pub fn set_blocked(&self, blocked: BlockedUrlSet) {
        *self.blocked.write() = blocked;
    }

    pub fn fail_all(&self) {
        *self.failing.write() = true;
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.read().clone()
    }

    pub fn characters(&self) -> Vec<CharacterDefinition> {
        self.characters.read().clone()
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.failing.read() {
            return Err(StoreError::Io(std::io::Error::other("injected failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl QuipStore for MemoryQuipStore {
    async fn load_settings(&self) -> Result<Settings, StoreError> {
        self.check()?;
        Ok(self.settings.read().clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.check()?;
        *self.settings.write() = settings.clone();
        Ok(())
    }

    async fn load_characters(&self) -> Result<Vec<CharacterDefinition>, StoreError> {
        self.check()?;
        Ok(self.characters.read().clone())
    }

    async fn save_characters(&self, characters: &[CharacterDefinition]) -> Result<(), StoreError> {
        self.check()?;
        *self.characters.write() = characters.to_vec();
        Ok(())
    }

    async fn load_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.check()?;
        Ok(self.history.read().clone())
    }

    async fn save_history(&self, history: &[HistoryEntry]) -> Result<(), StoreError> {
        self.check()?;
        *self.history.write() = history.to_vec();
        Ok(())
    }

    async fn load_blocked_urls(&self) -> Result<BlockedUrlSet, StoreError> {
        self.check()?;
        Ok(self.blocked.read().clone())
    }

    async fn save_blocked_urls(&self, blocked: &BlockedUrlSet) -> Result<(), StoreError> {
        self.check()?;
        *self.blocked.write() = blocked.clone();
        Ok(())
    }
}
