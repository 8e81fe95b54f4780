use companion_types::{Turn, HISTORY_STORAGE_KEY};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("storage unavailable: {0}")]
    Storage(String),
    #[error("corrupt history: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Minimal string key/value storage, the shape of `window.localStorage`
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), HistoryError>;
}

/// Conversation history persisted as one JSON array under a fixed key.
///
/// Writes always replace the whole sequence.
pub struct HistoryStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, HISTORY_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Absent key is an empty history; unreadable or malformed data is an error
    pub fn try_load(&self) -> Result<Vec<Turn>, HistoryError> {
        match self.storage.get_item(&self.key)? {
            Some(raw) if !raw.is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Empty on any failure
    pub fn load(&self) -> Vec<Turn> {
        self.try_load().unwrap_or_else(|e| {
            log::warn!("Discarding stored history: {}", e);
            Vec::new()
        })
    }

    /// Persist the full history, ignoring storage failures such as quota
    pub fn save(&self, history: &[Turn]) {
        if let Err(e) = self.try_save(history) {
            log::warn!("Failed to persist history: {}", e);
        }
    }

    fn try_save(&self, history: &[Turn]) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(history)?;
        self.storage.set_item(&self.key, &raw)
    }
}

/// `window.localStorage`, or nothing when the browser denies access
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage is not available, history will not persist");
        }
        Self { storage }
    }

    fn inner(&self) -> Result<&web_sys::Storage, HistoryError> {
        self.storage
            .as_ref()
            .ok_or_else(|| HistoryError::Storage("localStorage unavailable".to_string()))
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HistoryError> {
        self.inner()?
            .get_item(key)
            .map_err(|e| HistoryError::Storage(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.inner()?
            .set_item(key, value)
            .map_err(|e| HistoryError::Storage(format!("{:?}", e)))
    }
}
