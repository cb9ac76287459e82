//! Browser `localStorage` session store.

use super::{SessionStore, StorageError, StorageResult, StoredSession};

const KEY: &str = "scribble.session";

/// Stores the membership under a single `localStorage` key.
#[derive(Debug, Default)]
pub struct LocalSessionStore;

impl LocalSessionStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> StorageResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| StorageError::Io("No window".to_string()))?
            .local_storage()
            .map_err(|e| StorageError::Io(format!("localStorage unavailable: {:?}", e)))?
            .ok_or_else(|| StorageError::Io("localStorage unavailable".to_string()))
    }
}

impl SessionStore for LocalSessionStore {
    fn load(&self) -> StorageResult<StoredSession> {
        let json = Self::storage()?
            .get_item(KEY)
            .map_err(|e| StorageError::Io(format!("{:?}", e)))?
            .ok_or(StorageError::NotFound)?;
        serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn save(&self, session: &StoredSession) -> StorageResult<()> {
        let json = serde_json::to_string(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Self::storage()?
            .set_item(KEY, &json)
            .map_err(|e| StorageError::Io(format!("{:?}", e)))
    }

    fn clear(&self) -> StorageResult<()> {
        Self::storage()?
            .remove_item(KEY)
            .map_err(|e| StorageError::Io(format!("{:?}", e)))
    }
}
