//! In-memory session store.

use super::{SessionStore, StorageError, StorageResult, StoredSession};
use std::cell::RefCell;

/// In-memory store for tests and throwaway clients.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RefCell<Option<StoredSession>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already remembers `session`.
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: RefCell::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> StorageResult<StoredSession> {
        self.session.borrow().clone().ok_or(StorageError::NotFound)
    }

    fn save(&self, session: &StoredSession) -> StorageResult<()> {
        *self.session.borrow_mut() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.session.borrow_mut().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(matches!(store.load(), Err(StorageError::NotFound)));

        let session = StoredSession {
            room_id: "r1".to_string(),
            username: "ada".to_string(),
            is_creator: true,
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), session);

        store.clear().unwrap();
        assert!(store.load().is_err());
        store.clear().unwrap();
    }
}
