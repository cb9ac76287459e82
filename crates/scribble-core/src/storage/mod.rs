//! Persistence of the last used room membership.
//!
//! Only the username/room pair survives between runs, so a client can
//! re-join on startup. Drawings are never persisted.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemorySessionStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileSessionStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalSessionStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Nothing stored")]
    NotFound,
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The membership remembered between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub room_id: String,
    pub username: String,
    #[serde(default)]
    pub is_creator: bool,
}

/// Backend for the remembered membership.
pub trait SessionStore {
    /// Load the stored membership.
    fn load(&self) -> StorageResult<StoredSession>;

    /// Replace the stored membership.
    fn save(&self, session: &StoredSession) -> StorageResult<()>;

    /// Forget the stored membership. Clearing an empty store is not an error.
    fn clear(&self) -> StorageResult<()>;
}

/// The stored membership, if one exists and can be read. Read failures are
/// logged and treated as "nothing stored".
pub fn load_or_none(store: &dyn SessionStore) -> Option<StoredSession> {
    match store.load() {
        Ok(session) => Some(session),
        Err(StorageError::NotFound) => None,
        Err(e) => {
            log::warn!("Failed to load stored session: {}", e);
            None
        }
    }
}
