//! File-based session store for native platforms.

use super::{SessionStore, StorageError, StorageResult, StoredSession};
use std::fs;
use std::path::PathBuf;

const FILE_NAME: &str = "session.json";

/// Stores the membership as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store inside `dir`, creating the directory if needed.
    pub fn new(dir: PathBuf) -> StorageResult<Self> {
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            path: dir.join(FILE_NAME),
        })
    }

    /// Create a store in the default location.
    ///
    /// On Unix: `~/.local/share/scribble/`
    /// On Windows: `%LOCALAPPDATA%\scribble\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("scribble"))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> StorageResult<StoredSession> {
        if !self.path.exists() {
            return Err(StorageError::NotFound);
        }
        let json = fs::read_to_string(&self.path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, session: &StoredSession) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }

    fn clear(&self) -> StorageResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", self.path.display(), e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::load_or_none;
    use tempfile::tempdir;

    fn sample() -> StoredSession {
        StoredSession {
            room_id: "r1".to_string(),
            username: "ada".to_string(),
            is_creator: false,
        }
    }

    #[test]
    fn test_file_store_save_load() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf()).unwrap();
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(store.load(), Err(StorageError::NotFound)));
        assert!(load_or_none(&store).is_none());
    }

    #[test]
    fn test_file_store_clear() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf()).unwrap();
        store.save(&sample()).unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileSessionStore::new(nested.clone()).unwrap();
        store.save(&sample()).unwrap();
        assert!(nested.join("session.json").exists());
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(StorageError::Serialization(_))));
        assert!(load_or_none(&store).is_none());
    }
}
