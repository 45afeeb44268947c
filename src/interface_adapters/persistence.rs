// Session id persistence for reconnecting to the same room.

use crate::domain::{SessionIds, SessionStorage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Stores the last joined `(room_id, session_id)` pair as a small TOML file.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<SessionIds>, String> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("read {}: {e}", self.path.display())),
        };
        toml::from_str(&text)
            .map(Some)
            .map_err(|e| format!("parse {}: {e}", self.path.display()))
    }

    fn save(&self, ids: &SessionIds) -> Result<(), String> {
        let text = toml::to_string(ids).map_err(|e| format!("encode session ids: {e}"))?;
        std::fs::write(&self.path, text)
            .map_err(|e| format!("write {}: {e}", self.path.display()))
    }

    fn clear(&self) -> Result<(), String> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("remove {}: {e}", self.path.display())),
        }
    }
}

/// Process-local storage, used by tests and when persistence is disabled.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    ids: Mutex<Option<SessionIds>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: SessionIds) -> Self {
        Self {
            ids: Mutex::new(Some(ids)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<SessionIds>, String> {
        let guard = self
            .ids
            .lock()
            .map_err(|_| "session ids mutex poisoned".to_string())?;
        Ok(guard.clone())
    }

    fn save(&self, ids: &SessionIds) -> Result<(), String> {
        let mut guard = self
            .ids
            .lock()
            .map_err(|_| "session ids mutex poisoned".to_string())?;
        *guard = Some(ids.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), String> {
        let mut guard = self
            .ids
            .lock()
            .map_err(|_| "session ids mutex poisoned".to_string())?;
        *guard = None;
        Ok(())
    }
}
