// Session-scoped state shared by the engines. Owned by the session controller and lent
// to each engine for the duration of one operation.

use crate::domain::{EntityRecord, EntityStore, SequenceState};

#[derive(Debug, Default)]
pub struct SessionContext {
    // Entity key of the local player (the server-assigned session id).
    pub local_key: Option<String>,
    pub store: EntityStore,
    pub sequence: SequenceState,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_local(&self, key: &str) -> bool {
        self.local_key.as_deref() == Some(key)
    }

    pub fn local_record(&self) -> Option<&EntityRecord> {
        self.local_key
            .as_deref()
            .and_then(|key| self.store.get(key))
    }

    /// The local player exists and has health left.
    pub fn local_alive(&self) -> bool {
        self.local_record()
            .and_then(|record| record.kind.health())
            .is_some_and(|health| health > 0.0)
    }
}
