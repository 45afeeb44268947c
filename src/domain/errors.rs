use crate::domain::state::SessionPhase;
use std::fmt;

// Domain-level errors for session and reconciliation workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    // A change/remove event targets a key the store does not hold.
    UnknownEntity { key: String },
    // Local-player reconciliation was requested but the local player is not in the store.
    NoLocalPlayer,
    // Entity events arrived before the session subscribed to them.
    NotSubscribed { phase: SessionPhase },
    InvalidTransition { from: SessionPhase, to: SessionPhase },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownEntity { key } => write!(f, "unknown entity `{key}`"),
            SessionError::NoLocalPlayer => f.write_str("local player is not spawned"),
            SessionError::NotSubscribed { phase } => {
                write!(f, "entity event received while {phase}")
            }
            SessionError::InvalidTransition { from, to } => {
                write!(f, "invalid session transition {from} -> {to}")
            }
        }
    }
}

impl std::error::Error for SessionError {}
