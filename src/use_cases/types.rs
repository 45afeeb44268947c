// Use-case level inputs/outputs for the session controller.

use super::reconciliation::Reconciliation;
use crate::domain::{EntityFields, Vec3};

/// Inbound notifications, already decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Added { key: String, fields: EntityFields },
    Removed { key: String },
    Changed { key: String, fields: EntityFields },
    // Generic `movement` message: the server's view of the local player.
    Movement { position: Vec3, state_num: u32 },
}

/// What handling an inbound event did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventOutcome {
    Spawned { local: bool },
    Despawned,
    // Authoritative fields of a remote entity were overwritten.
    Updated,
    Reconciled(Reconciliation),
    // Event for a key removed locally by death inference.
    Ignored,
}
