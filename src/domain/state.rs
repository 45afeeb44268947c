// Domain-level entity model, input frames and outbound commands.

use super::math::{Vec2, Vec3};
use std::fmt;

/// Variant-specific fields of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Player { health: f32 },
    Projectile { angle: f32 },
}

impl EntityKind {
    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player { .. })
    }

    pub fn health(&self) -> Option<f32> {
        match self {
            EntityKind::Player { health } => Some(*health),
            EntityKind::Projectile { .. } => None,
        }
    }
}

/// Authoritative field values carried by add/change notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityFields {
    pub position: Vec3,
    // Last movement sequence number the server processed (players only; 0 otherwise).
    pub state_num: u32,
    pub kind: EntityKind,
}

impl EntityFields {
    pub fn player(position: Vec3, state_num: u32, health: f32) -> Self {
        Self {
            position,
            state_num,
            kind: EntityKind::Player { health },
        }
    }

    pub fn projectile(position: Vec3, angle: f32) -> Self {
        Self {
            position,
            state_num: 0,
            kind: EntityKind::Projectile { angle },
        }
    }
}

/// Per-tick output of the input sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    // Movement direction; length above 1 is clamped by prediction.
    pub movement: Vec3,
    // Secondary (aim) stick, used only for the projectile edge trigger.
    pub aim: Vec2,
}

/// Outbound commands produced by the prediction engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Movement { position: Vec3, state_num: u32 },
    CreateProjectile { position: Vec3, angle: f32 },
}

/// Sequence counters for the local player's movement commands.
///
/// `acked <= pending` always holds and neither counter decreases until `reset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceState {
    pending: u32,
    acked: u32,
}

impl SequenceState {
    /// Highest sequence number sent to the server.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Highest sequence number the server has confirmed.
    pub fn acked(&self) -> u32 {
        self.acked
    }

    /// Consumes the next sequence number for an outbound movement command.
    ///
    /// Returns `None` once `pending` has reached `u32::MAX`; the counters are left as-is.
    pub fn issue(&mut self) -> Option<u32> {
        self.pending = self.pending.checked_add(1)?;
        Some(self.pending)
    }

    /// Raises both counters to at least `seq`.
    pub fn seed(&mut self, seq: u32) {
        self.acked = self.acked.max(seq);
        self.pending = self.pending.max(self.acked);
    }

    /// Records `seq` as confirmed. Returns false when it is not newer than the acked one.
    pub fn acknowledge(&mut self, seq: u32) -> bool {
        if seq <= self.acked {
            return false;
        }
        self.acked = seq;
        self.pending = self.pending.max(seq);
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Local player tracking: the prediction runs ahead of the last server report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalEntityState {
    pub predicted: Vec3,
    pub authoritative: Vec3,
}

/// Remote entity tracking: the rendered position trails the authoritative one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteEntityState {
    authoritative: Vec3,
    rendered: Vec3,
}

impl RemoteEntityState {
    pub fn new(position: Vec3) -> Self {
        Self {
            authoritative: position,
            rendered: position,
        }
    }

    pub fn authoritative(&self) -> Vec3 {
        self.authoritative
    }

    pub fn rendered(&self) -> Vec3 {
        self.rendered
    }

    pub fn is_settled(&self) -> bool {
        self.rendered == self.authoritative
    }

    // Written only from inbound snapshots.
    pub(crate) fn set_authoritative(&mut self, position: Vec3) {
        self.authoritative = position;
    }

    // Written only by the interpolation step.
    pub(crate) fn set_rendered(&mut self, position: Vec3) {
        self.rendered = position;
    }
}

/// How a stored entity's position evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Predicted(LocalEntityState),
    Interpolated(RemoteEntityState),
}

/// Connection/session lifecycle as seen by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Joined,
    Subscribed,
    Active,
}

impl SessionPhase {
    /// Whether inbound entity events are routed in this phase.
    pub fn routes_events(self) -> bool {
        matches!(self, SessionPhase::Subscribed | SessionPhase::Active)
    }

    /// Whether `self -> next` is a legal forward step.
    pub fn can_advance_to(self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (SessionPhase::Disconnected, SessionPhase::Connecting)
                | (SessionPhase::Connecting, SessionPhase::Joined)
                | (SessionPhase::Joined, SessionPhase::Subscribed)
                | (SessionPhase::Subscribed, SessionPhase::Active)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Disconnected => "disconnected",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Joined => "joined",
            SessionPhase::Subscribed => "subscribed",
            SessionPhase::Active => "active",
        };
        f.write_str(name)
    }
}
