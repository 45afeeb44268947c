use serde::{Deserialize, Serialize};

use crate::domain::math::Vec3;
use crate::domain::state::{EntityFields, InputFrame};

/// Opaque handle to a presentation-side proxy object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyHandle(pub u64);

// Port for the presentation layer. The core never touches rendering primitives directly.
pub trait Presentation {
    fn create_proxy(&mut self, key: &str, fields: &EntityFields) -> ProxyHandle;
    fn destroy_proxy(&mut self, handle: ProxyHandle);
    fn set_proxy_position(&mut self, handle: ProxyHandle, position: Vec3);

    // Visual cue for a locally inferred death; purely cosmetic.
    fn play_death_effect(&mut self, _position: Vec3) {}
}

// Port for the input sampler. Raw device polling stays outside the core.
pub trait InputSampler {
    fn sample(&mut self) -> InputFrame;
}

// Serde derives here leak a dependency into the domain; the ids are persisted as-is.
// Identifiers handed out by the server when a room is joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIds {
    pub room_id: String,
    pub session_id: String,
}

// Port for persisting session identifiers between runs (reconnect support).
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<SessionIds>, String>;
    fn save(&self, ids: &SessionIds) -> Result<(), String>;
    fn clear(&self) -> Result<(), String>;
}
