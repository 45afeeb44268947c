// Domain layer: client-side entity model, ports and tuning.

pub mod errors;
pub mod math;
pub mod ports;
pub mod state;
pub mod store;
pub mod tuning;

pub use errors::SessionError;
pub use math::{Vec2, Vec3};
pub use ports::{InputSampler, Presentation, ProxyHandle, SessionIds, SessionStorage};
pub use state::{
    Command, EntityFields, EntityKind, InputFrame, LocalEntityState, Motion, RemoteEntityState,
    SequenceState, SessionPhase,
};
pub use store::{EntityRecord, EntityStore};
