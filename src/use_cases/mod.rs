// Use cases layer: prediction, reconciliation and interpolation workflows for the client.

pub mod context;
pub mod interpolation;
pub mod prediction;
pub mod reconciliation;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::SessionContext;
pub use interpolation::InterpolationEngine;
pub use prediction::PredictionEngine;
pub use reconciliation::{Reconciliation, ReconciliationEngine, ReconciliationStats};
pub use session::{SessionController, SessionSettings};
pub use types::{EventOutcome, ServerEvent};
