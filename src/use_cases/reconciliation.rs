// Reconciliation of authoritative snapshots against local predictions.

use super::context::SessionContext;
use crate::domain::{EntityFields, Motion, SessionError, Vec3};
use tracing::debug;

/// Result of applying a snapshot to the local player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciliation {
    // Server reproduced the prediction; only the acked sequence moved.
    Confirmed { acked_seq: u32 },
    // Prediction diverged; the local player was snapped to the server state.
    Corrected {
        predicted: Vec3,
        authoritative: Vec3,
        state_num: u32,
    },
    // Snapshot for a sequence already confirmed; position untouched.
    Stale { server_seq: u32, acked_seq: u32 },
}

/// Running counters kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    pub confirmed: u64,
    pub corrected: u64,
    pub stale: u64,
    pub remote_updates: u64,
}

#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    stats: ReconciliationStats,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ReconciliationStats {
        self.stats
    }

    /// Applies a change notification for any key.
    ///
    /// Remote entities take every snapshot as-is and yield `None`. The local player goes
    /// through sequence-number reconciliation.
    pub fn apply_change(
        &mut self,
        ctx: &mut SessionContext,
        key: &str,
        fields: &EntityFields,
    ) -> Result<Option<Reconciliation>, SessionError> {
        let local = ctx.is_local(key);
        let record = ctx
            .store
            .get_mut(key)
            .ok_or_else(|| SessionError::UnknownEntity {
                key: key.to_string(),
            })?;

        // Non-positional fields are authoritative for every entity.
        record.kind = fields.kind;

        if local {
            return self
                .reconcile_local(ctx, fields.position, fields.state_num)
                .map(Some);
        }

        record.state_num = fields.state_num;
        match &mut record.motion {
            Motion::Interpolated(remote) => remote.set_authoritative(fields.position),
            Motion::Predicted(state) => {
                // Local tracking on a non-local key: keep it in lockstep with the server.
                state.predicted = fields.position;
                state.authoritative = fields.position;
            }
        }
        self.stats.remote_updates += 1;
        Ok(None)
    }

    /// Reconciles the local player's predicted state against a server report.
    pub fn reconcile_local(
        &mut self,
        ctx: &mut SessionContext,
        server_pos: Vec3,
        server_seq: u32,
    ) -> Result<Reconciliation, SessionError> {
        let key = ctx.local_key.as_deref().ok_or(SessionError::NoLocalPlayer)?;
        let record = ctx.store.get_mut(key).ok_or(SessionError::NoLocalPlayer)?;
        let acked_seq = ctx.sequence.acked();

        if server_seq <= acked_seq {
            self.stats.stale += 1;
            debug!(server_seq, acked_seq, "stale local snapshot ignored");
            return Ok(Reconciliation::Stale {
                server_seq,
                acked_seq,
            });
        }

        let state = record.local_state_mut().ok_or(SessionError::NoLocalPlayer)?;
        state.authoritative = server_pos;

        if server_pos == state.predicted {
            record.state_num = server_seq;
            ctx.sequence.acknowledge(server_seq);
            self.stats.confirmed += 1;
            return Ok(Reconciliation::Confirmed {
                acked_seq: server_seq,
            });
        }

        let predicted = state.predicted;
        state.predicted = server_pos;
        record.state_num = server_seq;
        ctx.sequence.acknowledge(server_seq);
        self.stats.corrected += 1;
        debug!(
            server_seq,
            error = predicted.distance(server_pos),
            "prediction diverged; snapped to server state"
        );

        Ok(Reconciliation::Corrected {
            predicted,
            authoritative: server_pos,
            state_num: server_seq,
        })
    }
}
