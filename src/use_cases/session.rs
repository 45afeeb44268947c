// Session controller: owns the session context, wires the engines together and drives
// the per-tick pipeline.

use super::context::SessionContext;
use super::interpolation::InterpolationEngine;
use super::prediction::PredictionEngine;
use super::reconciliation::{ReconciliationEngine, ReconciliationStats};
use super::types::{EventOutcome, ServerEvent};
use crate::domain::tuning::interpolation::InterpolationTuning;
use crate::domain::tuning::prediction::PredictionTuning;
use crate::domain::{
    Command, EntityFields, EntityRecord, InputFrame, Presentation, SequenceState, SessionError,
    SessionIds, SessionPhase,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Tuning applied to a new session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSettings {
    pub prediction: PredictionTuning,
    pub interpolation: InterpolationTuning,
}

pub struct SessionController<P> {
    phase: SessionPhase,
    ids: Option<SessionIds>,
    ctx: SessionContext,
    prediction: PredictionEngine,
    reconciliation: ReconciliationEngine,
    interpolation: InterpolationEngine,
    presentation: P,
    // Keys removed by local death inference, awaiting the server's own remove.
    tombstones: HashSet<String>,
    ticks: u64,
}

impl<P: Presentation> SessionController<P> {
    pub fn new(settings: SessionSettings, presentation: P) -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            ids: None,
            ctx: SessionContext::new(),
            prediction: PredictionEngine::new(settings.prediction),
            reconciliation: ReconciliationEngine::new(),
            interpolation: InterpolationEngine::new(settings.interpolation),
            presentation,
            tombstones: HashSet::new(),
            ticks: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn ids(&self) -> Option<&SessionIds> {
        self.ids.as_ref()
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn sequence(&self) -> SequenceState {
        self.ctx.sequence
    }

    pub fn stats(&self) -> ReconciliationStats {
        self.reconciliation.stats()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn is_tombstoned(&self, key: &str) -> bool {
        self.tombstones.contains(key)
    }

    /// Disconnected -> Connecting.
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        self.advance(SessionPhase::Connecting)
    }

    /// Connecting -> Joined. The session id becomes the local player's entity key.
    pub fn on_joined(&mut self, ids: SessionIds) -> Result<(), SessionError> {
        self.advance(SessionPhase::Joined)?;
        self.ctx.local_key = Some(ids.session_id.clone());
        info!(room_id = %ids.room_id, session_id = %ids.session_id, "joined room");
        self.ids = Some(ids);
        Ok(())
    }

    /// Joined -> Subscribed. Entity events are routed from here on.
    pub fn subscribe(&mut self) -> Result<(), SessionError> {
        self.advance(SessionPhase::Subscribed)
    }

    pub fn handle_event(&mut self, event: ServerEvent) -> Result<EventOutcome, SessionError> {
        if !self.phase.routes_events() {
            return Err(SessionError::NotSubscribed { phase: self.phase });
        }

        match event {
            ServerEvent::Added { key, fields } => self.add_entity(key, fields),
            ServerEvent::Removed { key } => self.remove_entity(&key),
            ServerEvent::Changed { key, fields } => {
                if self.tombstones.contains(&key) {
                    debug!(%key, "change for locally removed entity dropped");
                    return Ok(EventOutcome::Ignored);
                }
                let outcome = self
                    .reconciliation
                    .apply_change(&mut self.ctx, &key, &fields)?;
                Ok(outcome.map_or(EventOutcome::Updated, EventOutcome::Reconciled))
            }
            ServerEvent::Movement {
                position,
                state_num,
            } => {
                let local_dead = self
                    .ctx
                    .local_key
                    .as_deref()
                    .is_some_and(|key| self.tombstones.contains(key));
                if local_dead {
                    return Ok(EventOutcome::Ignored);
                }
                self.reconciliation
                    .reconcile_local(&mut self.ctx, position, state_num)
                    .map(EventOutcome::Reconciled)
            }
        }
    }

    /// Runs one logical frame and returns the commands to send.
    ///
    /// Order: prediction, death inference, interpolation, proxy positions.
    pub fn tick(&mut self, frame: InputFrame) -> Vec<Command> {
        if !self.phase.routes_events() {
            return Vec::new();
        }
        self.ticks += 1;

        let commands = self.prediction.step(&mut self.ctx, frame);
        self.sweep_dead();
        self.interpolation.step(&mut self.ctx.store);

        for (_, record) in self.ctx.store.iter() {
            if let Some(handle) = record.proxy {
                self.presentation
                    .set_proxy_position(handle, record.rendered_position());
            }
        }

        commands
    }

    /// Drops every prediction and entity and returns to `Disconnected`.
    pub fn teardown(&mut self) {
        let entities = self.ctx.store.len();
        for (_, record) in self.ctx.store.drain() {
            if let Some(handle) = record.proxy {
                self.presentation.destroy_proxy(handle);
            }
        }
        let pending = self.ctx.sequence.pending().saturating_sub(self.ctx.sequence.acked());
        self.ctx.sequence.reset();
        self.ctx.local_key = None;
        self.prediction.reset();
        self.tombstones.clear();
        self.ids = None;

        if self.phase != SessionPhase::Disconnected {
            info!(
                from = %self.phase,
                entities,
                dropped_predictions = pending,
                ticks = self.ticks,
                "session torn down"
            );
        }
        self.phase = SessionPhase::Disconnected;
    }

    fn advance(&mut self, next: SessionPhase) -> Result<(), SessionError> {
        if !self.phase.can_advance_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        debug!(from = %self.phase, to = %next, "session phase");
        self.phase = next;
        Ok(())
    }

    fn add_entity(&mut self, key: String, fields: EntityFields) -> Result<EventOutcome, SessionError> {
        // A fresh add always starts a new incarnation.
        self.tombstones.remove(&key);

        if let Some(previous) = self.ctx.store.remove(&key) {
            warn!(%key, "add for an existing entity; replacing it");
            if let Some(handle) = previous.proxy {
                self.presentation.destroy_proxy(handle);
            }
        }

        let local = self.ctx.is_local(&key);
        let mut record = if local {
            EntityRecord::local(&fields)
        } else {
            EntityRecord::remote(&fields)
        };
        record.proxy = Some(self.presentation.create_proxy(&key, &fields));

        if local {
            self.ctx.sequence.seed(fields.state_num);
            if self.phase == SessionPhase::Subscribed {
                self.advance(SessionPhase::Active)?;
            }
        }

        info!(
            %key,
            local,
            x = fields.position.x,
            y = fields.position.y,
            z = fields.position.z,
            "entity added"
        );
        self.ctx.store.insert(key, record);
        Ok(EventOutcome::Spawned { local })
    }

    fn remove_entity(&mut self, key: &str) -> Result<EventOutcome, SessionError> {
        match self.ctx.store.remove(key) {
            Some(record) => {
                if let Some(handle) = record.proxy {
                    self.presentation.destroy_proxy(handle);
                }
                info!(%key, "entity removed");
                Ok(EventOutcome::Despawned)
            }
            None if self.tombstones.remove(key) => {
                debug!(%key, "server removal of locally removed entity");
                Ok(EventOutcome::Ignored)
            }
            None => Err(SessionError::UnknownEntity {
                key: key.to_string(),
            }),
        }
    }

    // Client-side death inference: players with no health are removed locally without
    // waiting for the server.
    fn sweep_dead(&mut self) {
        for key in self.ctx.store.dead_keys() {
            let Some(record) = self.ctx.store.remove(&key) else {
                continue;
            };
            if let Some(handle) = record.proxy {
                self.presentation
                    .play_death_effect(record.rendered_position());
                self.presentation.destroy_proxy(handle);
            }
            info!(%key, local = record.is_local(), "player health depleted; removed locally");
            self.tombstones.insert(key);
        }
    }
}
