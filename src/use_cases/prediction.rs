// Client-side prediction: local input is applied before the server confirms it.

use super::context::SessionContext;
use crate::domain::tuning::prediction::PredictionTuning;
use crate::domain::{Command, InputFrame, Vec2, Vec3};
use tracing::{trace, warn};

#[derive(Debug)]
pub struct PredictionEngine {
    tuning: PredictionTuning,
    // Secondary stick reading from the previous tick (projectile edge trigger).
    last_aim: Vec2,
}

impl PredictionEngine {
    pub fn new(tuning: PredictionTuning) -> Self {
        Self {
            tuning,
            last_aim: Vec2::ZERO,
        }
    }

    pub fn tuning(&self) -> PredictionTuning {
        self.tuning
    }

    /// Runs the local half of a tick and returns the commands to send.
    ///
    /// Movement and projectile commands are only produced while the local player is
    /// alive; the aim history advances every tick regardless.
    pub fn step(&mut self, ctx: &mut SessionContext, frame: InputFrame) -> Vec<Command> {
        let mut commands = Vec::new();

        if ctx.local_alive() {
            if let Some(command) = self.predict_movement(ctx, frame.movement) {
                commands.push(command);
            }
            if let Some(command) = self.projectile_trigger(ctx, frame.aim) {
                commands.push(command);
            }
        }

        self.last_aim = frame.aim;
        commands
    }

    /// Applies `intent` to the predicted position and stamps a movement command.
    ///
    /// A zero intent consumes no sequence number and emits nothing.
    pub fn predict_movement(&self, ctx: &mut SessionContext, intent: Vec3) -> Option<Command> {
        let delta = intent.clamp_length(1.0) * self.tuning.step;
        if delta.is_zero() || !delta.is_finite() {
            return None;
        }

        let key = ctx.local_key.as_deref()?;
        let local = ctx.store.get_mut(key)?.local_state_mut()?;
        let Some(state_num) = ctx.sequence.issue() else {
            warn!(
                pending = ctx.sequence.pending(),
                "movement sequence exhausted; move not predicted"
            );
            return None;
        };
        local.predicted = local.predicted + delta;
        let position = local.predicted;

        trace!(state_num, x = position.x, y = position.y, z = position.z, "predicted move");

        Some(Command::Movement {
            position,
            state_num,
        })
    }

    /// Fires when the previous aim was non-zero and the current axes multiply to zero.
    ///
    /// The edge is on the product of the two axes, not on the stick returning to rest,
    /// so sliding a held aim onto either axis also fires.
    pub fn projectile_trigger(&self, ctx: &SessionContext, aim: Vec2) -> Option<Command> {
        if self.last_aim.is_zero() || aim.x * aim.y != 0.0 {
            return None;
        }

        let record = ctx.local_record()?;
        Some(Command::CreateProjectile {
            position: record.authoritative_position(),
            angle: self.last_aim.angle(),
        })
    }

    pub fn reset(&mut self) {
        self.last_aim = Vec2::ZERO;
    }
}
