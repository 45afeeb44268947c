// Input samplers: keyboard/stick fusion and a scripted sampler for headless runs.

use crate::domain::{InputFrame, InputSampler, Vec2, Vec3};

/// Held state of the four movement keys (D, A, W, S).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub right: bool,
    pub left: bool,
    pub forward: bool,
    pub back: bool,
}

/// Fuses keys and the movement stick into a unit-per-axis direction on the ground plane.
///
/// Each axis takes the sign of whichever input is active; when opposite directions are
/// both active the later check wins (left over right, back over forward). Forward/back
/// map to `z`.
pub fn fuse_movement(keys: MovementKeys, stick: Vec2) -> Vec3 {
    let mut direction = Vec3::ZERO;

    if keys.right || stick.x > 0.0 {
        direction.x = 1.0;
    }
    if keys.left || stick.x < 0.0 {
        direction.x = -1.0;
    }
    if keys.forward || stick.y > 0.0 {
        direction.z = 1.0;
    }
    if keys.back || stick.y < 0.0 {
        direction.z = -1.0;
    }

    direction
}

/// Replays a fixed list of frames in a loop.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<InputFrame>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(frames: Vec<InputFrame>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn constant(frame: InputFrame) -> Self {
        Self::new(vec![frame])
    }

    /// Walks a square of `leg_ticks` frames per side and fires once at the end of each
    /// side, aiming along the direction just walked.
    pub fn patrol(leg_ticks: usize) -> Self {
        let legs = [
            MovementKeys {
                right: true,
                ..MovementKeys::default()
            },
            MovementKeys {
                forward: true,
                ..MovementKeys::default()
            },
            MovementKeys {
                left: true,
                ..MovementKeys::default()
            },
            MovementKeys {
                back: true,
                ..MovementKeys::default()
            },
        ];

        let mut frames = Vec::with_capacity(legs.len() * (leg_ticks + 1));
        for keys in legs {
            let movement = fuse_movement(keys, Vec2::ZERO);
            // Diagonal aim so the release edge (axis product hitting zero) triggers.
            let aim = Vec2::new(movement.x + movement.z, movement.z - movement.x);
            for tick in 0..leg_ticks {
                frames.push(InputFrame {
                    movement,
                    aim: if tick + 1 == leg_ticks { aim } else { Vec2::ZERO },
                });
            }
            frames.push(InputFrame::default());
        }
        Self::new(frames)
    }
}

impl InputSampler for ScriptedInput {
    fn sample(&mut self) -> InputFrame {
        if self.frames.is_empty() {
            return InputFrame::default();
        }
        let frame = self.frames[self.cursor % self.frames.len()];
        self.cursor = self.cursor.wrapping_add(1);
        frame
    }
}
