// Exponential smoothing of remote entities toward their authoritative positions.

use crate::domain::tuning::interpolation::InterpolationTuning;
use crate::domain::{EntityStore, Motion, RemoteEntityState};

#[derive(Debug)]
pub struct InterpolationEngine {
    tuning: InterpolationTuning,
}

impl InterpolationEngine {
    pub fn new(tuning: InterpolationTuning) -> Self {
        let tuning = InterpolationTuning {
            // A zero factor would never move; fall back instead of snapping on no progress.
            factor: if tuning.factor.is_finite() && tuning.factor > 0.0 {
                tuning.factor.min(1.0)
            } else {
                InterpolationTuning::default().factor
            },
            epsilon: tuning.epsilon.max(0.0),
        };
        Self { tuning }
    }

    pub fn tuning(&self) -> InterpolationTuning {
        self.tuning
    }

    /// Advances every remote entity by one tick. Returns how many moved.
    pub fn step(&self, store: &mut EntityStore) -> usize {
        let mut moved = 0;
        for (_, record) in store.iter_mut() {
            if let Motion::Interpolated(remote) = &mut record.motion {
                if self.advance(remote) {
                    moved += 1;
                }
            }
        }
        moved
    }

    /// Moves the rendered position `factor` of the way to the authoritative one.
    ///
    /// Snaps when within `epsilon` or when an f32 step stops making progress, so
    /// convergence always terminates.
    pub fn advance(&self, remote: &mut RemoteEntityState) -> bool {
        if remote.is_settled() {
            return false;
        }

        let current = remote.rendered();
        let target = remote.authoritative();
        let next = current.lerp(target, self.tuning.factor);

        if next == current || next.approx_eq(target, self.tuning.epsilon) {
            remote.set_rendered(target);
        } else {
            remote.set_rendered(next);
        }
        true
    }
}

impl Default for InterpolationEngine {
    fn default() -> Self {
        Self::new(InterpolationTuning::default())
    }
}
