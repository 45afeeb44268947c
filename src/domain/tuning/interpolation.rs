/// Tuning for remote entity smoothing.

#[derive(Debug, Clone, Copy)]
pub struct InterpolationTuning {
    /// Fraction of the remaining distance covered each tick (0.0..=1.0).
    pub factor: f32,

    /// Distance below which the rendered position snaps onto the authoritative one.
    pub epsilon: f32,
}

impl Default for InterpolationTuning {
    fn default() -> Self {
        Self {
            factor: 0.1,
            epsilon: 1e-4,
        }
    }
}
