/// Gameplay tuning for local movement prediction.
///
/// Keep this separate from runtime/client configuration (tick rates, URLs, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PredictionTuning {
    /// World units moved per tick for a full-length movement intent (`dP`).
    pub step: f32,
}

impl Default for PredictionTuning {
    fn default() -> Self {
        Self { step: 0.1 }
    }
}
