use crate::points::CurvePoint;
use serde::{Deserialize, Serialize};

/// Snapshot of the model taken during training, for playback on the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingCheckpoint {
    /// Zero-based epoch index.
    pub step: usize,
    pub weights: Vec<f64>,
    pub bias: f64,
    /// Model output sampled over the prediction grid.
    pub predictions: Vec<CurvePoint>,
    pub equation: String,
    /// Training objective at this epoch (data loss plus penalty).
    pub error: f64,
    /// Data loss on the held-out validation rows, if there are any.
    pub val_error: Option<f64>,
}

/// Receives checkpoints as the trainer produces them.
pub trait CheckpointSink {
    fn record(&mut self, checkpoint: TrainingCheckpoint);
}

impl CheckpointSink for Vec<TrainingCheckpoint> {
    fn record(&mut self, checkpoint: TrainingCheckpoint) {
        self.push(checkpoint);
    }
}

/// Discards every checkpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl CheckpointSink for NullSink {
    fn record(&mut self, _checkpoint: TrainingCheckpoint) {}
}

/// Epoch spacing between checkpoints: `max(1, floor(epochs / 100))`.
pub fn save_interval(epochs: usize) -> usize {
    (epochs / 100).max(1)
}

/// Whether `epoch` (zero-based) is checkpointed in a run of `epochs` epochs.
pub fn is_checkpoint_epoch(epoch: usize, epochs: usize) -> bool {
    epoch % save_interval(epochs) == 0 || epoch + 1 == epochs
}
