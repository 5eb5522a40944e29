/// Marker for a model that is still being trained.
///
/// Only `LinearModel<_, Unfitted>` implements [`TrainableModel`](super::TrainableModel),
/// so prediction on a half-trained model is a compile error.
#[derive(Debug, Clone, Copy)]
pub struct Unfitted;

/// Marker for a model whose training has finished.
///
/// A `Fitted` model carries only inference parameters and implements
/// [`InferenceModel`](super::InferenceModel).
#[derive(Debug, Clone, Copy)]
pub struct Fitted;
