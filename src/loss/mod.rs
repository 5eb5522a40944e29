use crate::backend::{Backend, Scalar, Tensor1D};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A differentiable loss function used during training.
///
/// `loss` gives the scalar value reported in checkpoints; `grad_wrt_prediction`
/// is what gets passed to the model's `backward()`.
pub trait Loss<B: Backend> {
    fn loss(&self, prediction: &Tensor1D<B>, target: &Tensor1D<B>) -> Scalar<B>;

    /// Computes ∂L/∂pred.
    fn grad_wrt_prediction(&self, prediction: &Tensor1D<B>, target: &Tensor1D<B>) -> Tensor1D<B>;
}

/// Mean Squared Error: `L = (1/n) * Σ(pred_i - target_i)^2`
///
/// Gradient w.r.t. prediction: `∂L/∂pred = 2(pred - target) / n`
#[derive(Clone, Copy, Debug, Default)]
pub struct MSELoss;

impl<B: Backend> Loss<B> for MSELoss {
    fn loss(&self, pred: &Tensor1D<B>, target: &Tensor1D<B>) -> Scalar<B> {
        let diff = pred.sub(target);
        diff.mul(&diff).mean()
    }

    fn grad_wrt_prediction(&self, pred: &Tensor1D<B>, target: &Tensor1D<B>) -> Tensor1D<B> {
        let n = Scalar::<B>::new(2.0 / pred.len().max(1) as f64);
        pred.sub(target).scale(&n)
    }
}

/// Mean Absolute Error: `L = (1/n) * Σ|pred_i - target_i|`
///
/// Gradient w.r.t. prediction: `∂L/∂pred = sign(pred - target) / n`
/// (subgradient 0 at zero).
#[derive(Clone, Copy, Debug, Default)]
pub struct MAELoss;

impl<B: Backend> Loss<B> for MAELoss {
    fn loss(&self, pred: &Tensor1D<B>, target: &Tensor1D<B>) -> Scalar<B> {
        pred.sub(target).abs().mean()
    }

    fn grad_wrt_prediction(&self, pred: &Tensor1D<B>, target: &Tensor1D<B>) -> Tensor1D<B> {
        let n = Scalar::<B>::new(1.0 / pred.len().max(1) as f64);
        pred.sub(target).sign().scale(&n)
    }
}

/// Loss selected by a training request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    #[default]
    #[serde(rename = "MSE", alias = "mse")]
    Mse,
    #[serde(rename = "MAE", alias = "mae")]
    Mae,
}

impl LossKind {
    /// Per-sample penalty of a residual under this loss.
    pub fn pointwise(self, residual: f64) -> f64 {
        match self {
            LossKind::Mse => residual * residual,
            LossKind::Mae => residual.abs(),
        }
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossKind::Mse => f.write_str("MSE"),
            LossKind::Mae => f.write_str("MAE"),
        }
    }
}
