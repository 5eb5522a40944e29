pub mod state;
pub use state::{Fitted, Unfitted};

pub mod linear;
pub use linear::{LinearModel, LinearParams, LinearRegression, ModelState};

use crate::backend::{Backend, Scalar};

/// A model that can be fitted by gradient descent.
///
/// `backward` receives the gradient of the loss with respect to the model's
/// predictions and returns the gradient with respect to its parameters.
pub trait TrainableModel<B: Backend> {
    type Input;
    type Prediction;
    type Params;
    type Gradients;
    type Output;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);

    fn into_fitted(self) -> Self::Output;
}

pub trait ParamOps<B: Backend>: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, scalar: Scalar<B>) -> Self;
}

pub trait InferenceModel<B: Backend> {
    type InputSingle;
    type OutputSingle;
    type InputBatch;
    type OutputBatch;
    type ParamsRepr;

    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle;
    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch;

    /// Copies the model's parameters out to host memory.
    fn extract_params(&self) -> Self::ParamsRepr;
}
