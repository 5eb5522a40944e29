use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::model::{Fitted, InferenceModel, ParamOps, TrainableModel, Unfitted};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Clone, Debug)]
pub struct LinearParams<B: Backend> {
    pub weights: Tensor1D<B>,
    pub bias: Scalar<B>,
}

/// Host-side snapshot of a linear model's parameters.
///
/// `weights[i]` is the coefficient of the i-th feature; for polynomial
/// features that is the coefficient of `x^i`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl ModelState {
    /// Evaluates `bias + Σ weights[i] · x^i` for a scalar input.
    pub fn eval_polynomial(&self, x: f64) -> f64 {
        let mut power = 1.0;
        let mut acc = self.bias;
        for w in &self.weights {
            acc += w * power;
            power *= x;
        }
        acc
    }
}

impl<B: Backend> From<&LinearParams<B>> for ModelState {
    fn from(params: &LinearParams<B>) -> Self {
        Self {
            weights: params.weights.to_vec(),
            bias: params.bias.to_f64(),
        }
    }
}

impl<B: Backend> From<&ModelState> for LinearParams<B> {
    fn from(state: &ModelState) -> Self {
        Self {
            weights: Tensor1D::new(state.weights.clone()),
            bias: Scalar::new(state.bias),
        }
    }
}

impl<B: Backend> ParamOps<B> for LinearParams<B> {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: self.weights.add(&other.weights),
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, scalar: Scalar<B>) -> Self {
        Self {
            weights: self.weights.scale(&scalar),
            bias: self.bias * scalar,
        }
    }
}

pub struct LinearModel<B: Backend, S> {
    params: LinearParams<B>,
    _state: PhantomData<S>,
}

impl<B: Backend> LinearModel<B, Fitted> {
    /// Create a new fitted linear model from params.
    pub fn new(params: LinearParams<B>) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn from_state(state: &ModelState) -> Self {
        Self::new(state.into())
    }

    pub fn n_features(&self) -> usize {
        self.params.weights.len()
    }
}

impl<B: Backend> InferenceModel<B> for LinearModel<B, Fitted> {
    type InputSingle = Tensor1D<B>;
    type InputBatch = Tensor2D<B>;
    type OutputSingle = Scalar<B>;
    type OutputBatch = Tensor1D<B>;
    type ParamsRepr = ModelState;

    /// Predict on a single sample (feature vector).
    fn predict(&self, input: &Self::InputSingle) -> Self::OutputSingle {
        self.params.weights.dot(input) + self.params.bias
    }

    fn predict_batch(&self, input: &Self::InputBatch) -> Self::OutputBatch {
        input.dot(&self.params.weights).add_scalar(&self.params.bias)
    }

    fn extract_params(&self) -> Self::ParamsRepr {
        (&self.params).into()
    }
}

impl<B: Backend> TrainableModel<B> for LinearModel<B, Unfitted> {
    type Params = LinearParams<B>;
    type Gradients = LinearParams<B>;
    type Prediction = Tensor1D<B>;
    type Input = Tensor2D<B>;
    type Output = LinearModel<B, Fitted>;

    fn forward(&self, x: &Self::Input) -> Self::Prediction {
        x.dot(&self.params.weights).add_scalar(&self.params.bias)
    }

    fn backward(&self, x: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients {
        LinearParams {
            weights: x.tdot(grad_output),
            bias: grad_output.sum(),
        }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn into_fitted(self) -> LinearModel<B, Fitted> {
        LinearModel::<B, Fitted>::new(self.params)
    }
}

pub type LinearRegression<B> = LinearModel<B, Unfitted>;

impl<B: Backend> LinearRegression<B> {
    /// Zero-initialized model over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        let params = LinearParams {
            weights: Tensor1D::<B>::zeros(n_features),
            bias: Scalar::<B>::new(0.),
        };
        Self {
            params,
            _state: PhantomData,
        }
    }

    pub fn from_params(params: LinearParams<B>) -> Self {
        Self {
            params,
            _state: PhantomData,
        }
    }

    /// Snapshot of the current parameters.
    pub fn state(&self) -> ModelState {
        (&self.params).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_forward_and_backward() {
        let params = LinearParams {
            weights: Tensor1D::<CpuBackend>::new(vec![1.0, 2.0]),
            bias: Scalar::new(0.5),
        };
        let model = LinearRegression::from_params(params);
        let x = Tensor2D::<CpuBackend>::new(vec![1.0, 0.0, 1.0, 3.0], 2, 2);

        let preds = model.forward(&x);
        assert_eq!(preds.to_vec(), vec![1.5, 7.5]);

        let grads = model.backward(&x, &Tensor1D::new(vec![1.0, -1.0]));
        assert_eq!(grads.weights.to_vec(), vec![0.0, -3.0]);
        assert_eq!(grads.bias.to_f64(), 0.0);
    }

    #[test]
    fn test_param_ops() {
        let a = LinearParams::<CpuBackend> {
            weights: Tensor1D::new(vec![1.0, 2.0]),
            bias: Scalar::new(1.0),
        };
        let b = a.scale(Scalar::new(2.0)).add(&a);
        assert_eq!(b.weights.to_vec(), vec![3.0, 6.0]);
        assert_eq!(b.bias.to_f64(), 3.0);
    }

    #[test]
    fn test_state_round_trip_into_fitted() {
        let state = ModelState {
            weights: vec![1.0, 2.0, 3.0],
            bias: 0.5,
        };
        let model = LinearModel::<CpuBackend, Fitted>::from_state(&state);
        assert_eq!(model.n_features(), 3);
        assert_eq!(model.extract_params(), state);

        let pred = model.predict(&Tensor1D::new(vec![1.0, 2.0, 4.0]));
        assert_eq!(pred.to_f64(), 1.0 + 4.0 + 12.0 + 0.5);
    }

    #[test]
    fn test_eval_polynomial() {
        let state = ModelState {
            weights: vec![2.0, 1.0, 0.5],
            bias: 0.5,
        };
        // 0.5 + 2 + 1*2 + 0.5*4
        assert_eq!(state.eval_polynomial(2.0), 6.5);
    }

    #[test]
    fn test_model_state_serializes_as_plain_json() {
        let state = ModelState {
            weights: vec![1.0],
            bias: -2.0,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({"weights": [1.0], "bias": -2.0}));
    }
}
