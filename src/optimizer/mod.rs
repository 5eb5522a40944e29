use crate::backend::{Backend, Scalar, Tensor1D};
use crate::model::LinearParams;
use serde::{Deserialize, Serialize};

/// Trait for gradient-based optimizers.
///
/// Training logic lives in the `Trainer`; the optimizer only turns
/// `(params, gradients)` into new parameters. Stateful optimizers such as
/// [`Adam`] keep their moment estimates between calls, hence `&mut self`.
///
/// # Example
/// ```rust
/// use regression_playground::backend::{CpuBackend, Scalar, Tensor1D};
/// use regression_playground::model::LinearParams;
/// use regression_playground::optimizer::{Optimizer, SGD};
///
/// let params = LinearParams {
///     weights: Tensor1D::<CpuBackend>::new(vec![1.0, 2.0]),
///     bias: Scalar::new(0.5),
/// };
/// let grads = LinearParams {
///     weights: Tensor1D::<CpuBackend>::new(vec![10.0, -10.0]),
///     bias: Scalar::new(1.0),
/// };
/// let mut sgd = SGD::<CpuBackend>::new(0.1);
/// let updated = sgd.step(&params, &grads);
/// assert_eq!(updated.weights.to_vec(), vec![0.0, 3.0]);
/// ```
pub trait Optimizer<B: Backend, P> {
    fn step(&mut self, params: &P, gradients: &P) -> P;
}

/// Plain gradient descent: `θ ← θ - η · ∇L(θ)`.
#[derive(Clone, Debug)]
pub struct SGD<B: Backend> {
    lr: Scalar<B>,
}

impl<B: Backend> SGD<B> {
    pub fn new(lr: f64) -> Self {
        Self {
            lr: Scalar::<B>::new(lr),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr.to_f64()
    }
}

impl<B: Backend> Optimizer<B, LinearParams<B>> for SGD<B> {
    fn step(&mut self, params: &LinearParams<B>, grads: &LinearParams<B>) -> LinearParams<B> {
        let neg_lr = -self.lr;
        LinearParams {
            weights: params.weights.add(&grads.weights.scale(&neg_lr)),
            bias: params.bias - grads.bias * self.lr,
        }
    }
}

/// Adam with bias-corrected step size.
///
/// Moment estimates are allocated lazily on the first step so the optimizer
/// can be built before the feature count is known.
#[derive(Clone, Debug)]
pub struct Adam<B: Backend> {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    beta1_t: f64,
    beta2_t: f64,
    epsilon: f64,
    v: Option<Tensor1D<B>>,
    s: Option<Tensor1D<B>>,
    v_bias: f64,
    s_bias: f64,
}

impl<B: Backend> Adam<B> {
    pub const DEFAULT_BETA1: f64 = 0.9;
    pub const DEFAULT_BETA2: f64 = 0.999;
    pub const DEFAULT_EPSILON: f64 = 1e-7;

    pub fn new(learning_rate: f64) -> Self {
        Self::with_hyperparams(
            learning_rate,
            Self::DEFAULT_BETA1,
            Self::DEFAULT_BETA2,
            Self::DEFAULT_EPSILON,
        )
    }

    pub fn with_hyperparams(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            epsilon,
            v: None,
            s: None,
            v_bias: 0.,
            s_bias: 0.,
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

impl<B: Backend> Optimizer<B, LinearParams<B>> for Adam<B> {
    fn step(&mut self, params: &LinearParams<B>, grads: &LinearParams<B>) -> LinearParams<B> {
        let (lr, b1, b2, eps) = (self.learning_rate, self.beta1, self.beta2, self.epsilon);

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        let n = grads.weights.len();
        let v_prev = self.v.take().unwrap_or_else(|| Tensor1D::zeros(n));
        let s_prev = self.s.take().unwrap_or_else(|| Tensor1D::zeros(n));

        let g = &grads.weights;
        let v = v_prev
            .scale(&Scalar::new(b1))
            .add(&g.scale(&Scalar::new(1. - b1)));
        let s = s_prev
            .scale(&Scalar::new(b2))
            .add(&g.mul(g).scale(&Scalar::new(1. - b2)));

        let update = v
            .div(&s.sqrt().add_scalar(&Scalar::new(eps)))
            .scale(&Scalar::new(-step_size));
        let weights = params.weights.add(&update);

        let gb = grads.bias.to_f64();
        self.v_bias = b1 * self.v_bias + (1. - b1) * gb;
        self.s_bias = b2 * self.s_bias + (1. - b2) * gb * gb;
        let bias = params.bias.to_f64() - step_size * self.v_bias / (self.s_bias.sqrt() + eps);

        self.v = Some(v);
        self.s = Some(s);

        LinearParams {
            weights,
            bias: Scalar::new(bias),
        }
    }
}

/// Optimizer selected by a training request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerKind {
    #[default]
    #[serde(rename = "adam", alias = "Adam")]
    Adam,
    #[serde(rename = "sgd", alias = "SGD")]
    Sgd,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn params(w: Vec<f64>, b: f64) -> LinearParams<CpuBackend> {
        LinearParams {
            weights: Tensor1D::new(w),
            bias: Scalar::new(b),
        }
    }

    #[test]
    fn test_sgd_step() {
        let mut sgd = SGD::<CpuBackend>::new(0.5);
        let out = sgd.step(&params(vec![1.0, 1.0], 1.0), &params(vec![2.0, -2.0], 4.0));
        assert_eq!(out.weights.to_vec(), vec![0.0, 2.0]);
        assert_eq!(out.bias.to_f64(), -1.0);
        assert_eq!(sgd.learning_rate(), 0.5);
    }

    #[test]
    fn test_adam_first_step_moves_by_learning_rate() {
        // First bias-corrected Adam step is lr * sign(g) (up to epsilon).
        let mut adam = Adam::<CpuBackend>::new(0.01);
        let out = adam.step(&params(vec![0.0, 0.0], 0.0), &params(vec![3.0, -0.5], 2.0));
        let w = out.weights.to_vec();
        assert!((w[0] + 0.01).abs() < 1e-6);
        assert!((w[1] - 0.01).abs() < 1e-6);
        assert!((out.bias.to_f64() + 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_adam_converges_on_quadratic() {
        // minimize (w - 3)^2
        let mut adam = Adam::<CpuBackend>::new(0.1);
        let mut p = params(vec![0.0], 0.0);
        for _ in 0..500 {
            let w = p.weights.to_vec()[0];
            let g = params(vec![2.0 * (w - 3.0)], 0.0);
            p = adam.step(&p, &g);
        }
        assert!((p.weights.to_vec()[0] - 3.0).abs() < 5e-2);
    }

    #[test]
    fn test_optimizer_kind_default_is_adam() {
        assert_eq!(OptimizerKind::default(), OptimizerKind::Adam);
        let sgd: OptimizerKind = serde_json::from_str("\"sgd\"").unwrap();
        assert_eq!(sgd, OptimizerKind::Sgd);
    }
}
