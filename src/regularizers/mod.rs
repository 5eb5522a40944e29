use crate::backend::{Backend, Scalar, Tensor1D};
use crate::error::PlaygroundError;
use crate::model::{LinearParams, LinearRegression, TrainableModel};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Weight penalty added to the training objective.
///
/// Returns the penalty value and its gradient with respect to the model's
/// parameters. The bias is never penalized.
pub trait Regularizer<B: Backend, M: TrainableModel<B>> {
    fn regularizer_penalty_grad(&self, model: &M) -> (Scalar<B>, M::Gradients);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRegularizer;

impl<B: Backend> Regularizer<B, LinearRegression<B>> for NoRegularizer {
    fn regularizer_penalty_grad(&self, model: &LinearRegression<B>) -> (Scalar<B>, LinearParams<B>) {
        let n = model.params().weights.len();
        (
            Scalar::new(0.),
            LinearParams {
                weights: Tensor1D::zeros(n),
                bias: Scalar::new(0.),
            },
        )
    }
}

/// Lasso penalty `λ·Σ|w|`.
#[derive(Clone, Copy, Debug)]
pub struct L1 {
    lambda: f64,
}

impl L1 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }
}

impl<B: Backend> Regularizer<B, LinearRegression<B>> for L1 {
    fn regularizer_penalty_grad(&self, model: &LinearRegression<B>) -> (Scalar<B>, LinearParams<B>) {
        let w = &model.params().weights;
        let lambda = Scalar::<B>::new(self.lambda);
        (
            w.abs().sum() * lambda,
            LinearParams {
                weights: w.sign().scale(&lambda),
                bias: Scalar::new(0.),
            },
        )
    }
}

/// Ridge penalty `λ·Σw²`.
#[derive(Clone, Copy, Debug)]
pub struct L2 {
    lambda: f64,
}

impl L2 {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }
}

impl<B: Backend> Regularizer<B, LinearRegression<B>> for L2 {
    fn regularizer_penalty_grad(&self, model: &LinearRegression<B>) -> (Scalar<B>, LinearParams<B>) {
        let w = &model.params().weights;
        let lambda = Scalar::<B>::new(self.lambda);
        (
            w.dot(w) * lambda,
            LinearParams {
                weights: w.scale(&Scalar::new(2.0 * self.lambda)),
                bias: Scalar::new(0.),
            },
        )
    }
}

/// Regularization selected by a training request.
///
/// Parsed from `"None"`, `""`, `"L1"` or `"L2"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegularizationKind {
    #[default]
    None,
    L1,
    L2,
}

impl FromStr for RegularizationKind {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "None" | "none" => Ok(Self::None),
            "L1" | "l1" => Ok(Self::L1),
            "L2" | "l2" => Ok(Self::L2),
            other => Err(PlaygroundError::Configuration(format!(
                "unknown regularization type '{other}' (expected None, L1 or L2)"
            ))),
        }
    }
}

impl fmt::Display for RegularizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::L1 => f.write_str("L1"),
            Self::L2 => f.write_str("L2"),
        }
    }
}

impl Serialize for RegularizationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RegularizationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(Self::None),
            Some(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn model(weights: Vec<f64>) -> LinearRegression<CpuBackend> {
        LinearRegression::from_params(LinearParams {
            weights: Tensor1D::new(weights),
            bias: Scalar::new(5.0),
        })
    }

    #[test]
    fn test_l1_penalty_and_grad() {
        let m = model(vec![1.0, -2.0, 0.0]);
        let (penalty, grad) = L1::new(0.1).regularizer_penalty_grad(&m);
        assert!((penalty.to_f64() - 0.3).abs() < 1e-12);
        assert_eq!(grad.weights.to_vec(), vec![0.1, -0.1, 0.0]);
        assert_eq!(grad.bias.to_f64(), 0.0);
    }

    #[test]
    fn test_l2_penalty_and_grad() {
        let m = model(vec![1.0, -2.0]);
        let (penalty, grad) = L2::new(0.1).regularizer_penalty_grad(&m);
        assert!((penalty.to_f64() - 0.5).abs() < 1e-12);
        let g = grad.weights.to_vec();
        assert!((g[0] - 0.2).abs() < 1e-12);
        assert!((g[1] + 0.4).abs() < 1e-12);
        assert_eq!(grad.bias.to_f64(), 0.0);
    }

    #[test]
    fn test_no_regularizer_is_zero() {
        let m = model(vec![3.0, 4.0]);
        let (penalty, grad) = NoRegularizer.regularizer_penalty_grad(&m);
        assert_eq!(penalty.to_f64(), 0.0);
        assert_eq!(grad.weights.to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_regularization_kind_parsing() {
        assert_eq!("None".parse::<RegularizationKind>().unwrap(), RegularizationKind::None);
        assert_eq!("".parse::<RegularizationKind>().unwrap(), RegularizationKind::None);
        assert_eq!("L1".parse::<RegularizationKind>().unwrap(), RegularizationKind::L1);
        assert_eq!("L2".parse::<RegularizationKind>().unwrap(), RegularizationKind::L2);
        assert!("L3".parse::<RegularizationKind>().is_err());

        let from_json: RegularizationKind = serde_json::from_str("null").unwrap();
        assert_eq!(from_json, RegularizationKind::None);
        assert_eq!(serde_json::to_string(&RegularizationKind::L2).unwrap(), "\"L2\"");
    }
}
