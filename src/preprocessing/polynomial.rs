//! Polynomial feature generation.
//!
//! Maps a scalar input `x` to `[x^0, x^1, …, x^degree]`. The constant column is
//! always present, so a degree-0 expansion is `[1]`.

use crate::backend::{Backend, Tensor2D};
use crate::dataset::InMemoryDataset;
use crate::error::{PlaygroundError, Result};

/// Expands scalar inputs into polynomial feature vectors.
///
/// # Example
/// ```rust
/// use regression_playground::preprocessing::PolynomialFeatures;
///
/// let poly = PolynomialFeatures::new(3);
/// assert_eq!(poly.expand(2.0), vec![1.0, 2.0, 4.0, 8.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolynomialFeatures {
    degree: usize,
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    /// Validates a requested degree against an upper bound.
    pub fn checked(degree: i64, max_degree: usize) -> Result<Self> {
        if degree < 0 {
            return Err(PlaygroundError::Configuration(format!(
                "degree must be non-negative, got {degree}"
            )));
        }
        let degree = degree as usize;
        if degree > max_degree {
            return Err(PlaygroundError::Configuration(format!(
                "degree must be at most {max_degree}, got {degree}"
            )));
        }
        Ok(Self::new(degree))
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of output columns (`degree + 1`).
    pub fn n_features_out(&self) -> usize {
        self.degree + 1
    }

    pub fn expand(&self, x: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_features_out());
        let mut power = 1.0;
        for _ in 0..=self.degree {
            out.push(power);
            power *= x;
        }
        out
    }

    pub fn expand_all(&self, xs: &[f64]) -> Vec<Vec<f64>> {
        xs.iter().map(|&x| self.expand(x)).collect()
    }

    /// Feature matrix of shape `(xs.len(), degree + 1)`.
    pub fn transform<B: Backend>(&self, xs: &[f64]) -> Tensor2D<B> {
        let cols = self.n_features_out();
        let data = xs.iter().flat_map(|&x| self.expand(x)).collect();
        Tensor2D::new(data, xs.len(), cols)
    }

    /// Builds a training dataset from `(x, y)` samples.
    pub fn dataset(&self, xs: &[f64], ys: &[f64]) -> Result<InMemoryDataset> {
        InMemoryDataset::new(self.expand_all(xs), ys.to_vec())
    }
}
