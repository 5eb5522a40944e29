//! Closed-form polynomial least squares, used as a comparison overlay next to
//! the gradient-descent fit.

use crate::equation::format_equation;
use crate::error::{PlaygroundError, Result};
use crate::points::CurvePoint;
use nalgebra::{DMatrix, DVector};

/// Ordinary-least-squares polynomial; `coefficients[i]` multiplies `x^i`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosedFormFit {
    coefficients: Vec<f64>,
}

impl ClosedFormFit {
    /// Solves the normal equations `(XᵀX)·c = Xᵀy` over the Vandermonde matrix
    /// of `xs` with an LU decomposition.
    ///
    /// # Errors
    /// `InsufficientData` with fewer than `degree + 1` samples or when the
    /// system is singular; `Configuration` if `xs` and `ys` differ in length.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(PlaygroundError::Configuration(format!(
                "{} inputs but {} targets",
                xs.len(),
                ys.len()
            )));
        }
        let terms = degree + 1;
        if xs.len() < terms {
            return Err(PlaygroundError::InsufficientData(format!(
                "closed-form fit of degree {degree} needs at least {terms} points, got {}",
                xs.len()
            )));
        }

        let vandermonde = DMatrix::from_fn(xs.len(), terms, |r, c| xs[r].powi(c as i32));
        let targets = DVector::from_column_slice(ys);
        let xt = vandermonde.transpose();
        let gram = &xt * &vandermonde;
        let moment = &xt * &targets;

        let solution = gram.lu().solve(&moment).ok_or_else(|| {
            PlaygroundError::InsufficientData(
                "closed-form system is singular; add points with distinct x".to_string(),
            )
        })?;
        let coefficients: Vec<f64> = solution.iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PlaygroundError::InsufficientData(
                "closed-form system is ill-conditioned".to_string(),
            ));
        }
        Ok(Self { coefficients })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    pub fn sample(&self, xs: &[f64]) -> Vec<CurvePoint> {
        xs.iter()
            .map(|&x| CurvePoint { x, y: self.eval(x) })
            .collect()
    }

    pub fn equation(&self) -> String {
        format_equation(&self.coefficients, 0.0)
    }
}
