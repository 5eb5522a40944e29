//! Data points, the ground-truth base function, synthesis, storage and
//! train/test splitting.

pub mod split;
pub mod store;
pub mod synth;

pub use split::{CachedSplit, Split, Splitter};
pub use store::{IdGenerator, PointStore, SequentialIds};
pub use synth::DataSynthesizer;

use crate::error::{PlaygroundError, Result};
use serde::{Deserialize, Serialize};

/// A sample owned by the [`PointStore`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// A sample of a curve, e.g. model predictions over the grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl From<&Point> for CurvePoint {
    fn from(p: &Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Noiseless ground truth
/// `y = sin_amplitude·sin(sin_frequency·x) + sqrt_coeff·√x + linear_coeff·x`
/// sampled over `[x_min, x_max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseFunction {
    pub sin_amplitude: f64,
    pub sin_frequency: f64,
    pub sqrt_coeff: f64,
    pub linear_coeff: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl Default for BaseFunction {
    fn default() -> Self {
        Self {
            sin_amplitude: 3.0,
            sin_frequency: 0.5,
            sqrt_coeff: 2.0,
            linear_coeff: 0.0,
            x_min: 0.0,
            x_max: 10.0,
        }
    }
}

impl BaseFunction {
    pub fn eval(&self, x: f64) -> f64 {
        self.sin_amplitude * (self.sin_frequency * x).sin()
            + self.sqrt_coeff * x.sqrt()
            + self.linear_coeff * x
    }

    /// `sqrt` restricts the domain to `x >= 0` unless its coefficient is zero.
    pub fn is_defined_at(&self, x: f64) -> bool {
        x.is_finite() && (x >= 0.0 || self.sqrt_coeff == 0.0)
    }

    /// Samples the function at every grid x.
    pub fn sample(&self, xs: &[f64]) -> Vec<CurvePoint> {
        xs.iter()
            .map(|&x| CurvePoint { x, y: self.eval(x) })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            self.sin_amplitude,
            self.sin_frequency,
            self.sqrt_coeff,
            self.linear_coeff,
            self.x_min,
            self.x_max,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PlaygroundError::Configuration(
                "coefficients must be finite numbers".to_string(),
            ));
        }
        if self.x_min < 0.0 {
            return Err(PlaygroundError::Configuration(format!(
                "xMin must be non-negative (sqrt is undefined below 0), got {}",
                self.x_min
            )));
        }
        if self.x_min > self.x_max {
            return Err(PlaygroundError::Configuration(format!(
                "xMin ({}) must not exceed xMax ({})",
                self.x_min, self.x_max
            )));
        }
        Ok(())
    }
}
