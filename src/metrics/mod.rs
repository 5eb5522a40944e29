//! Held-out evaluation of a prediction curve against the test set.
//!
//! The curve is sampled on a grid that generally does not contain the test
//! x-values, so predictions are obtained by linear interpolation between the
//! two bracketing grid points (clamped at the ends, never extrapolated).

use crate::loss::LossKind;
use crate::points::{CurvePoint, Point};
use serde::{Deserialize, Serialize};

/// Test-set error and coefficient of determination.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub test_error: f64,
    pub r2: f64,
}

/// Piecewise-linear view of a prediction curve.
#[derive(Clone, Debug)]
pub struct Evaluator {
    curve: Vec<CurvePoint>,
}

impl Evaluator {
    /// Sorts a copy of `curve` by x.
    pub fn new(curve: &[CurvePoint]) -> Self {
        let mut curve = curve.to_vec();
        curve.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { curve }
    }

    /// Interpolated curve value at `x`, clamped to the endpoint values
    /// outside the curve's range. An empty curve predicts 0.
    pub fn interpolate(&self, x: f64) -> f64 {
        let (Some(first), Some(last)) = (self.curve.first(), self.curve.last()) else {
            return 0.0;
        };
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }
        let hi = self.curve.partition_point(|p| p.x <= x);
        let (a, b) = (self.curve[hi - 1], self.curve[hi]);
        if b.x == a.x {
            return a.y;
        }
        a.y + (b.y - a.y) * (x - a.x) / (b.x - a.x)
    }

    /// Mean per-point loss over the test set; 0 when the test set is empty.
    pub fn error(&self, test: &[Point], loss: LossKind) -> f64 {
        if test.is_empty() {
            return 0.0;
        }
        let total: f64 = test
            .iter()
            .map(|p| loss.pointwise(self.interpolate(p.x) - p.y))
            .sum();
        total / test.len() as f64
    }

    /// `1 - SS_res / SS_tot` around the test set's own mean.
    ///
    /// Returns 1 for an empty test set. When the test targets have no
    /// variance it returns 1 for a perfect fit and 0 otherwise. Poor fits give
    /// negative values; the result is not clamped.
    pub fn r2(&self, test: &[Point]) -> f64 {
        if test.is_empty() {
            return 1.0;
        }
        let mean = test.iter().map(|p| p.y).sum::<f64>() / test.len() as f64;
        let (ss_res, ss_tot) = test.iter().fold((0.0, 0.0), |(res, tot), p| {
            let r = p.y - self.interpolate(p.x);
            let d = p.y - mean;
            (res + r * r, tot + d * d)
        });
        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    pub fn evaluate(&self, test: &[Point], loss: LossKind) -> Metrics {
        Metrics {
            test_error: self.error(test, loss),
            r2: self.r2(test),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(pts: &[(f64, f64)]) -> Vec<CurvePoint> {
        pts.iter().map(|&(x, y)| CurvePoint { x, y }).collect()
    }

    fn point(id: u64, x: f64, y: f64) -> Point {
        Point { id, x, y }
    }

    #[test]
    fn test_interpolation_between_and_outside() {
        // Unordered on purpose.
        let ev = Evaluator::new(&curve(&[(2.0, 4.0), (0.0, 0.0), (1.0, 2.0)]));
        assert_eq!(ev.interpolate(0.5), 1.0);
        assert_eq!(ev.interpolate(1.75), 3.5);
        assert_eq!(ev.interpolate(1.0), 2.0);
        assert_eq!(ev.interpolate(-3.0), 0.0);
        assert_eq!(ev.interpolate(9.0), 4.0);
    }

    #[test]
    fn test_empty_curve_predicts_zero() {
        assert_eq!(Evaluator::new(&[]).interpolate(1.0), 0.0);
    }

    #[test]
    fn test_error_mse_and_mae() {
        let ev = Evaluator::new(&curve(&[(0.0, 0.0), (10.0, 10.0)]));
        let test = [point(1, 1.0, 2.0), point(2, 5.0, 2.0)];
        // residuals: -1, 3
        assert_eq!(ev.error(&test, LossKind::Mse), 5.0);
        assert_eq!(ev.error(&test, LossKind::Mae), 2.0);
    }

    #[test]
    fn test_empty_test_set_conventions() {
        let ev = Evaluator::new(&curve(&[(0.0, 1.0)]));
        let m = ev.evaluate(&[], LossKind::Mse);
        assert_eq!(m.test_error, 0.0);
        assert_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_r2_perfect_and_poor() {
        let ev = Evaluator::new(&curve(&[(0.0, 0.0), (10.0, 20.0)]));
        let on_line = [point(1, 1.0, 2.0), point(2, 3.0, 6.0), point(3, 7.0, 14.0)];
        assert!((ev.r2(&on_line) - 1.0).abs() < 1e-12);

        let flat = Evaluator::new(&curve(&[(0.0, 100.0), (10.0, 100.0)]));
        assert!(flat.r2(&on_line) < 0.0);
    }

    #[test]
    fn test_r2_zero_variance_targets() {
        let test = [point(1, 1.0, 3.0), point(2, 2.0, 3.0)];
        let exact = Evaluator::new(&curve(&[(0.0, 3.0), (5.0, 3.0)]));
        assert_eq!(exact.r2(&test), 1.0);
        let off = Evaluator::new(&curve(&[(0.0, 4.0), (5.0, 4.0)]));
        assert_eq!(off.r2(&test), 0.0);
    }
}
