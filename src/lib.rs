//! # regression-playground
//!
//! Server-side core of an interactive polynomial-regression playground: a
//! noisy synthetic dataset that a user edits point by point, a stable
//! train/test split, a gradient-descent fit of a polynomial of chosen degree
//! with periodic checkpoints, and held-out evaluation of the fitted curve.
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: Models carry their training state in the type system
//!   (`Unfitted` vs `Fitted`), preventing invalid operations at compile time.
//! - **Training/Inference Separation**: losses, regularizers and optimizers
//!   live outside the model; the `Trainer` wires them together.
//! - **Backend Agnosticism**: the numeric code is written against the `Backend`
//!   trait and runs on `CpuBackend` or, with the `ndarray` feature, `NdarrayBackend`.
//!
//! ## Quick Start
//!
//! ```rust
//! use regression_playground::backend::CpuBackend;
//! use regression_playground::preprocessing::PolynomialFeatures;
//! use regression_playground::trainer::{fit_polynomial, FitControl, FitSettings, TrainingCheckpoint};
//!
//! // y = 1 + 2x
//! let xs: Vec<f64> = (0..20).map(|i| i as f64 / 4.0).collect();
//! let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();
//!
//! let settings = FitSettings { epochs: 200, learning_rate: 0.1, ..Default::default() };
//! let mut history: Vec<TrainingCheckpoint> = Vec::new();
//! let state = fit_polynomial::<CpuBackend, _>(
//!     &settings,
//!     &PolynomialFeatures::new(1),
//!     &xs,
//!     &ys,
//!     &FitControl::unbounded(),
//!     &mut history,
//! )
//! .unwrap();
//!
//! assert_eq!(history.len(), 101);
//! assert_eq!(state.weights.len(), 2);
//! ```
//!
//! ## Module Structure
//!
//! - `backend` — Tensor abstractions and computation primitives (`Tensor1D`, `Tensor2D`)
//! - `model` — linear model with stateful type parameters
//! - `loss`, `regularizers`, `optimizer` — the pieces of the training objective and update
//! - `trainer` — full-batch training loop with checkpoints, cancellation and timeouts
//! - `points` — data points, synthesis, storage and train/test splitting
//! - `metrics` — interpolated test error and R²
//! - `service` / `server` — the playground session and its HTTP surface

pub mod backend;

/// Dataset abstraction consumed by the trainer.
pub mod dataset;

/// Polynomial feature expansion.
pub mod preprocessing;

/// Differentiable loss functions for model training.
pub mod loss;

/// Linear models with compile-time state safety.
pub mod model;

/// Optimization algorithms for parameter updates.
pub mod optimizer;

/// Weight regularization strategies.
pub mod regularizers;

/// High-level training loop orchestration.
pub mod trainer;

pub mod config;
pub mod equation;
pub mod error;
pub mod metrics;
pub mod points;
pub mod reference;
pub mod server;
pub mod service;

/// Re-export of core backend types for convenient usage.
pub use backend::{Backend, CpuBackend, ScalarOps, Tensor1D, Tensor2D};
pub use error::{PlaygroundError, Result};
pub use service::Playground;
