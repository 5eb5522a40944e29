//! JSON bodies of the playground endpoints.
//!
//! Field names follow the browser client: request fields are mostly
//! camelCase, while `loss_function` and the response fields are snake_case.

use crate::loss::LossKind;
use crate::metrics::Metrics;
use crate::optimizer::OptimizerKind;
use crate::points::{BaseFunction, CurvePoint, Point};
use crate::regularizers::RegularizationKind;
use crate::trainer::TrainingCheckpoint;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct AddPointRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetRequest {
    pub noise_level: Option<f64>,
    pub coefficients: Option<BaseFunction>,
    pub num_points: Option<i64>,
    /// Accepted for compatibility; the generated data does not depend on it.
    pub degree: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoiseRequest {
    pub noise_level: f64,
    #[serde(default)]
    pub coefficients: Option<BaseFunction>,
}

/// Hyperparameters of `POST /train_model`; every field has a default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainRequest {
    pub degree: i64,
    pub train_ratio: f64,
    #[serde(rename = "loss_function")]
    pub loss_function: LossKind,
    pub regularization_type: RegularizationKind,
    pub iterations: i64,
    pub learning_rate: f64,
    pub optimizer: OptimizerKind,
    /// Base function for `true_curve`; the current one when absent.
    pub coefficients: Option<BaseFunction>,
    /// Pre-fitted comparison curve, evaluated like the model's predictions.
    #[serde(rename = "reference_curve")]
    pub reference_curve: Option<Vec<CurvePoint>>,
    /// Fit a least-squares polynomial of the same degree as the reference.
    #[serde(rename = "closed_form_reference")]
    pub closed_form_reference: bool,
}

impl Default for TrainRequest {
    fn default() -> Self {
        Self {
            degree: 1,
            train_ratio: 70.0,
            loss_function: LossKind::Mse,
            regularization_type: RegularizationKind::None,
            iterations: 1000,
            learning_rate: 0.01,
            optimizer: OptimizerKind::Adam,
            coefficients: None,
            reference_curve: None,
            closed_form_reference: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddPointResponse {
    pub message: String,
    pub point: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointsResponse {
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateNoiseResponse {
    pub message: String,
    pub points: Vec<Point>,
}

/// A comparison curve scored against the same test set as the model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceReport {
    pub predictions: Vec<CurvePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equation: Option<String>,
    pub r2: f64,
    pub test_error: f64,
}

impl ReferenceReport {
    pub fn new(predictions: Vec<CurvePoint>, equation: Option<String>, metrics: Metrics) -> Self {
        Self {
            predictions,
            equation,
            r2: metrics.r2,
            test_error: metrics.test_error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainResponse {
    pub train_data: Vec<Point>,
    pub test_data: Vec<Point>,
    pub predictions: Vec<CurvePoint>,
    pub equation: String,
    pub r2: f64,
    pub loss_function: LossKind,
    pub test_error: f64,
    pub all_data: Vec<Point>,
    pub training_history: Vec<TrainingCheckpoint>,
    pub save_interval: usize,
    pub final_model: Option<TrainingCheckpoint>,
    /// Wall-clock seconds spent in the request.
    pub training_time: f64,
    pub true_curve: Vec<CurvePoint>,
    pub reference: Option<ReferenceReport>,
}

/// Body of every failed request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&crate::error::PlaygroundError> for ErrorResponse {
    fn from(err: &crate::error::PlaygroundError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
