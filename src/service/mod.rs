//! The playground session: dataset, split cache and the endpoint operations
//! that drive training and evaluation.
//!
//! Every operation takes `&mut self`; callers that share a `Playground`
//! across tasks serialize access behind one lock.

pub mod api;

pub use api::{
    AddPointRequest, AddPointResponse, ErrorResponse, MessageResponse, PointsResponse,
    ReferenceReport, ResetRequest, TrainRequest, TrainResponse, UpdateNoiseRequest,
    UpdateNoiseResponse,
};

use crate::backend::CpuBackend;
use crate::config::PlaygroundConfig;
use crate::equation::format_equation;
use crate::error::{PlaygroundError, Result};
use crate::metrics::Evaluator;
use crate::points::{BaseFunction, CurvePoint, Point, PointStore, Splitter};
use crate::preprocessing::PolynomialFeatures;
use crate::reference::ClosedFormFit;
use crate::trainer::{fit_polynomial, save_interval, FitControl, FitSettings, TrainingCheckpoint};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

/// Single-user regression playground.
pub struct Playground<R = StdRng> {
    config: PlaygroundConfig,
    store: PointStore,
    splitter: Splitter,
    base: BaseFunction,
    noise_level: f64,
    rng: R,
}

impl Playground<StdRng> {
    /// Builds a playground whose RNG is seeded from `seed`, or from the OS
    /// when `None`.
    pub fn from_seed(config: PlaygroundConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(config, rng)
    }
}

impl<R: Rng> Playground<R> {
    /// Creates the session and generates the initial points from
    /// `config.base_function` and `config.initial_noise`.
    pub fn new(config: PlaygroundConfig, mut rng: R) -> Self {
        let base = config.base_function;
        let noise_level = config.initial_noise;
        let mut store = PointStore::default();
        store.reset(config.initial_points, &base, noise_level, &mut rng);
        Self {
            config,
            store,
            splitter: Splitter::default(),
            base,
            noise_level,
            rng,
        }
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn base_function(&self) -> &BaseFunction {
        &self.base
    }

    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// `GET /points`
    pub fn points(&self) -> PointsResponse {
        PointsResponse {
            points: self.store.points().to_vec(),
        }
    }

    /// `POST /add_point`
    pub fn add_point(&mut self, req: AddPointRequest) -> AddPointResponse {
        let point = self.store.add(req.x, req.y);
        debug!("added point {} at ({}, {})", point.id, point.x, point.y);
        AddPointResponse {
            message: "Point added".to_string(),
            point,
        }
    }

    /// `DELETE /delete_point/:id`
    ///
    /// # Errors
    /// `NotFound` if no point has `id`; the store is left unchanged.
    pub fn delete_point(&mut self, id: u64) -> Result<MessageResponse> {
        let removed = self.store.remove_by_id(id)?;
        debug!("deleted point {}", removed.id);
        Ok(MessageResponse::new("Point deleted"))
    }

    /// `DELETE /delete_last_point`; a no-op on an empty store.
    pub fn delete_last_point(&mut self) -> MessageResponse {
        match self.store.remove_last() {
            Some(p) => {
                debug!("deleted last point {}", p.id);
                MessageResponse::new("Last point deleted")
            }
            None => MessageResponse::new("No points to delete"),
        }
    }

    /// `POST /reset_points`: regenerates the dataset and restarts ids at 1.
    pub fn reset_points(&mut self, req: ResetRequest) -> Result<MessageResponse> {
        let noise_level = req.noise_level.unwrap_or(self.config.initial_noise);
        validate_noise(noise_level)?;
        let base = req.coefficients.unwrap_or(self.config.base_function);
        base.validate()?;
        let num_points = match req.num_points {
            None => self.config.initial_points,
            Some(n) if n < 0 => {
                return Err(PlaygroundError::Configuration(format!(
                    "numPoints must be non-negative, got {n}"
                )))
            }
            Some(n) if n as u64 > self.config.max_points as u64 => {
                return Err(PlaygroundError::Configuration(format!(
                    "numPoints must be at most {}, got {n}",
                    self.config.max_points
                )))
            }
            Some(n) => n as usize,
        };

        self.base = base;
        self.noise_level = noise_level;
        self.store
            .reset(num_points, &self.base, noise_level, &mut self.rng);
        self.splitter.invalidate();
        info!("reset dataset to {num_points} points (noise {noise_level})");
        Ok(MessageResponse::new("Points reset"))
    }

    /// `POST /update_noise`: redraws every y from its x.
    pub fn update_noise(&mut self, req: UpdateNoiseRequest) -> Result<UpdateNoiseResponse> {
        validate_noise(req.noise_level)?;
        if let Some(base) = req.coefficients {
            base.validate()?;
            self.base = base;
        }
        self.noise_level = req.noise_level;
        self.store
            .apply_noise(req.noise_level, &self.base, &mut self.rng);
        debug!(
            "noise set to {} on {} points",
            req.noise_level,
            self.store.len()
        );
        Ok(UpdateNoiseResponse {
            message: "Noise updated".to_string(),
            points: self.store.points().to_vec(),
        })
    }

    /// `POST /train_model` under the configured time limit.
    pub fn train_model(&mut self, req: TrainRequest) -> Result<TrainResponse> {
        self.train_model_with_cancel(req, None)
    }

    /// `POST /train_model`, also stopping when `cancel` is raised.
    ///
    /// A failed run leaves the dataset and the cached split untouched.
    pub fn train_model_with_cancel(
        &mut self,
        req: TrainRequest,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TrainResponse> {
        let started = Instant::now();

        if req.iterations <= 0 {
            return Err(PlaygroundError::Configuration(format!(
                "iterations must be positive, got {}",
                req.iterations
            )));
        }
        let features = PolynomialFeatures::checked(req.degree, self.config.max_degree)?;
        if !req.learning_rate.is_finite() || req.learning_rate <= 0.0 {
            return Err(PlaygroundError::Configuration(format!(
                "learningRate must be a positive number, got {}",
                req.learning_rate
            )));
        }
        let truth = req.coefficients.unwrap_or(self.base);
        truth.validate()?;

        let split = self
            .splitter
            .split(self.store.points(), req.train_ratio, &mut self.rng)?;
        let train = &split.split.train;
        let test = &split.split.test;
        let xs: Vec<f64> = train.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = train.iter().map(|p| p.y).collect();

        let epochs = req.iterations as usize;
        let settings = FitSettings {
            loss: req.loss_function,
            regularization: req.regularization_type,
            regularization_strength: self.config.regularization_strength,
            optimizer: req.optimizer,
            learning_rate: req.learning_rate,
            epochs,
            validation_fraction: self.config.validation_fraction,
            grid: self.config.grid,
            verbose: false,
        };
        let mut control = FitControl::unbounded();
        if let Some(limit) = self.config.train_timeout {
            control = control.with_timeout(limit);
        }
        if let Some(flag) = cancel {
            control = control.with_cancel_flag(flag);
        }

        debug!(
            "training degree {} on {} train / {} test points, {} epochs ({:?}, {}, {})",
            features.degree(),
            train.len(),
            test.len(),
            epochs,
            req.optimizer,
            req.loss_function,
            req.regularization_type
        );

        let mut history: Vec<TrainingCheckpoint> = Vec::new();
        let state = fit_polynomial::<CpuBackend, _>(
            &settings,
            &features,
            &xs,
            &ys,
            &control,
            &mut history,
        )
        .inspect_err(|e| warn!("training failed: {e}"))?;

        let grid_xs = self.config.grid.xs();
        let predictions: Vec<CurvePoint> = grid_xs
            .iter()
            .map(|&x| CurvePoint {
                x,
                y: state.eval_polynomial(x),
            })
            .collect();
        let metrics = Evaluator::new(&predictions).evaluate(test, req.loss_function);
        let reference = self.reference(&req, &features, train, test, &grid_xs);

        let response = TrainResponse {
            train_data: train.clone(),
            test_data: test.clone(),
            equation: format_equation(&state.weights, state.bias),
            predictions,
            r2: metrics.r2,
            loss_function: req.loss_function,
            test_error: metrics.test_error,
            all_data: self.store.points().to_vec(),
            final_model: history.last().cloned(),
            training_history: history,
            save_interval: save_interval(epochs),
            training_time: started.elapsed().as_secs_f64(),
            true_curve: truth.sample(&grid_xs),
            reference,
        };

        self.splitter.commit(split);
        info!(
            "trained degree {} in {:.3}s: {}, r2 = {:.4}, test error = {:.4}",
            features.degree(),
            response.training_time,
            response.equation,
            response.r2,
            response.test_error
        );
        Ok(response)
    }

    /// Scores the caller's curve, or a closed-form fit when requested.
    /// A closed-form fit that cannot be solved is skipped, not fatal.
    fn reference(
        &self,
        req: &TrainRequest,
        features: &PolynomialFeatures,
        train: &[Point],
        test: &[Point],
        grid_xs: &[f64],
    ) -> Option<ReferenceReport> {
        if let Some(curve) = &req.reference_curve {
            let metrics = Evaluator::new(curve).evaluate(test, req.loss_function);
            return Some(ReferenceReport::new(curve.clone(), None, metrics));
        }
        if !req.closed_form_reference {
            return None;
        }
        let xs: Vec<f64> = train.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = train.iter().map(|p| p.y).collect();
        match ClosedFormFit::fit(&xs, &ys, features.degree()) {
            Ok(fit) => {
                let curve = fit.sample(grid_xs);
                let metrics = Evaluator::new(&curve).evaluate(test, req.loss_function);
                Some(ReferenceReport::new(curve, Some(fit.equation()), metrics))
            }
            Err(e) => {
                warn!("closed-form reference skipped: {e}");
                None
            }
        }
    }
}

fn validate_noise(noise_level: f64) -> Result<()> {
    if !noise_level.is_finite() || noise_level < 0.0 {
        return Err(PlaygroundError::Configuration(format!(
            "noiseLevel must be a non-negative number, got {noise_level}"
        )));
    }
    Ok(())
}
