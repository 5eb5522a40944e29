// trainer/mod.rs
use crate::{
    backend::{Backend, Tensor1D, Tensor2D},
    dataset::{Dataset, InMemoryDataset},
    equation::format_equation,
    error::{PlaygroundError, Result},
    loss::{Loss, LossKind, MAELoss, MSELoss},
    model::{InferenceModel, LinearParams, LinearRegression, ModelState, ParamOps, TrainableModel},
    optimizer::{Adam, Optimizer, OptimizerKind, SGD},
    points::CurvePoint,
    preprocessing::PolynomialFeatures,
    regularizers::{NoRegularizer, RegularizationKind, Regularizer, L1, L2},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod checkpoint;
pub use checkpoint::{
    is_checkpoint_epoch, save_interval, CheckpointSink, NullSink, TrainingCheckpoint,
};

/// Evenly spaced x-values the model is sampled on for checkpoints and the
/// final prediction curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionGrid {
    pub start: f64,
    pub step: f64,
    pub len: usize,
}

impl Default for PredictionGrid {
    /// 100 points `x = i · 0.1`, covering `[0, 9.9]`.
    fn default() -> Self {
        Self {
            start: 0.0,
            step: 0.1,
            len: 100,
        }
    }
}

impl PredictionGrid {
    pub fn xs(&self) -> Vec<f64> {
        (0..self.len)
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

/// Deadline and cancellation checked once per epoch.
#[derive(Clone, Debug, Default)]
pub struct FitControl {
    deadline: Option<(Instant, Duration)>,
    cancel: Option<Arc<AtomicBool>>,
}

impl FitControl {
    /// No deadline and no cancel flag.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.deadline = Instant::now().checked_add(limit).map(|at| (at, limit));
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn check(&self, epoch: usize) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(PlaygroundError::Cancelled { epoch });
            }
        }
        if let Some((at, limit)) = self.deadline {
            if Instant::now() >= at {
                return Err(PlaygroundError::Timeout {
                    epoch,
                    limit_secs: limit.as_secs_f64(),
                });
            }
        }
        Ok(())
    }
}

/// Orchestrates full-batch training of a `TrainableModel`.
///
/// Combines a loss function, optimizer, and regularizer. Once built via
/// `TrainerBuilder` it is immutable; every `fit` starts from a fresh copy of
/// the optimizer, so one trainer can fit several models.
pub struct Trainer<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    pub(crate) max_epochs: usize,
    pub(crate) verbose: bool,
    pub(crate) validation_fraction: f64,
    pub(crate) grid: PredictionGrid,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    pub(crate) regularizer: R,
    _phantom_backend: PhantomData<B>,
    _phantom_model: PhantomData<M>,
}

/// Fluent builder for constructing a `Trainer` with custom hyperparameters.
///
/// Defaults:
/// - `max_epochs`: 1000
/// - `verbose`: false
/// - `validation_fraction`: 0.2
/// - `grid`: [`PredictionGrid::default`]
pub struct TrainerBuilder<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    max_epochs: usize,
    verbose: bool,
    validation_fraction: f64,
    grid: PredictionGrid,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
    _phantom_backend: PhantomData<B>,
    _phantom_model: PhantomData<M>,
}

impl<B, L, O, M, P, R> TrainerBuilder<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    /// Creates a new `TrainerBuilder` with the given components.
    ///
    /// # Arguments
    /// * `loss_fn` — differentiable loss (e.g., `MSELoss`)
    /// * `optimizer` — parameter updater (e.g., `Adam`)
    /// * `regularizer` — penalty term (e.g., `L2` or `NoRegularizer`)
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            max_epochs: 1000,
            verbose: false,
            validation_fraction: 0.2,
            grid: PredictionGrid::default(),
            loss_fn,
            optimizer,
            regularizer,
            _phantom_backend: PhantomData,
            _phantom_model: PhantomData,
        }
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    /// When `true`, logs the objective of every epoch at debug level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Share of trailing rows held out for monitoring, clamped to `[0, 0.5]`.
    pub fn validation_fraction(mut self, fraction: f64) -> Self {
        self.validation_fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 0.5)
        } else {
            0.0
        };
        self
    }

    pub fn grid(mut self, grid: PredictionGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn build(self) -> Trainer<B, L, O, M, P, R> {
        Trainer {
            max_epochs: self.max_epochs,
            verbose: self.verbose,
            validation_fraction: self.validation_fraction,
            grid: self.grid,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            regularizer: self.regularizer,
            _phantom_backend: PhantomData,
            _phantom_model: PhantomData,
        }
    }
}

impl<B, L, O, M, P, R> Trainer<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<
        B,
        Input = Tensor2D<B>,
        Prediction = Tensor1D<B>,
        Params = P,
        Gradients = P,
    >,
    O: Optimizer<B, P> + Clone,
    R: Regularizer<B, M>,
    P: ParamOps<B>,
    ModelState: for<'a> From<&'a P>,
{
    /// Number of trailing rows held out from fitting for `n` samples.
    ///
    /// None below 5 samples; at least one row is always fitted.
    pub fn validation_rows(&self, n: usize) -> usize {
        if n < 5 {
            return 0;
        }
        ((n as f64 * self.validation_fraction).floor() as usize).min(n - 1)
    }

    /// Trains the model for exactly `max_epochs` full-batch epochs.
    ///
    /// Checkpoints are taken every [`save_interval`] epochs and at the final
    /// epoch, after that epoch's update, and handed to `sink`.
    ///
    /// # Errors
    /// - `Configuration` if `max_epochs` is zero or the dataset's feature count
    ///   does not match `features`
    /// - `InsufficientData` if the dataset is empty
    /// - `Numerical` if the objective becomes NaN or infinite
    /// - `Timeout` / `Cancelled` from `control`
    pub fn fit<D, S>(
        &self,
        mut model: M,
        dataset: &D,
        features: &PolynomialFeatures,
        control: &FitControl,
        sink: &mut S,
    ) -> Result<M::Output>
    where
        D: Dataset<Error = PlaygroundError>,
        S: CheckpointSink + ?Sized,
    {
        if self.max_epochs == 0 {
            return Err(PlaygroundError::Configuration(
                "iterations must be positive".to_string(),
            ));
        }
        let n_total = dataset.len();
        if n_total == 0 {
            return Err(PlaygroundError::InsufficientData(
                "dataset is empty".to_string(),
            ));
        }
        if dataset.n_features() != features.n_features_out() {
            return Err(PlaygroundError::Configuration(format!(
                "dataset has {} features, degree {} expects {}",
                dataset.n_features(),
                features.degree(),
                features.n_features_out()
            )));
        }

        let n_val = self.validation_rows(n_total);
        let n_fit = n_total - n_val;
        let (x_fit, y_fit) = dataset.get_batch::<B>(0..n_fit)?;
        let validation = if n_val > 0 {
            Some(dataset.get_batch::<B>(n_fit..n_total)?)
        } else {
            None
        };

        let grid_xs = self.grid.xs();
        let grid_features = features.transform::<B>(&grid_xs);
        let mut optimizer = self.optimizer.clone();

        debug!(
            "fitting degree {} on {} rows ({} held out) for {} epochs",
            features.degree(),
            n_fit,
            n_val,
            self.max_epochs
        );

        for epoch in 0..self.max_epochs {
            control.check(epoch)?;

            let preds = model.forward(&x_fit);
            let data_loss = self.loss_fn.loss(&preds, &y_fit);
            let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
            let objective = (data_loss + reg_penalty).to_f64();
            if !objective.is_finite() {
                return Err(PlaygroundError::Numerical {
                    epoch,
                    loss: objective,
                });
            }

            let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &y_fit);
            let grads = model.backward(&x_fit, &grad_preds);
            let total_grads = grads.add(&reg_grad);
            let new_params = optimizer.step(model.params(), &total_grads);
            model.update_params(&new_params);

            if self.verbose {
                debug!("Epoch {}: loss = {}", epoch, objective);
            }

            if is_checkpoint_epoch(epoch, self.max_epochs) {
                let state = ModelState::from(model.params());
                if !state.bias.is_finite() || state.weights.iter().any(|w| !w.is_finite()) {
                    return Err(PlaygroundError::Numerical {
                        epoch,
                        loss: objective,
                    });
                }
                let val_error = validation
                    .as_ref()
                    .map(|(x_val, y_val)| self.loss_fn.loss(&model.forward(x_val), y_val).to_f64());
                let predictions = grid_xs
                    .iter()
                    .zip(model.forward(&grid_features).to_vec())
                    .map(|(&x, y)| CurvePoint { x, y })
                    .collect();
                sink.record(TrainingCheckpoint {
                    step: epoch,
                    equation: format_equation(&state.weights, state.bias),
                    weights: state.weights,
                    bias: state.bias,
                    predictions,
                    error: objective,
                    val_error,
                });
            }
        }

        Ok(model.into_fitted())
    }
}

impl<B, L, O, M, P, R> Trainer<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    /// Convenience constructor that starts the builder pattern.
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<B, L, O, M, P, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }
}

/// Hyperparameters of one polynomial fit, chosen at request time.
#[derive(Clone, Debug, PartialEq)]
pub struct FitSettings {
    pub loss: LossKind,
    pub regularization: RegularizationKind,
    pub regularization_strength: f64,
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    pub epochs: usize,
    pub validation_fraction: f64,
    pub grid: PredictionGrid,
    pub verbose: bool,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            loss: LossKind::Mse,
            regularization: RegularizationKind::None,
            regularization_strength: 0.1,
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.01,
            epochs: 1000,
            validation_fraction: 0.2,
            grid: PredictionGrid::default(),
            verbose: false,
        }
    }
}

/// Fits `y ≈ poly(x)` on backend `B`, picking the loss, regularizer and
/// optimizer named in `settings`. Returns the final parameters.
pub fn fit_polynomial<B, S>(
    settings: &FitSettings,
    features: &PolynomialFeatures,
    xs: &[f64],
    ys: &[f64],
    control: &FitControl,
    sink: &mut S,
) -> Result<ModelState>
where
    B: Backend,
    S: CheckpointSink + ?Sized,
{
    if xs.is_empty() {
        return Err(PlaygroundError::InsufficientData(
            "training set is empty; raise trainRatio or add points".to_string(),
        ));
    }
    let dataset = features.dataset(xs, ys)?;
    FitJob::<B, S> {
        settings,
        features,
        dataset: &dataset,
        control,
        sink,
        _backend: PhantomData,
    }
    .with_loss()
}

struct FitJob<'a, B: Backend, S: CheckpointSink + ?Sized> {
    settings: &'a FitSettings,
    features: &'a PolynomialFeatures,
    dataset: &'a InMemoryDataset,
    control: &'a FitControl,
    sink: &'a mut S,
    _backend: PhantomData<B>,
}

impl<B: Backend, S: CheckpointSink + ?Sized> FitJob<'_, B, S> {
    fn with_loss(self) -> Result<ModelState> {
        match self.settings.loss {
            LossKind::Mse => self.with_regularizer(MSELoss),
            LossKind::Mae => self.with_regularizer(MAELoss),
        }
    }

    fn with_regularizer<L: Loss<B>>(self, loss: L) -> Result<ModelState> {
        let lambda = self.settings.regularization_strength;
        match self.settings.regularization {
            RegularizationKind::None => self.with_optimizer(loss, NoRegularizer),
            RegularizationKind::L1 => self.with_optimizer(loss, L1::new(lambda)),
            RegularizationKind::L2 => self.with_optimizer(loss, L2::new(lambda)),
        }
    }

    fn with_optimizer<L, R>(self, loss: L, regularizer: R) -> Result<ModelState>
    where
        L: Loss<B>,
        R: Regularizer<B, LinearRegression<B>>,
    {
        let lr = self.settings.learning_rate;
        match self.settings.optimizer {
            OptimizerKind::Adam => self.run(loss, Adam::<B>::new(lr), regularizer),
            OptimizerKind::Sgd => self.run(loss, SGD::<B>::new(lr), regularizer),
        }
    }

    fn run<L, O, R>(self, loss: L, optimizer: O, regularizer: R) -> Result<ModelState>
    where
        L: Loss<B>,
        O: Optimizer<B, LinearParams<B>> + Clone,
        R: Regularizer<B, LinearRegression<B>>,
    {
        let trainer: Trainer<B, L, O, LinearRegression<B>, LinearParams<B>, R> =
            Trainer::builder(loss, optimizer, regularizer)
                .max_epochs(self.settings.epochs)
                .verbose(self.settings.verbose)
                .validation_fraction(self.settings.validation_fraction)
                .grid(self.settings.grid)
                .build();
        let model = LinearRegression::<B>::new(self.features.n_features_out());
        let fitted = trainer.fit(model, self.dataset, self.features, self.control, self.sink)?;
        Ok(fitted.extract_params())
    }
}
