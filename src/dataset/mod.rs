//! Dataset abstractions.
//!
//! A [`Dataset`] is a source of `(X, y)` pairs where `X` is a feature matrix of
//! shape `(n_samples, n_features)` and `y` a target vector of shape `(n_samples,)`.
//! The trainer reads contiguous row ranges from it with [`Dataset::get_batch`].
//!
//! # Example
//!
//! ```rust
//! use regression_playground::backend::CpuBackend;
//! use regression_playground::dataset::{Dataset, InMemoryDataset};
//!
//! let x = vec![vec![1.0, 0.5], vec![1.0, 2.0]];
//! let y = vec![0.0, 1.0];
//! let dataset = InMemoryDataset::new(x, y).unwrap();
//!
//! let (x_batch, y_batch) = dataset.get_batch::<CpuBackend>(0..2).unwrap();
//! assert_eq!(x_batch.shape(), (2, 2));
//! assert_eq!(y_batch.to_vec(), vec![0.0, 1.0]);
//! ```

use crate::backend::{Backend, Tensor1D, Tensor2D};
use std::{fmt::Debug, ops::Range};

pub mod memory;
pub use self::memory::InMemoryDataset;

pub trait Dataset {
    /// Error type returned when accessing data.
    type Error: Debug;

    /// Total number of samples.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of feature columns.
    fn n_features(&self) -> usize;

    /// Loads rows `range` as backend tensors.
    fn get_batch<B: Backend>(
        &self,
        range: Range<usize>,
    ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error>;
}
