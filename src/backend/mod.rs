//! # Backend Abstraction
//!
//! Trait-based abstraction over the numeric engine that fits the playground's
//! models. Models, losses and optimizers are written once against [`Backend`]
//! and run on whichever implementation is selected at compile time.
//!
//! ## Available Backends
//!
//! | Backend          | Feature   | Use Case                          |
//! |------------------|-----------|-----------------------------------|
//! | `CpuBackend`     | (always)  | Default, pure-Rust implementation |
//! | `NdarrayBackend` | `ndarray` | Interop with `ndarray` ecosystem  |
//!
//! ## Example
//!
//! ```rust
//! use regression_playground::backend::{CpuBackend, Tensor1D, Tensor2D};
//!
//! let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0]);
//! let w: Tensor2D<CpuBackend> = Tensor2D::new(vec![0.5, 0.5, 0.5, 0.5], 2, 2);
//!
//! let y = w.dot(&x);
//! assert_eq!(y.to_vec(), vec![1.5, 1.5]);
//! ```

pub mod cpu;
/// Pure-Rust CPU backend, always available.
pub use cpu::{CpuBackend, CpuTensor2D};

#[cfg(feature = "ndarray")]
mod ndarray_backend;
#[cfg(feature = "ndarray")]
/// Backend backed by the `ndarray` crate for ecosystem interoperability.
pub use ndarray_backend::{NdarrayBackend, NdarrayTensor2D};

/// Scalar value representation and arithmetic operations.
pub mod scalar;
/// One-dimensional tensor abstraction.
pub mod tensor1d;
/// Two-dimensional tensor abstraction.
pub mod tensor2d;

pub use scalar::{Scalar, ScalarOps};
pub use tensor1d::Tensor1D;
pub use tensor2d::Tensor2D;

/// Abstraction over tensor storage and the operations training needs.
///
/// The surface is deliberately small: element-wise arithmetic, reductions,
/// matrix-vector products and row slicing are enough to run full-batch
/// gradient descent on a linear model.
///
/// # Shape checks
///
/// Element-wise operations on tensors of different lengths and matrix-vector
/// products with mismatched inner dimensions panic. Callers in this crate
/// build their tensors from validated feature rows.
pub trait Backend: Clone + Copy + Send + Sync + 'static {
    /// Scalar type supporting arithmetic operations.
    type Scalar: ScalarOps + Clone;

    /// One-dimensional tensor type.
    type Tensor1D: Clone + Send + Sync;

    /// Two-dimensional tensor type, row-major.
    type Tensor2D: Clone + Send + Sync;

    // --- Constructors ---

    /// Creates a 1D tensor filled with zeros of given length.
    fn zeros_1d(len: usize) -> Self::Tensor1D;

    /// Creates a 2D tensor filled with zeros of given dimensions.
    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D;

    /// Constructs a 1D tensor from owned data.
    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D;

    /// Constructs a 2D tensor from row-major ordered data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D;

    // --- Element-wise operations (1D) ---

    /// Element-wise addition of two 1D tensors.
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise subtraction of two 1D tensors.
    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise multiplication of two 1D tensors.
    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise division of two 1D tensors.
    fn div_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Multiplies each element of tensor by a scalar.
    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;

    /// Adds a scalar to each element of tensor.
    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;

    /// Element-wise absolute value.
    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise sign function: returns -1.0, 0.0, or 1.0.
    fn sign_1d(t: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise square root.
    fn sqrt_1d(t: &Self::Tensor1D) -> Self::Tensor1D;

    // --- Reductions ---

    /// Sum of all elements in a 1D tensor.
    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    /// Arithmetic mean of all elements in a 1D tensor. Zero for an empty tensor.
    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    // --- Scalar and host access ---

    /// Creates a backend-specific scalar from an f64 value.
    fn scalar_f64(value: f64) -> Self::Scalar;

    /// Copies a 1D tensor out to host memory.
    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64>;

    /// Number of elements in a 1D tensor.
    fn len_1d(t: &Self::Tensor1D) -> usize;

    // --- Linear algebra ---

    /// Computes `A · x` where `A` is (m × n) and `x` is (n,).
    ///
    /// # Panics
    /// If `A.cols() != x.len()`.
    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;

    /// Computes `Aᵀ · x` where `A` is (m × n) and `x` is (m,).
    ///
    /// # Panics
    /// If `A.rows() != x.len()`.
    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;

    /// Returns the shape of a 2D tensor as (rows, cols).
    fn shape(t: &Self::Tensor2D) -> (usize, usize);

    /// Copies rows `range` of a 2D tensor into a new tensor.
    fn slice_rows_2d(t: &Self::Tensor2D, range: std::ops::Range<usize>) -> Self::Tensor2D;

    /// Copies elements `range` of a 1D tensor into a new tensor.
    fn slice_1d(t: &Self::Tensor1D, range: std::ops::Range<usize>) -> Self::Tensor1D;
}
