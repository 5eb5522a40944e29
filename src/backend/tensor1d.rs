use super::scalar::Scalar;
use crate::backend::Backend;
use std::marker::PhantomData;
use std::ops::Range;

/// Backend-typed 1D tensor.
///
/// Wraps a backend's native 1D representation (`B::Tensor1D`) and carries the
/// backend in its type, so tensors from different backends cannot be mixed.
///
/// # Example
/// ```
/// use regression_playground::backend::{CpuBackend, Scalar, Tensor1D};
///
/// let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
/// assert_eq!(x.len(), 3);
///
/// let y = x.scale(&Scalar::<CpuBackend>::new(2.0));
/// assert_eq!(y.to_vec(), vec![2.0, 4.0, 6.0]);
/// ```
#[derive(Clone)]
pub struct Tensor1D<B: Backend> {
    pub(crate) data: B::Tensor1D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Tensor1D<B> {
    fn wrap(data: B::Tensor1D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Creates a new 1D tensor from host values.
    pub fn new(data: Vec<f64>) -> Self {
        Self::wrap(B::from_vec_1d(data))
    }

    /// Creates a 1D tensor filled with zeros of specified length.
    ///
    /// # Example
    /// ```
    /// use regression_playground::backend::{CpuBackend, Tensor1D};
    ///
    /// let zeros: Tensor1D<CpuBackend> = Tensor1D::zeros(4);
    /// assert_eq!(zeros.to_vec(), vec![0.0, 0.0, 0.0, 0.0]);
    /// ```
    pub fn zeros(len: usize) -> Self {
        Self::wrap(B::zeros_1d(len))
    }

    /// Element-wise `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        Self::wrap(B::add_1d(&self.data, &other.data))
    }

    /// Element-wise `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        Self::wrap(B::sub_1d(&self.data, &other.data))
    }

    /// Element-wise `self * other`.
    pub fn mul(&self, other: &Self) -> Self {
        Self::wrap(B::mul_1d(&self.data, &other.data))
    }

    /// Element-wise `self / other`.
    pub fn div(&self, other: &Self) -> Self {
        Self::wrap(B::div_1d(&self.data, &other.data))
    }

    /// Multiplies each element by a scalar.
    pub fn scale(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::mul_scalar_1d(&self.data, &a.data))
    }

    /// Adds a scalar to each element.
    pub fn add_scalar(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::add_scalar_1d(&self.data, &a.data))
    }

    /// Element-wise absolute value.
    pub fn abs(&self) -> Self {
        Self::wrap(B::abs_1d(&self.data))
    }

    /// Element-wise sign: `1.0` for positive, `-1.0` for negative, `0.0` for zero.
    ///
    /// # Example
    /// ```
    /// use regression_playground::backend::{CpuBackend, Tensor1D};
    ///
    /// let t = Tensor1D::<CpuBackend>::new(vec![-2.0, 0.0, 3.0]);
    /// assert_eq!(t.sign().to_vec(), vec![-1.0, 0.0, 1.0]);
    /// ```
    pub fn sign(&self) -> Self {
        Self::wrap(B::sign_1d(&self.data))
    }

    /// Element-wise square root.
    pub fn sqrt(&self) -> Self {
        Self::wrap(B::sqrt_1d(&self.data))
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Scalar<B> {
        Scalar {
            data: B::sum_all_1d(&self.data),
            backend: PhantomData,
        }
    }

    /// Arithmetic mean of all elements; zero for an empty tensor.
    pub fn mean(&self) -> Scalar<B> {
        Scalar {
            data: B::mean_all_1d(&self.data),
            backend: PhantomData,
        }
    }

    /// Inner product `Σᵢ selfᵢ · otherᵢ`.
    ///
    /// # Example
    /// ```
    /// use regression_playground::backend::{CpuBackend, Tensor1D};
    ///
    /// let a = Tensor1D::<CpuBackend>::new(vec![1.0, 2.0, 3.0]);
    /// let b = Tensor1D::<CpuBackend>::new(vec![4.0, 5.0, 6.0]);
    /// assert_eq!(a.dot(&b).to_f64(), 32.0);
    /// ```
    pub fn dot(&self, other: &Self) -> Scalar<B> {
        self.mul(other).sum()
    }

    /// Copies the elements in `range` into a new tensor.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self::wrap(B::slice_1d(&self.data, range))
    }

    /// Copies the tensor out to host memory.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_1d(&self.data)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        B::len_1d(&self.data)
    }

    /// Returns `true` if the tensor contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B: Backend> std::fmt::Debug for Tensor1D<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tensor1D").field(&self.to_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_elementwise_ops() {
        let a = Tensor1D::<CpuBackend>::new(vec![5.0, 7.0, 9.0]);
        let b = Tensor1D::<CpuBackend>::new(vec![2.0, 4.0, 3.0]);

        assert_eq!(a.add(&b).to_vec(), vec![7.0, 11.0, 12.0]);
        assert_eq!(a.sub(&b).to_vec(), vec![3.0, 3.0, 6.0]);
        assert_eq!(a.mul(&b).to_vec(), vec![10.0, 28.0, 27.0]);
        assert_eq!(a.div(&b).to_vec(), vec![2.5, 1.75, 3.0]);
    }

    #[test]
    fn test_scalar_broadcasts() {
        let t = Tensor1D::<CpuBackend>::new(vec![1.0, 2.0, 3.0]);
        let s = Scalar::<CpuBackend>::new(10.0);
        assert_eq!(t.add_scalar(&s).to_vec(), vec![11.0, 12.0, 13.0]);
        assert_eq!(t.scale(&s).to_vec(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_reductions() {
        let t = Tensor1D::<CpuBackend>::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(t.sum().to_f64(), 10.0);
        assert!((t.mean().to_f64() - 2.5).abs() < 1e-12);
        assert_eq!(Tensor1D::<CpuBackend>::zeros(0).mean().to_f64(), 0.0);
    }

    #[test]
    fn test_abs_sqrt_and_slice() {
        let t = Tensor1D::<CpuBackend>::new(vec![-4.0, 9.0, -16.0]);
        let abs = t.abs();
        assert_eq!(abs.to_vec(), vec![4.0, 9.0, 16.0]);
        assert_eq!(abs.sqrt().to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(t.slice(1..3).to_vec(), vec![9.0, -16.0]);
        assert!(t.slice(3..3).is_empty());
    }
}
