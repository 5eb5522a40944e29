use super::tensor1d::Tensor1D;
use crate::backend::Backend;
use std::marker::PhantomData;
use std::ops::Range;

/// Backend-typed 2D tensor (row-major feature matrix).
#[derive(Clone)]
pub struct Tensor2D<B: Backend> {
    pub(crate) data: B::Tensor2D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Tensor2D<B> {
    /// Builds a tensor from row-major host values.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        Self {
            data: B::from_vec_2d(data, rows, cols),
            backend: PhantomData,
        }
    }

    /// Builds a tensor from equally sized rows.
    ///
    /// An empty slice yields a `(0, cols)` tensor.
    pub fn from_rows(rows: &[Vec<f64>], cols: usize) -> Self {
        let data = rows.iter().flat_map(|r| r.iter()).copied().collect();
        Self::new(data, rows.len(), cols)
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: B::zeros_2d(rows, cols),
            backend: PhantomData,
        }
    }

    /// Matrix-vector product `self · other`.
    pub fn dot(&self, other: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D {
            data: B::matvec(&self.data, &other.data),
            backend: PhantomData,
        }
    }

    /// Transposed product `selfᵀ · other`.
    pub fn tdot(&self, other: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D {
            data: B::matvec_transposed(&self.data, &other.data),
            backend: PhantomData,
        }
    }

    /// Copies rows `range` into a new tensor.
    pub fn slice_rows(&self, range: Range<usize>) -> Self {
        Self {
            data: B::slice_rows_2d(&self.data, range),
            backend: PhantomData,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        B::shape(&self.data)
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_tensor2d_matvec_ops() {
        // A = [[1.0, 2.0],
        //      [3.0, 4.0]]
        let a = Tensor2D::<CpuBackend>::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let x = Tensor1D::<CpuBackend>::new(vec![1.0, 0.0]);

        assert_eq!(a.dot(&x).to_vec(), vec![1.0, 3.0]);
        // Aᵀ = [[1, 3], [2, 4]]
        assert_eq!(a.tdot(&x).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_tensor2d_shape_and_rows() {
        let t = Tensor2D::<CpuBackend>::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]], 2);
        assert_eq!(t.shape(), (3, 2));

        let tail = t.slice_rows(1..3);
        assert_eq!(tail.shape(), (2, 2));
        let ones = Tensor1D::<CpuBackend>::new(vec![1.0, 1.0]);
        assert_eq!(tail.dot(&ones).to_vec(), vec![7.0, 11.0]);

        let empty = Tensor2D::<CpuBackend>::from_rows(&[], 5);
        assert_eq!(empty.shape(), (0, 5));
        assert_eq!(Tensor2D::<CpuBackend>::zeros(0, 5).shape(), (0, 5));
    }
}
