use super::Backend;
use ndarray::{s, Array1, Array2};
use std::ops::Range;

#[derive(Clone, Debug, Copy)]
pub struct NdarrayBackend;

#[derive(Debug, Clone)]
pub struct NdarrayTensor2D(pub Array2<f64>);

impl From<&[Vec<f64>]> for NdarrayTensor2D {
    fn from(x: &[Vec<f64>]) -> Self {
        let rows = x.len();
        if rows == 0 {
            return NdarrayTensor2D(Array2::zeros((0, 0)));
        }
        let cols = x[0].len();
        assert!(x.iter().all(|r| r.len() == cols), "All rows must have same length");
        NdarrayTensor2D(Array2::from_shape_fn((rows, cols), |(i, j)| x[i][j]))
    }
}

impl Backend for NdarrayBackend {
    type Scalar = f64;
    type Tensor1D = Array1<f64>;
    type Tensor2D = NdarrayTensor2D;

    fn zeros_1d(len: usize) -> Self::Tensor1D {
        Array1::zeros(len)
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        NdarrayTensor2D(Array2::zeros((rows, cols)))
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        Array1::from_vec(data)
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        NdarrayTensor2D(Array2::from_shape_fn((rows, cols), |(i, j)| {
            data[i * cols + j]
        }))
    }

    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "Length mismatch");
        a + b
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "Length mismatch");
        a - b
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "Length mismatch");
        a * b
    }

    fn div_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.len(), b.len(), "Length mismatch");
        a / b
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t * *s
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t + *s
    }

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(f64::abs)
    }

    fn sign_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    fn sqrt_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.mapv(f64::sqrt)
    }

    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.sum()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.mean().unwrap_or(0.0)
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.to_vec()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.0.ncols(), x.len(), "matvec: A.cols != x.len");
        a.0.dot(x)
    }

    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        assert_eq!(a.0.nrows(), x.len(), "matvec_transposed: A.rows != x.len");
        a.0.t().dot(x)
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        t.0.dim()
    }

    fn slice_rows_2d(t: &Self::Tensor2D, range: Range<usize>) -> Self::Tensor2D {
        NdarrayTensor2D(t.0.slice(s![range, ..]).to_owned())
    }

    fn slice_1d(t: &Self::Tensor1D, range: Range<usize>) -> Self::Tensor1D {
        t.slice(s![range]).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, Tensor1D, Tensor2D};

    #[test]
    fn test_matvec_matches_cpu_backend() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let v = vec![0.5, -1.0];
        let u = vec![1.0, 0.0, 2.0];

        let a_nd = Tensor2D::<NdarrayBackend>::new(data.clone(), 3, 2);
        let a_cpu = Tensor2D::<CpuBackend>::new(data, 3, 2);

        assert_eq!(
            a_nd.dot(&Tensor1D::new(v.clone())).to_vec(),
            a_cpu.dot(&Tensor1D::new(v)).to_vec()
        );
        assert_eq!(
            a_nd.tdot(&Tensor1D::new(u.clone())).to_vec(),
            a_cpu.tdot(&Tensor1D::new(u)).to_vec()
        );
    }

    #[test]
    fn test_slices_and_reductions() {
        let t = Tensor2D::<NdarrayBackend>::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        assert_eq!(t.slice_rows(2..3).shape(), (1, 2));

        let v = Tensor1D::<NdarrayBackend>::new(vec![-1.0, 0.0, 4.0]);
        assert_eq!(v.sign().to_vec(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(v.slice(1..3).sum().to_f64(), 4.0);
        assert_eq!(Tensor1D::<NdarrayBackend>::zeros(0).mean().to_f64(), 0.0);
    }
}
