use super::Backend;
use std::ops::Range;

#[derive(Clone, Debug, Copy)]
pub struct CpuBackend;

/// Row-major matrix: `(data, rows, cols)`.
#[derive(Debug, Clone)]
pub struct CpuTensor2D(pub Vec<f64>, pub usize, pub usize);

impl CpuTensor2D {
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        Self(data, rows, cols)
    }
}

impl From<&[Vec<f64>]> for CpuTensor2D {
    fn from(x: &[Vec<f64>]) -> Self {
        if x.is_empty() {
            return CpuTensor2D::new(Vec::new(), 0, 0);
        }
        let rows = x.len();
        let cols = x[0].len();
        assert!(
            x.iter().all(|row| row.len() == cols),
            "All rows must have same length"
        );
        let data: Vec<f64> = x.iter().flat_map(|row| row.iter()).copied().collect();
        CpuTensor2D::new(data, rows, cols)
    }
}

fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    assert_eq!(a.len(), b.len(), "Length mismatch");
    a.iter().zip(b.iter()).map(|(&x, &y)| f(x, y)).collect()
}

impl Backend for CpuBackend {
    type Scalar = f64;
    type Tensor1D = Vec<f64>;
    type Tensor2D = CpuTensor2D;

    // --- Constructors ---
    fn zeros_1d(len: usize) -> Self::Tensor1D {
        vec![0.; len]
    }

    fn zeros_2d(rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(vec![0.; rows * cols], rows, cols)
    }

    fn from_vec_1d(data: Vec<f64>) -> Self::Tensor1D {
        data
    }

    fn from_vec_2d(data: Vec<f64>, rows: usize, cols: usize) -> Self::Tensor2D {
        CpuTensor2D::new(data, rows, cols)
    }

    // --- Element-wise ops ---
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x + y)
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x - y)
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x * y)
    }

    fn div_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        zip_with(a, b, |x, y| x / y)
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x * s).collect()
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t.iter().map(|x| x + s).collect()
    }

    fn abs_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.abs()).collect()
    }

    fn sign_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter()
            .map(|&x| {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0 // subgradient at zero
                }
            })
            .collect()
    }

    fn sqrt_1d(t: &Self::Tensor1D) -> Self::Tensor1D {
        t.iter().map(|x| x.sqrt()).collect()
    }

    // --- Reductions ---
    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.iter().sum::<f64>()
    }

    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        if t.is_empty() {
            return 0.0;
        }
        t.iter().sum::<f64>() / t.len() as f64
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.clone()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    // --- Linear algebra ---
    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*cols, x.len(), "matvec: A.cols != x.len");
        (0..*rows)
            .map(|i| {
                data[i * cols..(i + 1) * cols]
                    .iter()
                    .zip(x.iter())
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }

    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        let CpuTensor2D(data, rows, cols) = a;
        assert_eq!(*rows, x.len(), "matvec_transposed: A.rows != x.len");
        let mut out = vec![0.0; *cols];
        for (i, xi) in x.iter().enumerate() {
            let row = &data[i * cols..(i + 1) * cols];
            for (o, a) in out.iter_mut().zip(row) {
                *o += a * xi;
            }
        }
        out
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        (t.1, t.2)
    }

    fn slice_rows_2d(t: &Self::Tensor2D, range: Range<usize>) -> Self::Tensor2D {
        let CpuTensor2D(data, _, cols) = t;
        let rows = range.len();
        CpuTensor2D::new(data[range.start * cols..range.end * cols].to_vec(), rows, *cols)
    }

    fn slice_1d(t: &Self::Tensor1D, range: Range<usize>) -> Self::Tensor1D {
        t[range].to_vec()
    }
}
