use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::dataset::Dataset;
use crate::error::{PlaygroundError, Result};
use std::ops::Range;

/// Feature rows and targets held in host memory.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
    n_features: usize,
}

impl InMemoryDataset {
    pub fn new(x: Vec<Vec<f64>>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(PlaygroundError::Configuration(format!(
                "x and y must have same length ({} != {})",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(PlaygroundError::InsufficientData(
                "dataset is empty".to_string(),
            ));
        }
        let n_features = x[0].len();
        if !x.iter().all(|row| row.len() == n_features) {
            return Err(PlaygroundError::Configuration(
                "all rows must have the same number of features".to_string(),
            ));
        }
        Ok(Self { x, y, n_features })
    }

    pub fn targets(&self) -> &[f64] {
        &self.y
    }
}

impl Dataset for InMemoryDataset {
    type Error = PlaygroundError;

    fn len(&self) -> usize {
        self.x.len()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn get_batch<B: Backend>(&self, range: Range<usize>) -> Result<(Tensor2D<B>, Tensor1D<B>)> {
        if range.start > range.end || range.end > self.x.len() {
            return Err(PlaygroundError::Configuration(format!(
                "batch range {range:?} out of bounds for {} samples",
                self.x.len()
            )));
        }
        let batch_x = &self.x[range.clone()];
        let batch_y = &self.y[range];

        let x_tensor = Tensor2D::<B>::from_rows(batch_x, self.n_features);
        let y_tensor = Tensor1D::<B>::new(batch_y.to_vec());

        Ok((x_tensor, y_tensor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_rejects_mismatched_lengths() {
        let err = InMemoryDataset::new(vec![vec![1.0]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PlaygroundError::Configuration(_)));
    }

    #[test]
    fn test_rejects_empty() {
        let err = InMemoryDataset::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, PlaygroundError::InsufficientData(_)));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        assert!(InMemoryDataset::new(vec![vec![1.0], vec![1.0, 2.0]], vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_get_batch_slices_rows() {
        let ds = InMemoryDataset::new(
            vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![1.0, 2.0]],
            vec![5.0, 6.0, 7.0],
        )
        .unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.n_features(), 2);

        let (x, y) = ds.get_batch::<CpuBackend>(1..3).unwrap();
        assert_eq!(x.shape(), (2, 2));
        assert_eq!(y.to_vec(), vec![6.0, 7.0]);

        let (x, y) = ds.get_batch::<CpuBackend>(3..3).unwrap();
        assert_eq!(x.shape(), (0, 2));
        assert!(y.is_empty());

        assert!(ds.get_batch::<CpuBackend>(2..4).is_err());
    }
}
