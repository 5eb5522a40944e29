use super::store::fingerprint;
use super::Point;
use crate::error::{PlaygroundError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Disjoint train and test subsets of the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Split {
    pub train: Vec<Point>,
    pub test: Vec<Point>,
}

/// A split together with the inputs it was computed from.
#[derive(Clone, Debug, PartialEq)]
pub struct CachedSplit {
    pub ratio: f64,
    pub fingerprint: String,
    pub split: Split,
}

/// Partitions points into train and test sets, reusing the previous split
/// while neither the ratio nor the data changed.
///
/// [`Splitter::split`] never touches the cache; the caller decides when a
/// split becomes the cached one with [`Splitter::commit`]. This lets a failed
/// training run leave the cache as it was.
#[derive(Clone, Debug, Default)]
pub struct Splitter {
    cached: Option<CachedSplit>,
}

impl Splitter {
    pub fn cached(&self) -> Option<&CachedSplit> {
        self.cached.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn commit(&mut self, split: CachedSplit) {
        self.cached = Some(split);
    }

    /// Returns the cached split when `(ratio, fingerprint)` match, otherwise a
    /// fresh shuffle with `floor(n · ratio / 100)` training points.
    pub fn split<R: Rng + ?Sized>(
        &self,
        points: &[Point],
        train_ratio: f64,
        rng: &mut R,
    ) -> Result<CachedSplit> {
        if !train_ratio.is_finite() || !(0.0..=100.0).contains(&train_ratio) {
            return Err(PlaygroundError::Configuration(format!(
                "trainRatio must be within [0, 100], got {train_ratio}"
            )));
        }

        let fp = fingerprint(points);
        if let Some(cached) = &self.cached {
            if cached.ratio == train_ratio && cached.fingerprint == fp {
                return Ok(cached.clone());
            }
        }

        let mut shuffled = points.to_vec();
        shuffled.shuffle(rng);
        let n_train = train_size(shuffled.len(), train_ratio);
        let test = shuffled.split_off(n_train);

        Ok(CachedSplit {
            ratio: train_ratio,
            fingerprint: fp,
            split: Split {
                train: shuffled,
                test,
            },
        })
    }
}

fn train_size(n: usize, ratio: f64) -> usize {
    ((n as f64 * ratio / 100.0).floor() as usize).min(n)
}
