use super::{BaseFunction, IdGenerator, Point};
use rand::Rng;

/// Generates noisy samples of a [`BaseFunction`].
///
/// Noise is uniform in `[-5·noise_level, 5·noise_level]`.
#[derive(Clone, Copy, Debug)]
pub struct DataSynthesizer {
    base: BaseFunction,
    noise_level: f64,
}

impl DataSynthesizer {
    pub fn new(base: BaseFunction, noise_level: f64) -> Self {
        Self { base, noise_level }
    }

    /// Noiseless value plus a fresh noise draw.
    pub fn noisy_y<R: Rng + ?Sized>(&self, x: f64, rng: &mut R) -> f64 {
        self.base.eval(x) + (rng.random::<f64>() - 0.5) * self.noise_level * 10.0
    }

    pub fn sample_x<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.base.x_min..=self.base.x_max)
    }

    pub fn generate<R, G>(&self, num_points: usize, ids: &mut G, rng: &mut R) -> Vec<Point>
    where
        R: Rng + ?Sized,
        G: IdGenerator + ?Sized,
    {
        (0..num_points)
            .map(|_| {
                let x = self.sample_x(rng);
                let y = self.noisy_y(x, rng);
                Point {
                    id: ids.next_id(),
                    x,
                    y,
                }
            })
            .collect()
    }
}
