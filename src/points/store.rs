use super::{BaseFunction, DataSynthesizer, Point};
use crate::error::{PlaygroundError, Result};
use rand::Rng;

/// Source of point identifiers.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> u64;

    /// Restarts the sequence from its first id.
    fn reset(&mut self);
}

/// Monotonic ids starting at 1.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    next: u64,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SequentialIds {
    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    fn reset(&mut self) {
        self.next = 1;
    }
}

/// The playground's mutable collection of points, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PointStore<G = SequentialIds> {
    points: Vec<Point>,
    ids: G,
}

impl<G: IdGenerator> PointStore<G> {
    pub fn with_ids(ids: G) -> Self {
        Self {
            points: Vec::new(),
            ids,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn add(&mut self, x: f64, y: f64) -> Point {
        let point = Point {
            id: self.ids.next_id(),
            x,
            y,
        };
        self.points.push(point);
        point
    }

    pub fn remove_by_id(&mut self, id: u64) -> Result<Point> {
        let idx = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or(PlaygroundError::NotFound { id })?;
        Ok(self.points.remove(idx))
    }

    /// Removes the most recently added point; `None` on an empty store.
    pub fn remove_last(&mut self) -> Option<Point> {
        self.points.pop()
    }

    /// Redraws every y from its x with fresh noise. Ids and x values are kept.
    ///
    /// Points where `base` is undefined (hand-placed at `x < 0`) keep their y.
    pub fn apply_noise<R: Rng + ?Sized>(&mut self, noise_level: f64, base: &BaseFunction, rng: &mut R) {
        let synth = DataSynthesizer::new(*base, noise_level);
        for p in self.points.iter_mut().filter(|p| base.is_defined_at(p.x)) {
            p.y = synth.noisy_y(p.x, rng);
        }
    }

    /// Discards all points, restarts ids and generates a fresh set.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        num_points: usize,
        base: &BaseFunction,
        noise_level: f64,
        rng: &mut R,
    ) {
        self.ids.reset();
        self.points = DataSynthesizer::new(*base, noise_level).generate(num_points, &mut self.ids, rng);
    }

    /// Content key over every point's `(id, x, y)` in store order.
    ///
    /// Used only to detect changes for the split cache.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.points)
    }
}

pub(crate) fn fingerprint(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 24);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        out.push_str(&format!("{}:{},{}", p.id, p.x, p.y));
    }
    out
}
