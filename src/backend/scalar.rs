use crate::backend::Backend;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Element type of a backend.
///
/// Both shipped backends store `f64`, so the trait only has to carry the
/// arithmetic the training loop uses plus the round trip to host values.
pub trait ScalarOps:
    Copy
    + Send
    + Sync
    + std::fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl ScalarOps for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// A single value tagged with the backend it came from.
///
/// Biases, learning rates and reductions (`sum`, `mean`, `dot`) are all
/// `Scalar<B>`, so a value from one backend cannot leak into another.
///
/// ```
/// use regression_playground::backend::{CpuBackend, Scalar};
///
/// let lr: Scalar<CpuBackend> = Scalar::new(0.01);
/// assert_eq!((-lr * Scalar::new(2.0)).to_f64(), -0.02);
/// ```
#[derive(Clone, Debug, Copy)]
pub struct Scalar<B: Backend> {
    pub(crate) data: B::Scalar,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Scalar<B> {
    pub fn new(f: f64) -> Self {
        Self::wrap(B::scalar_f64(f))
    }

    fn wrap(data: B::Scalar) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.data.to_f64()
    }

    /// `false` for NaN and infinities; the trainer's divergence check.
    pub fn is_finite(&self) -> bool {
        self.to_f64().is_finite()
    }
}

impl<B: Backend> From<Scalar<B>> for f64 {
    fn from(s: Scalar<B>) -> f64 {
        s.to_f64()
    }
}

impl<B: Backend> Neg for Scalar<B> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::wrap(-self.data)
    }
}

macro_rules! scalar_binop {
    ($($trait:ident::$method:ident),+) => {$(
        impl<B: Backend> $trait for Scalar<B> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::wrap(self.data.$method(rhs.data))
            }
        }
    )+};
}

// IEEE 754 semantics throughout: division by zero yields an infinity, not a panic.
scalar_binop!(Add::add, Sub::sub, Mul::mul, Div::div);
