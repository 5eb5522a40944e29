//! Feature engineering for the single-input regression problem.

pub mod polynomial;

pub use polynomial::PolynomialFeatures;
