//! Type aliases shared across the crate.

use nalgebra::{DMatrix, DVector};

/// Dense column-major matrix of `f64`.
pub type Matrix = DMatrix<f64>;

/// Dense column vector of `f64`.
pub type Vector = DVector<f64>;
