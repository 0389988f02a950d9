//! Dense linear-algebra helpers shared by the samplers.
//!
//! Thin wrappers over nalgebra that turn factorisation failures into
//! [`BsvarError::NumericalFailure`] and collect the few constructions the
//! Waggoner–Zha step needs (orthonormal completion, cofactor direction).

use nalgebra::Cholesky;
use nalgebra::Dyn;

use crate::error::{BsvarError, Parameter, Result};
use crate::types::{Matrix, Vector};

/// Cholesky factor of a dynamic square matrix.
pub type CholeskyFactor = Cholesky<f64, Dyn>;

/// Symmetric part `(M + Mᵀ)/2`, guarding against round-off asymmetry.
pub fn symmetrize(m: &Matrix) -> Matrix {
    (m + m.transpose()) * 0.5
}

/// Cholesky factorisation of a precision matrix, attributing failure to `parameter`.
///
/// The input is symmetrised first. Non-finite entries or a non positive
/// definite matrix both fail.
pub fn cholesky(m: &Matrix, parameter: Parameter) -> Result<CholeskyFactor> {
    if m.iter().any(|v| !v.is_finite()) {
        return Err(BsvarError::numerical(
            parameter,
            "precision matrix has non-finite entries",
        ));
    }
    Cholesky::new(symmetrize(m)).ok_or_else(|| {
        BsvarError::numerical(parameter, "precision matrix is not positive definite")
    })
}

/// log|M| from the Cholesky factor M = L Lᵀ.
pub fn log_det_cholesky(chol: &CholeskyFactor) -> f64 {
    let l = chol.l_dirty();
    (0..l.nrows()).map(|i| l[(i, i)].ln()).sum::<f64>() * 2.0
}

/// Determinant via LU decomposition.
pub fn determinant(m: &Matrix) -> f64 {
    m.clone().lu().determinant()
}

/// Draw-scale transform `L⁻ᵀ z`: a N(0, (L Lᵀ)⁻¹) variate from z ~ N(0, I).
pub fn inverse_transpose_solve(
    chol: &CholeskyFactor,
    z: &Vector,
    parameter: Parameter,
) -> Result<Vector> {
    chol.l()
        .tr_solve_lower_triangular(z)
        .ok_or_else(|| BsvarError::numerical(parameter, "triangular solve failed"))
}

/// Direction orthogonal to every row of `b` except row `n`.
///
/// Column `n` of B⁻¹ satisfies `b_i · w = 0` for all `i ≠ n`, and `b_n · w = 1`,
/// so `det B = det(B) · (b_n · w)` is linear in row `n` along `w`.
pub fn cofactor_direction(b: &Matrix, n: usize, parameter: Parameter) -> Result<Vector> {
    let dim = b.nrows();
    let mut e_n = Vector::zeros(dim);
    e_n[n] = 1.0;
    b.clone()
        .lu()
        .solve(&e_n)
        .filter(|w| w.iter().all(|v| v.is_finite()))
        .ok_or_else(|| BsvarError::numerical(parameter, "B is singular"))
}

/// Orthonormal basis whose first column is the unit vector `w1`.
///
/// Built from the Householder reflection H = I − 2vvᵀ/(vᵀv) with
/// v = w1 + σe₁, σ = sign(w1₀), which maps e₁ to −σw1. The first column is
/// then rescaled by −σ so it equals `w1` exactly.
pub fn orthonormal_completion(w1: &Vector) -> Matrix {
    let r = w1.len();
    let sigma = if w1[0] >= 0.0 { 1.0 } else { -1.0 };
    let mut v = w1.clone();
    v[0] += sigma;
    let vtv = v.dot(&v);
    let mut h = Matrix::identity(r, r) - (&v * v.transpose()) * (2.0 / vtv);
    h.column_mut(0).scale_mut(-sigma);
    h
}

/// log(mean(exp(x))) computed stably.
pub fn log_mean_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|v| (v - max).exp()).sum();
    max + (sum / values.len() as f64).ln()
}
