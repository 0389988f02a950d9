//! Prior distributions for the homoskedastic SVAR.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BsvarError, Parameter, Result};
use crate::linalg::{cholesky, symmetrize};
use crate::types::Matrix;

/// Fixed prior bundle, read-only for the duration of a run.
///
/// Rows of `A` are Normal around the rows of `a` with equation-invariant
/// precision `a_v_inv / γ_A`. `B` follows a generalised-normal distribution
/// with precision `b_v_inv / γ_B` and shape `b_nu`. The remaining four
/// scalars parametrise the hierarchical prior on (γ_B, γ_A).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prior {
    /// N×K prior mean of `A`.
    pub a: Matrix,
    /// K×K prior precision of each row of `A`.
    pub a_v_inv: Matrix,
    /// N×N prior precision of each row of `B`.
    pub b_v_inv: Matrix,
    /// Shape of the generalised-normal prior on `B`, at least N.
    pub b_nu: f64,
    /// Shape ν of the IG2 prior on the overall shrinkage parameters.
    pub hyper_nu: f64,
    /// Shape a of the gamma prior on the IG2 scales.
    pub hyper_a: f64,
    /// Shape V of the IG2 prior on the level-3 scale.
    pub hyper_v: f64,
    /// Scale S of the IG2 prior on the level-3 scale.
    pub hyper_s: f64,
}

impl Prior {
    /// Default prior for a VAR(p) with `n` variables and `d` deterministic terms.
    ///
    /// Random-walk prior mean (identity on the first lag), lag-decaying
    /// precision `diag(1², …, p², 1, …)`, `B_V_inv = I`, `B_nu = N`,
    /// `hyper_nu = 3`, `hyper_a = 1`, `hyper_V = 3`, `hyper_S = 1`.
    pub fn minnesota(n: usize, p: usize, d: usize) -> Self {
        let k = n * p + d;
        let mut a = Matrix::zeros(n, k);
        if p > 0 {
            for i in 0..n {
                a[(i, i)] = 1.0;
            }
        }
        let mut a_v_inv = Matrix::identity(k, k);
        for lag in 0..p {
            let weight = ((lag + 1) * (lag + 1)) as f64;
            for i in 0..n {
                a_v_inv[(lag * n + i, lag * n + i)] = weight;
            }
        }
        Self {
            a,
            a_v_inv,
            b_v_inv: Matrix::identity(n, n),
            b_nu: n as f64,
            hyper_nu: 3.0,
            hyper_a: 1.0,
            hyper_v: 3.0,
            hyper_s: 1.0,
        }
    }

    /// Replace the prior mean of `A`.
    pub fn with_a_mean(mut self, a: Matrix) -> Self {
        self.a = a;
        self
    }

    /// Number of equations N implied by the prior.
    pub fn n_equations(&self) -> usize {
        self.b_v_inv.nrows()
    }

    /// Number of regressors K implied by the prior.
    pub fn n_regressors(&self) -> usize {
        self.a_v_inv.nrows()
    }

    /// Check dimensions against (N, K) and the positivity of every scalar.
    pub fn validate(&self, n: usize, k: usize) -> Result<()> {
        if self.a.shape() != (n, k) {
            return Err(BsvarError::dimension(
                "prior A",
                format!("{}x{}", n, k),
                format!("{}x{}", self.a.nrows(), self.a.ncols()),
            ));
        }
        if self.a_v_inv.shape() != (k, k) {
            return Err(BsvarError::dimension(
                "prior A_V_inv",
                format!("{}x{}", k, k),
                format!("{}x{}", self.a_v_inv.nrows(), self.a_v_inv.ncols()),
            ));
        }
        if self.b_v_inv.shape() != (n, n) {
            return Err(BsvarError::dimension(
                "prior B_V_inv",
                format!("{}x{}", n, n),
                format!("{}x{}", self.b_v_inv.nrows(), self.b_v_inv.ncols()),
            ));
        }
        if self.a.iter().any(|v| !v.is_finite()) {
            return Err(BsvarError::invalid_argument("prior A must be finite"));
        }
        check_precision(&self.a_v_inv, "A_V_inv")?;
        check_precision(&self.b_v_inv, "B_V_inv")?;
        if !(self.b_nu.is_finite() && self.b_nu >= n as f64) {
            return Err(BsvarError::invalid_argument(format!(
                "B_nu must be at least N = {}, got {}",
                n, self.b_nu
            )));
        }
        for (name, value) in [
            ("hyper_nu", self.hyper_nu),
            ("hyper_a", self.hyper_a),
            ("hyper_V", self.hyper_v),
            ("hyper_S", self.hyper_s),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BsvarError::invalid_argument(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

fn check_precision(m: &Matrix, name: &str) -> Result<()> {
    if (m - symmetrize(m)).amax() > 1e-10 * (1.0 + m.amax()) {
        return Err(BsvarError::invalid_argument(format!("{} must be symmetric", name)));
    }
    cholesky(m, Parameter::Hyper)
        .map(|_| ())
        .map_err(|_| BsvarError::invalid_argument(format!("{} must be positive definite", name)))
}
