//! Observed data in the matrix layout used by the samplers.

use crate::error::{BsvarError, Result};
use crate::types::Matrix;

/// Dependent variables and regressors, one column per observation.
///
/// `y` is N×T and `x` is K×T. Both are immutable for the life of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SvarData {
    y: Matrix,
    x: Matrix,
}

impl SvarData {
    /// Wrap `y` (N×T) and `x` (K×T), checking that both have T columns.
    pub fn new(y: Matrix, x: Matrix) -> Result<Self> {
        if y.ncols() != x.ncols() {
            return Err(BsvarError::dimension(
                "observations (columns of X)",
                y.ncols(),
                x.ncols(),
            ));
        }
        if y.nrows() == 0 || x.nrows() == 0 || y.ncols() == 0 {
            return Err(BsvarError::invalid_argument(format!(
                "Y and X must be non-empty, got {}x{} and {}x{}",
                y.nrows(),
                y.ncols(),
                x.nrows(),
                x.ncols()
            )));
        }
        if y.iter().chain(x.iter()).any(|v| !v.is_finite()) {
            return Err(BsvarError::invalid_argument("Y and X must be finite"));
        }
        Ok(Self { y, x })
    }

    /// Build lagged data matrices from a time series.
    ///
    /// `series` has one row per period and one column per variable. The first
    /// `p` rows are used as initial conditions, so T = rows − p. Each column
    /// of X stacks lag 1 through lag p of all variables, then a constant, then
    /// the matching row of `exogenous` if supplied (K = N·p + 1 + d).
    pub fn from_series(series: &Matrix, p: usize, exogenous: Option<&Matrix>) -> Result<Self> {
        let (rows, n) = series.shape();
        if rows <= p {
            return Err(BsvarError::invalid_argument(format!(
                "need more than {} periods for {} lags, got {}",
                p, p, rows
            )));
        }
        let d = match exogenous {
            Some(z) if z.nrows() != rows => {
                return Err(BsvarError::dimension("exogenous rows", rows, z.nrows()));
            }
            Some(z) => z.ncols(),
            None => 0,
        };
        let t_len = rows - p;
        let k = n * p + 1 + d;

        let mut y = Matrix::zeros(n, t_len);
        let mut x = Matrix::zeros(k, t_len);
        for t in 0..t_len {
            let period = t + p;
            for i in 0..n {
                y[(i, t)] = series[(period, i)];
            }
            for lag in 1..=p {
                for i in 0..n {
                    x[((lag - 1) * n + i, t)] = series[(period - lag, i)];
                }
            }
            x[(n * p, t)] = 1.0;
            if let Some(z) = exogenous {
                for j in 0..d {
                    x[(n * p + 1 + j, t)] = z[(period, j)];
                }
            }
        }
        Self::new(y, x)
    }

    /// N×T dependent variables.
    pub fn y(&self) -> &Matrix {
        &self.y
    }

    /// K×T regressors.
    pub fn x(&self) -> &Matrix {
        &self.x
    }

    /// Number of variables N.
    pub fn n_variables(&self) -> usize {
        self.y.nrows()
    }

    /// Number of regressors K.
    pub fn n_regressors(&self) -> usize {
        self.x.nrows()
    }

    /// Number of observations T.
    pub fn n_observations(&self) -> usize {
        self.y.ncols()
    }

    /// Reduced-form residuals E = Y − A X.
    pub fn residuals(&self, a: &Matrix) -> Matrix {
        &self.y - a * &self.x
    }
}
