//! The mutable Gibbs state `(A, B, hyper)`.
//!
//! A [`SamplerState`] is created once from starting values, mutated in place
//! by each conditional sampler, and returned at the end of a run as the
//! checkpoint (`last_draw`) for continuing the chain.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{CONFORMANCE_TOLERANCE, HYPER_DIM};
use crate::error::{BsvarError, Result};
use crate::linalg::determinant;
use crate::restrictions::RestrictionSet;
use crate::types::{Matrix, Vector};

/// Shrinkage hyperparameters of the 3-level hierarchical prior.
///
/// ```text
/// γ_B | s_B ~ IG2(s_B, ν)      γ_A | s_A ~ IG2(s_A, ν)
/// s_B | s   ~ G(s, a)          s_A | s   ~ G(s, a)
/// s         ~ IG2(S, V)
/// ```
///
/// Stored in the order (γ_B, γ_A, s_B, s_A, s).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hyperparameters {
    /// γ_B: overall shrinkage of the structural matrix `B`.
    pub b_shrinkage: f64,
    /// γ_A: overall shrinkage of the slope matrix `A`.
    pub a_shrinkage: f64,
    /// s_B: scale of the IG2 prior on γ_B.
    pub b_scale: f64,
    /// s_A: scale of the IG2 prior on γ_A.
    pub a_scale: f64,
    /// s: level-3 scale shared by s_B and s_A.
    pub global_scale: f64,
}

impl Hyperparameters {
    /// All five entries set to one.
    pub fn ones() -> Self {
        Self::from_array([1.0; HYPER_DIM])
    }

    /// Build from the ordered array (γ_B, γ_A, s_B, s_A, s).
    pub fn from_array(values: [f64; HYPER_DIM]) -> Self {
        Self {
            b_shrinkage: values[0],
            a_shrinkage: values[1],
            b_scale: values[2],
            a_scale: values[3],
            global_scale: values[4],
        }
    }

    /// Build from a slice, checking its length.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; HYPER_DIM] = values
            .try_into()
            .map_err(|_| BsvarError::dimension("hyper", HYPER_DIM, values.len()))?;
        Ok(Self::from_array(array))
    }

    /// The ordered array (γ_B, γ_A, s_B, s_A, s).
    pub fn to_array(&self) -> [f64; HYPER_DIM] {
        [
            self.b_shrinkage,
            self.a_shrinkage,
            self.b_scale,
            self.a_scale,
            self.global_scale,
        ]
    }

    /// True when every entry is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self::ones()
    }
}

/// Current value of every parameter block of the Gibbs sampler.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplerState {
    /// N×K reduced-form slope matrix.
    pub a: Matrix,
    /// N×N structural contemporaneous matrix.
    pub b: Matrix,
    /// Shrinkage hyperparameters.
    pub hyper: Hyperparameters,
}

impl SamplerState {
    /// Bundle starting values without validation.
    pub fn new(a: Matrix, b: Matrix, hyper: Hyperparameters) -> Self {
        Self { a, b, hyper }
    }

    /// Conventional starting point: random-walk `A`, identity `B`
    /// projected onto the restrictions, unit hyperparameters.
    pub fn default_for(k: usize, restrictions: &RestrictionSet) -> Self {
        let n = restrictions.n_equations();
        let mut a = Matrix::zeros(n, k);
        for i in 0..n.min(k) {
            a[(i, i)] = 1.0;
        }
        let mut b = Matrix::zeros(n, n);
        for eq in 0..n {
            let mut e = Vector::zeros(n);
            e[eq] = 1.0;
            let row = restrictions.expand(eq, &restrictions.project(eq, &e));
            b.set_row(eq, &row.transpose());
        }
        Self {
            a,
            b,
            hyper: Hyperparameters::ones(),
        }
    }

    /// Number of equations N.
    pub fn n_equations(&self) -> usize {
        self.b.nrows()
    }

    /// Number of regressors K.
    pub fn n_regressors(&self) -> usize {
        self.a.ncols()
    }

    /// Check the state can seed a run of an N-equation, K-regressor model.
    ///
    /// Requires `A` to be N×K, `B` to be N×N, invertible and conforming to
    /// the restrictions, and every hyperparameter finite and positive.
    pub fn validate(
        &self,
        n: usize,
        k: usize,
        restrictions: &RestrictionSet,
        determinant_tolerance: f64,
    ) -> Result<()> {
        if self.a.shape() != (n, k) {
            return Err(BsvarError::starting_value(format!(
                "A must be {}x{}, got {}x{}",
                n,
                k,
                self.a.nrows(),
                self.a.ncols()
            )));
        }
        if self.b.shape() != (n, n) {
            return Err(BsvarError::starting_value(format!(
                "B must be {}x{}, got {}x{}",
                n,
                n,
                self.b.nrows(),
                self.b.ncols()
            )));
        }
        if self.a.iter().chain(self.b.iter()).any(|v| !v.is_finite()) {
            return Err(BsvarError::starting_value("A and B must be finite"));
        }
        if !self.hyper.is_valid() {
            return Err(BsvarError::starting_value(format!(
                "hyper entries must be finite and positive, got {:?}",
                self.hyper.to_array()
            )));
        }
        let det = determinant(&self.b);
        if det.abs() < determinant_tolerance {
            return Err(BsvarError::starting_value(format!(
                "B must be invertible, |det B| = {:e}",
                det.abs()
            )));
        }
        for eq in 0..n {
            let row = self.b.row(eq).transpose();
            let residual = restrictions.conformance_residual(eq, &row);
            if residual > CONFORMANCE_TOLERANCE * (1.0 + row.norm()) {
                return Err(BsvarError::starting_value(format!(
                    "row {} of B violates its restrictions (residual {:e})",
                    eq, residual
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyper_array_order() {
        let h = Hyperparameters::from_array([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(h.b_shrinkage, 1.0);
        assert_eq!(h.global_scale, 5.0);
        assert_eq!(h.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(Hyperparameters::from_slice(&[1.0; 4]).is_err());
    }

    #[test]
    fn test_hyper_validity() {
        assert!(Hyperparameters::ones().is_valid());
        assert!(!Hyperparameters::from_array([1.0, 0.0, 1.0, 1.0, 1.0]).is_valid());
        assert!(!Hyperparameters::from_array([1.0, 1.0, f64::NAN, 1.0, 1.0]).is_valid());
    }

    #[test]
    fn test_default_state_validates() {
        let restrictions = RestrictionSet::lower_triangular(3);
        let state = SamplerState::default_for(7, &restrictions);
        assert!(state.validate(3, 7, &restrictions, 1e-10).is_ok());
    }

    #[test]
    fn test_singular_b_rejected() {
        let restrictions = RestrictionSet::unrestricted(2);
        let mut state = SamplerState::default_for(3, &restrictions);
        state.b = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(matches!(
            state.validate(2, 3, &restrictions, 1e-10),
            Err(BsvarError::InvalidStartingValue { .. })
        ));
    }

    #[test]
    fn test_nonconforming_b_rejected() {
        let restrictions = RestrictionSet::lower_triangular(2);
        let mut state = SamplerState::default_for(3, &restrictions);
        state.b[(0, 1)] = 0.5;
        assert!(state.validate(2, 3, &restrictions, 1e-10).is_err());
    }

    #[test]
    fn test_wrong_a_shape_rejected() {
        let restrictions = RestrictionSet::unrestricted(2);
        let state = SamplerState::default_for(3, &restrictions);
        assert!(state.validate(2, 4, &restrictions, 1e-10).is_err());
    }
}
