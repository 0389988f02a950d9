//! Per-equation linear restrictions on the structural matrix `B`.
//!
//! Equation `n` owns a basis matrix `V_n` of shape N×r_n whose columns span
//! the admissible subspace of row `n` of `B`:
//!
//! ```text
//! b_nᵀ = V_n φ_n,    φ_n ∈ ℝ^{r_n}
//! ```
//!
//! Exclusion (zero) restrictions are the common case: `V_n` then selects the
//! free columns, and the excluded entries of every draw are exactly zero.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::RANK_TOLERANCE;
use crate::error::{BsvarError, Result};
use crate::types::{Matrix, Vector};

/// Indexed table of restriction bases, one per equation of `B`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RestrictionSet {
    bases: Vec<Matrix>,
}

impl RestrictionSet {
    /// Build from one N×r_n basis per equation.
    ///
    /// Fails when the number of bases differs from N (the row count of each
    /// basis), when a basis has no columns, or when its rank is below its
    /// column count.
    pub fn new(bases: Vec<Matrix>) -> Result<Self> {
        let n = bases.len();
        if n == 0 {
            return Err(BsvarError::invalid_argument(
                "restriction set needs at least one equation",
            ));
        }
        for (eq, v) in bases.iter().enumerate() {
            if v.nrows() != n {
                return Err(BsvarError::InvalidRestriction {
                    equation: eq,
                    message: format!("basis must have {} rows, got {}", n, v.nrows()),
                });
            }
            let r = v.ncols();
            if r == 0 || r > n {
                return Err(BsvarError::InvalidRestriction {
                    equation: eq,
                    message: format!("free-parameter count must be in 1..={}, got {}", n, r),
                });
            }
            if v.iter().any(|x| !x.is_finite()) {
                return Err(BsvarError::InvalidRestriction {
                    equation: eq,
                    message: "basis has non-finite entries".into(),
                });
            }
            let rank = v.clone().svd(false, false).rank(RANK_TOLERANCE);
            if rank != r {
                return Err(BsvarError::InvalidRestriction {
                    equation: eq,
                    message: format!("basis rank {} disagrees with {} free parameters", rank, r),
                });
            }
        }
        Ok(Self { bases })
    }

    /// Every entry of `B` free.
    pub fn unrestricted(n: usize) -> Self {
        Self {
            bases: (0..n).map(|_| Matrix::identity(n, n)).collect(),
        }
    }

    /// Recursive identification: row `n` may load on variables `0..=n` only.
    pub fn lower_triangular(n: usize) -> Self {
        Self::from_patterns(n, |eq, col| col <= eq)
    }

    /// Only the diagonal of `B` is free.
    pub fn diagonal(n: usize) -> Self {
        Self::from_patterns(n, |eq, col| col == eq)
    }

    /// Build exclusion restrictions from a predicate `free(equation, column)`.
    ///
    /// Every equation must keep at least one free column.
    pub fn from_free_pattern(n: usize, free: impl Fn(usize, usize) -> bool) -> Result<Self> {
        let bases = (0..n)
            .map(|eq| selection_basis(n, (0..n).filter(|&col| free(eq, col))))
            .collect();
        Self::new(bases)
    }

    fn from_patterns(n: usize, free: impl Fn(usize, usize) -> bool) -> Self {
        Self {
            bases: (0..n)
                .map(|eq| selection_basis(n, (0..n).filter(|&col| free(eq, col))))
                .collect(),
        }
    }

    /// Number of equations N.
    pub fn n_equations(&self) -> usize {
        self.bases.len()
    }

    /// Basis V_n of equation `n`.
    pub fn basis(&self, n: usize) -> &Matrix {
        &self.bases[n]
    }

    /// Free-parameter count r_n of equation `n`.
    pub fn free_count(&self, n: usize) -> usize {
        self.bases[n].ncols()
    }

    /// Total free-parameter count r = Σ r_n.
    pub fn total_free(&self) -> usize {
        self.bases.iter().map(|v| v.ncols()).sum()
    }

    /// Map free parameters φ_n to the full row `b_nᵀ = V_n φ_n`.
    pub fn expand(&self, n: usize, phi: &Vector) -> Vector {
        &self.bases[n] * phi
    }

    /// Least-squares free parameters of a full row: (V'V)⁻¹ V' b.
    pub fn project(&self, n: usize, row: &Vector) -> Vector {
        let v = &self.bases[n];
        let vtv = v.transpose() * v;
        let vtb = v.transpose() * row;
        vtv.lu().solve(&vtb).unwrap_or_else(|| Vector::zeros(v.ncols()))
    }

    /// Distance of a full row from the admissible subspace of equation `n`.
    pub fn conformance_residual(&self, n: usize, row: &Vector) -> f64 {
        (row - self.expand(n, &self.project(n, row))).norm()
    }
}

/// N×r selection matrix with a one in row `col` of each column.
fn selection_basis(n: usize, cols: impl Iterator<Item = usize>) -> Matrix {
    let cols: Vec<usize> = cols.collect();
    let mut v = Matrix::zeros(n, cols.len());
    for (j, &col) in cols.iter().enumerate() {
        v[(col, j)] = 1.0;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_triangular_counts() {
        let r = RestrictionSet::lower_triangular(3);
        assert_eq!(r.n_equations(), 3);
        assert_eq!(r.free_count(0), 1);
        assert_eq!(r.free_count(2), 3);
        assert_eq!(r.total_free(), 6);
    }

    #[test]
    fn test_expand_zeros_restricted_entries() {
        let r = RestrictionSet::lower_triangular(3);
        let row = r.expand(1, &Vector::from_row_slice(&[-0.5, 2.0]));
        assert_eq!(row.as_slice(), &[-0.5, 2.0, 0.0]);
    }

    #[test]
    fn test_project_recovers_free_parameters() {
        let v = Matrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 0.0, 2.0]);
        let r = RestrictionSet::new(vec![v.clone(), Matrix::identity(3, 3), v]).unwrap();
        let phi = Vector::from_row_slice(&[0.7, -1.2]);
        let row = r.expand(0, &phi);
        assert!((r.project(0, &row) - phi).norm() < 1e-12);
        assert!(r.conformance_residual(0, &row) < 1e-12);
    }

    #[test]
    fn test_rank_deficient_basis_rejected() {
        let v = Matrix::from_row_slice(2, 2, &[1.0, 2.0, 1.0, 2.0]);
        let err = RestrictionSet::new(vec![v, Matrix::identity(2, 2)]).unwrap_err();
        assert!(matches!(err, BsvarError::InvalidRestriction { equation: 0, .. }));
    }

    #[test]
    fn test_wrong_row_count_rejected() {
        let err = RestrictionSet::new(vec![Matrix::identity(3, 3), Matrix::identity(3, 3)])
            .unwrap_err();
        assert!(matches!(err, BsvarError::InvalidRestriction { .. }));
    }

    #[test]
    fn test_empty_equation_rejected() {
        let err = RestrictionSet::from_free_pattern(2, |eq, _| eq == 0).unwrap_err();
        assert!(matches!(err, BsvarError::InvalidRestriction { equation: 1, .. }));
    }
}
