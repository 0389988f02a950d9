//! Restricted Gibbs sampler for the structural matrix `B` (Waggoner & Zha 2003).
//!
//! Combining the likelihood of `B E = U` with the generalised-normal prior,
//! the full conditional of row `n`, written `b_nᵀ = V_n φ`, is
//!
//! ```text
//! p(φ | ·) ∝ |det B|^m exp(−½ φᵀ P_n φ)
//! P_n = V_nᵀ (B_V_inv / γ_B + E Eᵀ) V_n,     m = T + B_nu − N
//! ```
//!
//! `det B` is linear in row `n` along the cofactor direction `w`. With
//! P_n = L Lᵀ, the change of variables φ = L⁻ᵀ W α, where the first column of
//! the orthonormal `W` is parallel to L⁻¹ V_nᵀ w, makes `det B ∝ α₁` and
//! `φᵀP_nφ = αᵀα`. Hence α₁ = ±√χ²_{m+1} with a fair sign and the remaining
//! α_j are independent N(0, 1).

use rand::Rng;
use rand_distr::{ChiSquared, Distribution};

use crate::error::{BsvarError, Parameter, Result};
use crate::linalg::{cholesky, cofactor_direction, determinant, orthonormal_completion};
use crate::rng::sample_standard_normal_vector;
use crate::state::SamplerState;
use crate::types::{Matrix, Vector};

use super::SweepContext;

/// Draw `B | A, hyper, Y, X` in place, one equation at a time.
///
/// Equations are updated in restriction-set order and each conditions on the
/// rows already updated in this sweep. After every row the determinant is
/// checked against the context's tolerance; a near-singular `B` is a fatal
/// numerical failure.
pub fn sample_b<R: Rng + ?Sized>(
    state: &mut SamplerState,
    ctx: &SweepContext<'_>,
    rng: &mut R,
) -> Result<()> {
    let data = ctx.data();
    let prior = ctx.prior();
    let n_eq = state.n_equations();

    let residuals = data.residuals(&state.a);
    let scale = &prior.b_v_inv / state.hyper.b_shrinkage + &residuals * residuals.transpose();
    let m = data.n_observations() as f64 + prior.b_nu - n_eq as f64;
    let chi2 = ChiSquared::new(m + 1.0).map_err(|e| {
        BsvarError::numerical(Parameter::B { equation: 0 }, format!("χ² dof {}: {}", m + 1.0, e))
    })?;

    for n in 0..n_eq {
        let parameter = Parameter::B { equation: n };
        let basis = ctx.restrictions().basis(n);
        let r = basis.ncols();

        let precision = basis.transpose() * &scale * basis;
        let chol = cholesky(&precision, parameter)?;
        let l = chol.l();

        let w = cofactor_direction(&state.b, n, parameter)?;
        let w_hat = l
            .solve_lower_triangular(&(basis.transpose() * &w))
            .ok_or_else(|| BsvarError::numerical(parameter, "triangular solve failed"))?;
        let norm = w_hat.norm();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(BsvarError::numerical(
                parameter,
                "restrictions leave det B independent of this equation",
            ));
        }
        let rotation = orthonormal_completion(&(w_hat / norm));

        let mut alpha = Vector::zeros(r);
        let magnitude = chi2.sample(rng).sqrt();
        alpha[0] = if rng.random::<bool>() { magnitude } else { -magnitude };
        if r > 1 {
            let rest = sample_standard_normal_vector(rng, r - 1);
            alpha.rows_mut(1, r - 1).copy_from(&rest);
        }

        let phi = l
            .tr_solve_lower_triangular(&(rotation * alpha))
            .ok_or_else(|| BsvarError::numerical(parameter, "triangular solve failed"))?;
        let row = basis * phi;
        if row.iter().any(|v| !v.is_finite()) {
            return Err(BsvarError::numerical(parameter, "non-finite row draw"));
        }
        state.b.set_row(n, &row.transpose());

        check_invertible(&state.b, ctx.determinant_tolerance(), parameter)?;
    }
    Ok(())
}

fn check_invertible(b: &Matrix, tolerance: f64, parameter: Parameter) -> Result<()> {
    let det = determinant(b);
    if det.is_finite() && det.abs() >= tolerance {
        Ok(())
    } else {
        Err(BsvarError::numerical(
            parameter,
            format!("near-singular B, |det B| = {:e}", det.abs()),
        ))
    }
}
