//! Equation-by-equation sampler for the slope matrix `A` (Chan, Koop & Yu).
//!
//! Premultiplying the reduced form by `B` gives `B Y = B A X + U`. Holding all
//! rows of `A` but row `j` fixed, row `j` enters every structural equation
//! through column `j` of `B`, so with Ω = BᵀB and A₀ = A with row `j` zeroed:
//!
//! ```text
//! P_j = Ω_jj · X Xᵀ + A_V_inv / γ_A
//! l_j = A_V_inv Ā_jᵀ / γ_A + X (Y − A₀X)ᵀ Ω_{·j}
//! a_jᵀ | · ~ N(P_j⁻¹ l_j, P_j⁻¹)
//! ```
//!
//! Rows are visited in ascending order and each conditions on the rows
//! already updated in this sweep.

use rand::{Rng, RngCore};

use crate::error::{BsvarError, Parameter, Result};
use crate::linalg::{cholesky, inverse_transpose_solve};
use crate::rng::standard_normal_vectors;
use crate::state::SamplerState;

use super::SweepContext;

/// Draw `A | B, hyper, Y, X` in place.
///
/// The K-dimensional innovations for all N rows come from independent
/// per-row streams keyed by a seed taken from `rng`, so they may be
/// generated in parallel without changing the result.
pub fn sample_a<R: Rng + ?Sized>(
    state: &mut SamplerState,
    ctx: &SweepContext<'_>,
    rng: &mut R,
) -> Result<()> {
    let n = state.n_equations();
    let k = state.n_regressors();
    let data = ctx.data();
    let prior = ctx.prior();

    let prior_precision = &prior.a_v_inv / state.hyper.a_shrinkage;
    let omega = state.b.transpose() * &state.b;

    let sweep_seed = rng.next_u64();
    let innovations = standard_normal_vectors(sweep_seed, n, k);

    for (j, z) in innovations.iter().enumerate() {
        let parameter = Parameter::A { row: j };

        let mut a0 = state.a.clone();
        a0.row_mut(j).fill(0.0);
        let e0 = data.residuals(&a0);

        let precision = ctx.xxt() * omega[(j, j)] + &prior_precision;
        let chol = cholesky(&precision, parameter)?;

        let location = &prior_precision * prior.a.row(j).transpose()
            + data.x() * (e0.transpose() * omega.column(j));

        let mean = chol.solve(&location);
        let draw = mean + inverse_transpose_solve(&chol, z, parameter)?;
        if draw.iter().any(|v| !v.is_finite()) {
            return Err(BsvarError::numerical(parameter, "non-finite row draw"));
        }
        state.a.set_row(j, &draw.transpose());
    }
    Ok(())
}
