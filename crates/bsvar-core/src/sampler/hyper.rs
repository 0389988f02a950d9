//! Hierarchical shrinkage hyperparameters.
//!
//! With IG2(s, ν) denoting the density ∝ γ^{-(ν+2)/2} exp(−s/(2γ)), the prior
//!
//! ```text
//! γ_B | s_B ~ IG2(s_B, ν)     γ_A | s_A ~ IG2(s_A, ν)
//! s_B | s   ~ G(s, a)         s_A | s   ~ G(s, a)        (shape a, scale s)
//! s         ~ IG2(S, V)
//! ```
//!
//! gives the full conditionals, drawn bottom-up in this order:
//!
//! ```text
//! s   | ·  ~ IG2(S + 2(s_A + s_B), V + 4a)
//! s_A | ·  ~ G(a + ν/2, rate = 1/s + 1/(2γ_A))
//! s_B | ·  ~ G(a + ν/2, rate = 1/s + 1/(2γ_B))
//! γ_A | ·  ~ IG2(s_A + tr((A−Ā) A_V_inv (A−Ā)ᵀ), ν + N·K)
//! γ_B | ·  ~ IG2(s_B + tr(B B_V_inv Bᵀ),          ν + r + N(B_nu − N))
//! ```
//!
//! where r is the number of free entries of `B`. The N(B_nu − N) term comes
//! from the |det B|^{B_nu−N} factor of the generalised-normal prior, whose
//! normalising constant scales with γ_B.

use rand::Rng;
use rand_distr::{ChiSquared, Distribution, Gamma};

use crate::error::{BsvarError, Parameter, Result};
use crate::state::SamplerState;

use super::SweepContext;

/// Draw `hyper | A, B` in place.
///
/// Every intermediate draw must be finite and strictly positive; a
/// degenerate conditional is reported as a numerical failure rather than
/// clamped.
pub fn sample_hyperparameters<R: Rng + ?Sized>(
    state: &mut SamplerState,
    ctx: &SweepContext<'_>,
    rng: &mut R,
) -> Result<()> {
    let prior = ctx.prior();
    let n = state.n_equations() as f64;
    let k = state.n_regressors() as f64;
    let r = ctx.restrictions().total_free() as f64;

    let a_dev = &state.a - &prior.a;
    let a_quad = (&a_dev * &prior.a_v_inv * a_dev.transpose()).trace();
    let b_quad = (&state.b * &prior.b_v_inv * state.b.transpose()).trace();

    let mut h = state.hyper;

    // level 3
    h.global_scale = sample_ig2(
        prior.hyper_s + 2.0 * (h.a_scale + h.b_scale),
        prior.hyper_v + 4.0 * prior.hyper_a,
        rng,
    )?;

    // level 2
    let shape = prior.hyper_a + 0.5 * prior.hyper_nu;
    h.a_scale = sample_gamma_rate(shape, 1.0 / h.global_scale + 0.5 / h.a_shrinkage, rng)?;
    h.b_scale = sample_gamma_rate(shape, 1.0 / h.global_scale + 0.5 / h.b_shrinkage, rng)?;

    // level 1
    h.a_shrinkage = sample_ig2(h.a_scale + a_quad, prior.hyper_nu + n * k, rng)?;
    h.b_shrinkage = sample_ig2(
        h.b_scale + b_quad,
        prior.hyper_nu + r + n * (prior.b_nu - n),
        rng,
    )?;

    state.hyper = h;
    Ok(())
}

/// Draw from IG2(scale, shape) as scale / χ²_shape.
pub fn sample_ig2<R: Rng + ?Sized>(scale: f64, shape: f64, rng: &mut R) -> Result<f64> {
    check_parameter("IG2 scale", scale)?;
    let chi2 = ChiSquared::new(shape).map_err(|e| {
        BsvarError::numerical(Parameter::Hyper, format!("IG2 shape {}: {}", shape, e))
    })?;
    check_draw(scale / chi2.sample(rng))
}

/// Draw from a gamma distribution in the shape-rate parameterisation.
pub fn sample_gamma_rate<R: Rng + ?Sized>(shape: f64, rate: f64, rng: &mut R) -> Result<f64> {
    check_parameter("gamma rate", rate)?;
    // rand_distr uses shape-scale
    let gamma = Gamma::new(shape, 1.0 / rate).map_err(|e| {
        BsvarError::numerical(Parameter::Hyper, format!("gamma shape {}: {}", shape, e))
    })?;
    check_draw(gamma.sample(rng))
}

fn check_parameter(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BsvarError::numerical(
            Parameter::Hyper,
            format!("{} must be finite and positive, got {}", name, value),
        ))
    }
}

fn check_draw(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BsvarError::numerical(
            Parameter::Hyper,
            format!("degenerate draw {}", value),
        ))
    }
}
