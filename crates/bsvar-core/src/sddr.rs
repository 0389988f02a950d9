//! Savage–Dickey density ratios for zero off-diagonal structural loadings.
//!
//! For equation `n` the null hypothesis is that row `n` of `B` is
//! proportional to e_n, i.e. every free off-diagonal entry is zero. The log
//! Bayes factor in favour of the null is
//!
//! ```text
//! log SDDR_n = log p(θ_n = 0 | Y) − log p(θ_n = 0)
//! ```
//!
//! where θ_n are coordinates of the free parameters orthogonal to the
//! diagonal direction. The ratio does not depend on which orthonormal
//! coordinates are used.
//!
//! Both ordinates are Rao–Blackwellised over the posterior draws. Given the
//! other rows of `B`, row `n` has density ∝ |det B|^m exp(−½ φᵀPφ) (posterior:
//! m = T + B_nu − N with the data-augmented P; prior: m = B_nu − N with
//! P = V_nᵀ B_V_inv V_n / γ_B), whose marginal at θ = 0 is
//!
//! ```text
//! log p(θ=0 | ·) = ½ log|P| − (r−1)/2 · log 2π + m log|κ| − (m+1)/2 · log c
//! c = ĝᵀPĝ,    κ = wᵀV_nĝ / ‖L⁻¹V_nᵀw‖,    P = L Lᵀ
//! ```
//!
//! with ĝ the unit free-parameter direction mapping to e_n and `w` the
//! cofactor direction of row `n`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFORMANCE_TOLERANCE, DEFAULT_SDDR_MIN_RELIABLE_DRAWS, DEFAULT_SDDR_SUBSAMPLES, LOG_2PI,
};
use crate::data::SvarData;
use crate::error::{BsvarError, Parameter, Result};
use crate::linalg::{cholesky, cofactor_direction, log_det_cholesky, log_mean_exp};
use crate::posterior::Posterior;
use crate::prior::Prior;
use crate::types::{Matrix, Vector};

/// Tuning of the SDDR evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SddrOptions {
    /// Number of contiguous sub-samples used for standard errors.
    pub subsamples: usize,
    /// Posterior size below which the estimate is flagged unreliable.
    pub min_reliable_draws: usize,
}

impl Default for SddrOptions {
    fn default() -> Self {
        Self {
            subsamples: DEFAULT_SDDR_SUBSAMPLES,
            min_reliable_draws: DEFAULT_SDDR_MIN_RELIABLE_DRAWS,
        }
    }
}

/// Log SDDR of a single equation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EquationSddr {
    /// Zero-based equation index.
    pub equation: usize,
    /// Number of free off-diagonal coordinates tested.
    pub restrictions_tested: usize,
    /// log p(θ = 0 | Y).
    pub log_posterior_ordinate: f64,
    /// log p(θ = 0).
    pub log_prior_ordinate: f64,
    /// Posterior minus prior log ordinate; positive values favour the null.
    pub log_sddr: f64,
    /// Standard error from sub-sample variation (NaN with too few draws).
    pub standard_error: f64,
}

/// Log SDDR for the hypothesis that `B` is diagonal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SddrResult {
    /// Sum of the per-equation log ratios.
    pub log_sddr: f64,
    /// Standard error of `log_sddr` from sub-sample variation.
    pub standard_error: f64,
    /// Per-equation results; equations with nothing to test are omitted.
    pub equations: Vec<EquationSddr>,
    /// Number of posterior draws used.
    pub draws: usize,
    /// False when the posterior is too short for a stable ordinate estimate.
    pub reliable: bool,
}

/// Evaluate the log SDDR of the diagonal-`B` hypothesis from posterior draws.
pub fn log_sddr_homoskedasticity(
    posterior: &Posterior,
    prior: &Prior,
    data: &SvarData,
    options: &SddrOptions,
) -> Result<SddrResult> {
    if posterior.is_empty() {
        return Err(BsvarError::invalid_argument("posterior has no draws"));
    }
    let n = data.n_variables();
    let k = data.n_regressors();
    if posterior.a[0].shape() != (n, k) {
        return Err(BsvarError::dimension(
            "posterior A",
            format!("{}x{}", n, k),
            format!("{}x{}", posterior.a[0].nrows(), posterior.a[0].ncols()),
        ));
    }
    if posterior.restrictions.n_equations() != n {
        return Err(BsvarError::dimension(
            "restriction set (equations)",
            n,
            posterior.restrictions.n_equations(),
        ));
    }
    prior.validate(n, k)?;

    let draws = posterior.len();
    let t = data.n_observations() as f64;
    let m_prior = prior.b_nu - n as f64;
    let m_post = t + m_prior;

    // per-draw residual cross products, shared by all equations
    let cross: Vec<Matrix> = posterior
        .a
        .iter()
        .map(|a| {
            let e = data.residuals(a);
            &e * e.transpose()
        })
        .collect();

    let mut equations = Vec::new();
    let mut block_totals = vec![0.0; block_count(draws, options.subsamples)];

    for eq in 0..n {
        let restrictions = &posterior.restrictions;
        let basis = restrictions.basis(eq);
        let r = basis.ncols();
        let mut e_n = Vector::zeros(n);
        e_n[eq] = 1.0;
        if restrictions.conformance_residual(eq, &e_n) > CONFORMANCE_TOLERANCE {
            return Err(BsvarError::invalid_argument(format!(
                "equation {} cannot be diagonal under its restrictions",
                eq
            )));
        }
        if r == 1 {
            continue;
        }
        let g = restrictions.project(eq, &e_n);
        let g_hat = &g / g.norm();
        let parameter = Parameter::B { equation: eq };
        let prior_base = basis.transpose() * &prior.b_v_inv * basis;

        let mut log_post = Vec::with_capacity(draws);
        let mut log_prior = Vec::with_capacity(draws);
        for s in 0..draws {
            let b = &posterior.b[s];
            let gamma_b = posterior.hyper[s].b_shrinkage;
            let w = cofactor_direction(b, eq, parameter)?;

            let scale = &prior.b_v_inv / gamma_b + &cross[s];
            let p_post = basis.transpose() * scale * basis;
            log_post.push(log_conditional_ordinate(&p_post, m_post, basis, &w, &g_hat, parameter)?);

            let p_prior = &prior_base / gamma_b;
            log_prior.push(log_conditional_ordinate(&p_prior, m_prior, basis, &w, &g_hat, parameter)?);
        }

        let log_posterior_ordinate = log_mean_exp(&log_post);
        let log_prior_ordinate = log_mean_exp(&log_prior);
        let blocks = block_ratios(&log_post, &log_prior, options.subsamples);
        for (total, v) in block_totals.iter_mut().zip(&blocks) {
            *total += v;
        }
        equations.push(EquationSddr {
            equation: eq,
            restrictions_tested: r - 1,
            log_posterior_ordinate,
            log_prior_ordinate,
            log_sddr: log_posterior_ordinate - log_prior_ordinate,
            standard_error: standard_error(&blocks),
        });
    }

    let log_sddr = equations.iter().map(|e| e.log_sddr).sum();
    let standard_error = if equations.is_empty() {
        0.0
    } else {
        standard_error(&block_totals)
    };
    Ok(SddrResult {
        log_sddr,
        standard_error,
        equations,
        draws,
        reliable: draws >= options.min_reliable_draws,
    })
}

/// Log marginal density at θ = 0 of φ ∝ |wᵀVφ|^m exp(−½ φᵀPφ).
pub(crate) fn log_conditional_ordinate(
    precision: &Matrix,
    m: f64,
    basis: &Matrix,
    w: &Vector,
    g_hat: &Vector,
    parameter: Parameter,
) -> Result<f64> {
    let r = precision.nrows() as f64;
    let chol = cholesky(precision, parameter)?;
    let c = g_hat.dot(&(precision * g_hat));

    let mut value = 0.5 * log_det_cholesky(&chol) - 0.5 * (r - 1.0) * LOG_2PI - 0.5 * (m + 1.0) * c.ln();
    if m != 0.0 {
        let vtw = basis.transpose() * w;
        let w_hat = chol
            .l()
            .solve_lower_triangular(&vtw)
            .ok_or_else(|| BsvarError::numerical(parameter, "triangular solve failed"))?;
        let kappa = vtw.dot(g_hat) / w_hat.norm();
        value += m * kappa.abs().ln();
    }
    if value.is_nan() {
        return Err(BsvarError::numerical(parameter, "undefined SDDR ordinate"));
    }
    Ok(value)
}

fn block_count(draws: usize, subsamples: usize) -> usize {
    if subsamples >= 2 && draws >= subsamples {
        subsamples
    } else {
        0
    }
}

/// Log ratio evaluated on each contiguous sub-sample.
fn block_ratios(log_post: &[f64], log_prior: &[f64], subsamples: usize) -> Vec<f64> {
    let blocks = block_count(log_post.len(), subsamples);
    if blocks == 0 {
        return Vec::new();
    }
    let size = log_post.len() / blocks;
    (0..blocks)
        .map(|i| {
            let lo = i * size;
            let hi = if i + 1 == blocks { log_post.len() } else { lo + size };
            log_mean_exp(&log_post[lo..hi]) - log_mean_exp(&log_prior[lo..hi])
        })
        .collect()
}

fn standard_error(blocks: &[f64]) -> f64 {
    let n = blocks.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = blocks.iter().sum::<f64>() / n as f64;
    let var = blocks.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1) as f64;
    (var / n as f64).sqrt()
}
