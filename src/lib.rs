//! # bsvar
//!
//! Bayesian estimation of homoskedastic structural vector autoregressions.
//!
//! ```text
//! Y = A X + E,    B E = U,    U ~ N(0, I_N)
//! ```
//!
//! Posterior draws of `(A, B, hyper)` come from a Gibbs sampler that cycles
//! through three full conditionals:
//! - hierarchical shrinkage hyperparameters (inverted-gamma-2 / gamma chain)
//! - rows of `A` (equation-by-equation Normal, Chan–Koop–Yu)
//! - rows of `B` under linear zero restrictions (Waggoner–Zha)
//!
//! A Savage–Dickey density ratio evaluates the hypothesis that `B` is
//! diagonal.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bsvar::{run_sampler, log_sddr_homoskedasticity, Prior, RestrictionSet, SamplerState};
//!
//! let restrictions = RestrictionSet::lower_triangular(n);
//! let prior = Prior::minnesota(n, p, 1);
//! let start = SamplerState::default_for(x.nrows(), &restrictions);
//!
//! let output = run_sampler(5_000, &y, &x, &prior, &restrictions, start, false)?;
//! let sddr = log_sddr_homoskedasticity(&output.posterior, &prior, &y, &x, false)?;
//! println!("log SDDR = {:.3}", sddr.log_sddr);
//! ```
//!
//! For seeds, cancellation and progress reporting use [`GibbsSampler`] with a
//! [`SamplerConfig`] directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod gibbs;
mod progress;

pub mod output;

pub use bsvar_core::normalisation::{normalise_positive_diagonal, normalise_posterior};
pub use bsvar_core::sddr::SddrOptions;
pub use bsvar_core::{
    BsvarError, EquationSddr, Hyperparameters, Matrix, Parameter, Posterior, PosteriorSummary,
    Prior, RestrictionSet, Result, SamplerState, SddrResult, SvarData, Vector,
};
pub use config::SamplerConfig;
pub use gibbs::{CancellationToken, GibbsSampler, RunStatus, SamplerOutput, SamplerStatus};
pub use progress::{NoProgress, ProgressSink};

#[cfg(feature = "progress")]
pub use progress::ProgressBarSink;

/// Run `s` Gibbs sweeps with the default configuration.
///
/// `y` is N×T, `x` is K×T, `restrictions` holds one basis per equation of
/// `B` and `starting_values` seeds the chain (pass a previous run's
/// `last_draw` to continue it). `sample_s` selects a stochastic-volatility
/// variant that this crate does not implement; it is ignored.
///
/// The seed is drawn fresh and returned in the output. Use [`GibbsSampler`]
/// for a fixed seed.
///
/// # Errors
///
/// Input errors (`InvalidArgument`, `DimensionMismatch`,
/// `InvalidStartingValue`) are reported before the first sweep. A
/// `NumericalFailure` aborts the run and carries the failing sweep.
pub fn run_sampler(
    s: usize,
    y: &Matrix,
    x: &Matrix,
    prior: &Prior,
    restrictions: &RestrictionSet,
    starting_values: SamplerState,
    sample_s: bool,
) -> Result<SamplerOutput> {
    if s == 0 {
        return Err(BsvarError::InvalidArgument {
            message: "number of draws must be positive".to_string(),
        });
    }
    if sample_s {
        tracing::warn!("sample_s is not supported by the homoskedastic sampler and is ignored");
    }
    let data = SvarData::new(y.clone(), x.clone())?;
    GibbsSampler::default().run(s, &data, prior, restrictions, starting_values)
}

/// Log Savage–Dickey density ratio for the hypothesis that `B` is diagonal.
///
/// Positive values favour the diagonal model. `sample_s` is ignored. The
/// result is flagged unreliable, and a warning logged, when the posterior
/// holds fewer than 300 draws. [`GibbsSampler::log_sddr`] takes these
/// settings from a [`SamplerConfig`] instead.
pub fn log_sddr_homoskedasticity(
    posterior: &Posterior,
    prior: &Prior,
    y: &Matrix,
    x: &Matrix,
    _sample_s: bool,
) -> Result<SddrResult> {
    let data = SvarData::new(y.clone(), x.clone())?;
    GibbsSampler::default().log_sddr(posterior, prior, &data)
}
