//! Gibbs orchestrator: the sweep loop, cancellation and progress reporting.
//!
//! The run is a small state machine:
//!
//! ```text
//! Initialized ──run──▶ Running ──▶ Completed
//!                         │
//!                         └──────▶ Aborted   (cancellation or numerical failure)
//! ```
//!
//! Each sweep updates hyper, then A, then B, and appends the resulting state
//! to the posterior store. The live state is owned by the loop and only ever
//! lent to one conditional sampler at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bsvar_core::posterior::PosteriorStore;
use bsvar_core::rng::master_rng;
use bsvar_core::sampler::SweepContext;
use bsvar_core::sddr::log_sddr_homoskedasticity;
use bsvar_core::{
    BsvarError, Posterior, Prior, RestrictionSet, Result, SamplerState, SddrResult, SvarData,
};

use crate::config::SamplerConfig;
use crate::progress::{NoProgress, ProgressSink};

/// Lifecycle of a [`GibbsSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerStatus {
    /// No run started yet, or the most recent run was rejected on input.
    Initialized,
    /// Sweeps in progress.
    Running,
    /// The last run produced every requested draw.
    Completed,
    /// The last run stopped early on cancellation or a numerical failure.
    Aborted,
}

/// How a run that returned a posterior ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// All requested draws were produced.
    Completed,
    /// Cancellation was observed; the posterior holds the finished sweeps.
    Cancelled {
        /// Number of sweeps completed before the cancellation check.
        completed_sweeps: usize,
    },
}

impl RunStatus {
    /// True when the run stopped early.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunStatus::Cancelled { .. })
    }
}

/// Result of a sampling run.
#[derive(Debug, Clone)]
pub struct SamplerOutput {
    /// Draws in iteration order.
    pub posterior: Posterior,
    /// Final state, usable as starting values of a continuation run.
    pub last_draw: SamplerState,
    /// Whether the run completed or was cancelled.
    pub status: RunStatus,
    /// Seed of the master stream, for replaying the run.
    pub seed: u64,
}

/// Cooperative cancellation flag shared between the caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// New, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The run stops at its next poll.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Runs the Gibbs sampler for the homoskedastic SVAR.
///
/// # Example
///
/// ```ignore
/// use bsvar::{GibbsSampler, SamplerConfig, Prior, RestrictionSet, SamplerState, SvarData};
///
/// let data = SvarData::from_series(&series, 1, None)?;
/// let prior = Prior::minnesota(2, 1, 1);
/// let restrictions = RestrictionSet::lower_triangular(2);
/// let start = SamplerState::default_for(data.n_regressors(), &restrictions);
///
/// let output = GibbsSampler::new(SamplerConfig::new().seed(42))
///     .run(1_000, &data, &prior, &restrictions, start)?;
/// println!("{}", bsvar::output::format_summary(&output));
/// ```
#[derive(Debug, Clone)]
pub struct GibbsSampler {
    config: SamplerConfig,
    cancellation: Option<CancellationToken>,
    status: SamplerStatus,
}

impl Default for GibbsSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

impl GibbsSampler {
    /// Create a sampler with the given configuration.
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            cancellation: None,
            status: SamplerStatus::Initialized,
        }
    }

    /// Attach a cancellation token polled during runs.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Status after the most recent run.
    pub fn status(&self) -> SamplerStatus {
        self.status
    }

    /// Draw `draws` sweeps starting from `starting_values`.
    pub fn run(
        &mut self,
        draws: usize,
        data: &SvarData,
        prior: &Prior,
        restrictions: &RestrictionSet,
        starting_values: SamplerState,
    ) -> Result<SamplerOutput> {
        self.run_with_progress(
            draws,
            data,
            prior,
            restrictions,
            starting_values,
            &mut NoProgress,
        )
    }

    /// Same as [`run`](Self::run), reporting progress to `sink`.
    pub fn run_with_progress(
        &mut self,
        draws: usize,
        data: &SvarData,
        prior: &Prior,
        restrictions: &RestrictionSet,
        starting_values: SamplerState,
        sink: &mut dyn ProgressSink,
    ) -> Result<SamplerOutput> {
        self.status = SamplerStatus::Initialized;
        if draws == 0 {
            return Err(BsvarError::InvalidArgument {
                message: "number of draws must be positive".to_string(),
            });
        }
        let ctx = SweepContext::new(data, prior, restrictions)?
            .with_determinant_tolerance(self.config.determinant_tolerance);
        ctx.validate_state(&starting_values)?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!(
            n = data.n_variables(),
            k = data.n_regressors(),
            t = data.n_observations(),
            free_b = restrictions.total_free(),
            draws,
            seed,
            "Starting Gibbs sampler"
        );

        self.status = SamplerStatus::Running;
        let mut rng = master_rng(seed);
        let mut state = starting_values;
        let mut store = PosteriorStore::with_capacity(draws);
        let poll = self.config.cancel_poll_interval.max(1);
        let stride = self.config.progress_stride(draws);

        for s in 0..draws {
            if s % poll == 0 && self.cancel_requested() {
                tracing::warn!(completed_sweeps = s, draws, "Sampling cancelled");
                self.status = SamplerStatus::Aborted;
                sink.on_progress(s, draws);
                return Ok(SamplerOutput {
                    posterior: store.into_posterior(restrictions.clone()),
                    last_draw: state,
                    status: RunStatus::Cancelled { completed_sweeps: s },
                    seed,
                });
            }

            if let Err(err) = ctx.sweep(&mut state, &mut rng) {
                let err = err.at_sweep(s);
                tracing::error!(sweep = s, error = %err, "Gibbs sweep failed");
                self.status = SamplerStatus::Aborted;
                return Err(err);
            }
            store.append(&state);

            let completed = s + 1;
            if let Some(stride) = stride {
                if completed % stride == 0 && completed < draws {
                    tracing::debug!(completed, draws, "Sampling progress");
                    sink.on_progress(completed, draws);
                }
            }
        }

        sink.on_progress(draws, draws);
        self.status = SamplerStatus::Completed;
        tracing::info!(draws, "Gibbs sampler completed");

        Ok(SamplerOutput {
            posterior: store.into_posterior(restrictions.clone()),
            last_draw: state,
            status: RunStatus::Completed,
            seed,
        })
    }

    /// Log SDDR for a diagonal `B`, using this sampler's sub-sample and
    /// reliability settings.
    pub fn log_sddr(
        &self,
        posterior: &Posterior,
        prior: &Prior,
        data: &SvarData,
    ) -> Result<SddrResult> {
        let options = self.config.sddr_options();
        let result = log_sddr_homoskedasticity(posterior, prior, data, &options)?;
        if !result.reliable {
            tracing::warn!(
                draws = result.draws,
                min_draws = options.min_reliable_draws,
                "Posterior too short for a stable SDDR estimate"
            );
        }
        tracing::debug!(log_sddr = result.log_sddr, se = result.standard_error, "SDDR evaluated");
        Ok(result)
    }

    fn cancel_requested(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
