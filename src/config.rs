//! Configuration for Gibbs sampling runs.

use bsvar_core::constants::{
    DEFAULT_DETERMINANT_TOLERANCE, DEFAULT_SDDR_MIN_RELIABLE_DRAWS, DEFAULT_SDDR_SUBSAMPLES,
};
use bsvar_core::sddr::SddrOptions;

/// Configuration options for [`GibbsSampler`](crate::GibbsSampler).
///
/// None of these settings change the target distribution; they control
/// reproducibility, numerical guards and how the run reports back.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    // =========================================================================
    // Reproducibility
    // =========================================================================
    /// Seed of the master random stream.
    ///
    /// Two runs with the same seed and inputs produce bit-identical
    /// posteriors. When `None`, a fresh seed is drawn from the operating
    /// system and logged at `info` level so the run can be replayed.
    ///
    /// Default: None.
    pub seed: Option<u64>,

    // =========================================================================
    // Numerical guards
    // =========================================================================
    /// Smallest admissible |det B| after each structural row update.
    ///
    /// A draw below this threshold aborts the run with a numerical failure.
    /// Default: 1e-10.
    pub determinant_tolerance: f64,

    // =========================================================================
    // Run control
    // =========================================================================
    /// Number of sweeps between cancellation checks.
    ///
    /// Default: 200.
    pub cancel_poll_interval: usize,

    /// Number of evenly spaced progress notifications per run.
    ///
    /// The sink is also notified once when the run ends.
    /// Default: 50.
    pub progress_updates: usize,

    // =========================================================================
    // Savage–Dickey evaluation
    // =========================================================================
    /// Contiguous sub-samples used for SDDR standard errors.
    ///
    /// Default: 30.
    pub sddr_subsamples: usize,

    /// Posterior size below which an SDDR estimate is flagged unreliable.
    ///
    /// Default: 300.
    pub sddr_min_reliable_draws: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            determinant_tolerance: DEFAULT_DETERMINANT_TOLERANCE,
            cancel_poll_interval: 200,
            progress_updates: 50,
            sddr_subsamples: DEFAULT_SDDR_SUBSAMPLES,
            sddr_min_reliable_draws: DEFAULT_SDDR_MIN_RELIABLE_DRAWS,
        }
    }
}

impl SamplerConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for short interactive runs.
    ///
    /// Polls for cancellation every 50 sweeps and reports 20 times.
    pub fn interactive() -> Self {
        Self {
            cancel_poll_interval: 50,
            progress_updates: 20,
            ..Default::default()
        }
    }

    /// Configuration for long unattended runs.
    ///
    /// Polls every 1,000 sweeps, reports 10 times and uses finer sub-samples
    /// for SDDR standard errors.
    pub fn batch() -> Self {
        Self {
            cancel_poll_interval: 1_000,
            progress_updates: 10,
            sddr_subsamples: 50,
            ..Default::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set a deterministic seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the |det B| threshold.
    pub fn determinant_tolerance(mut self, tolerance: f64) -> Self {
        assert!(
            tolerance.is_finite() && tolerance >= 0.0,
            "determinant_tolerance must be finite and non-negative"
        );
        self.determinant_tolerance = tolerance;
        self
    }

    /// Set the number of sweeps between cancellation checks.
    pub fn cancel_poll_interval(mut self, sweeps: usize) -> Self {
        assert!(sweeps > 0, "cancel_poll_interval must be positive");
        self.cancel_poll_interval = sweeps;
        self
    }

    /// Set the number of progress notifications per run. Zero disables them.
    pub fn progress_updates(mut self, updates: usize) -> Self {
        self.progress_updates = updates;
        self
    }

    /// Set the number of SDDR sub-samples.
    pub fn sddr_subsamples(mut self, subsamples: usize) -> Self {
        assert!(subsamples >= 2, "sddr_subsamples must be at least 2");
        self.sddr_subsamples = subsamples;
        self
    }

    /// Set the posterior size below which SDDR estimates are unreliable.
    pub fn sddr_min_reliable_draws(mut self, draws: usize) -> Self {
        assert!(draws > 0, "sddr_min_reliable_draws must be positive");
        self.sddr_min_reliable_draws = draws;
        self
    }

    /// SDDR evaluator options implied by this configuration.
    pub fn sddr_options(&self) -> SddrOptions {
        SddrOptions {
            subsamples: self.sddr_subsamples,
            min_reliable_draws: self.sddr_min_reliable_draws,
        }
    }

    /// Sweep indices (1-based counts) after which progress is reported.
    pub(crate) fn progress_stride(&self, total: usize) -> Option<usize> {
        if self.progress_updates == 0 || total == 0 {
            return None;
        }
        Some(total.div_ceil(self.progress_updates).max(1))
    }
}
