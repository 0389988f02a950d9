//! Numerical constants used by the samplers and the SDDR evaluator.

/// Number of shrinkage hyperparameters: (γ_B, γ_A, s_B, s_A, s).
pub const HYPER_DIM: usize = 5;

/// Default lower bound on |det B| below which a draw is treated as singular.
pub const DEFAULT_DETERMINANT_TOLERANCE: f64 = 1e-10;

/// Tolerance for rank decisions on restriction bases.
pub const RANK_TOLERANCE: f64 = 1e-10;

/// Tolerance for checking that a row of `B` lies in its restricted subspace.
pub const CONFORMANCE_TOLERANCE: f64 = 1e-8;

/// Default number of contiguous sub-samples for SDDR standard errors.
pub const DEFAULT_SDDR_SUBSAMPLES: usize = 30;

/// Posterior size below which the SDDR estimate is flagged unreliable.
pub const DEFAULT_SDDR_MIN_RELIABLE_DRAWS: usize = 300;

/// Maximum lag considered by the effective sample size estimator.
pub const ESS_MAX_LAG: usize = 50;

/// Autocorrelation below which the ESS sum is truncated.
pub const ESS_RHO_CUTOFF: f64 = 0.05;

/// ln(2π).
pub const LOG_2PI: f64 = 1.8378770664093453;
