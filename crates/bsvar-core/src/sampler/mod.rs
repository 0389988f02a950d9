//! Full-conditional samplers of the Gibbs sweep.
//!
//! One sweep updates the state strictly in the order
//!
//! 1. hyper | A, B          ([`sample_hyperparameters`])
//! 2. A | B, hyper, Y, X    ([`sample_a`], equation-by-equation)
//! 3. B | A, hyper, Y, X    ([`sample_b`], Waggoner–Zha)
//!
//! Each conditional is derived assuming the other blocks hold their current
//! values, so the order is fixed.

pub mod hyper;
pub mod slope;
pub mod structural;

pub use hyper::sample_hyperparameters;
pub use slope::sample_a;
pub use structural::sample_b;

use crate::constants::DEFAULT_DETERMINANT_TOLERANCE;
use crate::data::SvarData;
use crate::error::{BsvarError, Result};
use crate::prior::Prior;
use crate::restrictions::RestrictionSet;
use crate::rng::SamplerRng;
use crate::state::SamplerState;
use crate::types::Matrix;

/// Read-only inputs of a run plus quantities precomputed once from them.
pub struct SweepContext<'a> {
    data: &'a SvarData,
    prior: &'a Prior,
    restrictions: &'a RestrictionSet,
    /// X Xᵀ, constant throughout the run.
    xxt: Matrix,
    determinant_tolerance: f64,
}

impl<'a> SweepContext<'a> {
    /// Validate the prior and restrictions against the data and bundle them.
    pub fn new(
        data: &'a SvarData,
        prior: &'a Prior,
        restrictions: &'a RestrictionSet,
    ) -> Result<Self> {
        let n = data.n_variables();
        let k = data.n_regressors();
        prior.validate(n, k)?;
        if restrictions.n_equations() != n {
            return Err(BsvarError::dimension(
                "restriction set (equations)",
                n,
                restrictions.n_equations(),
            ));
        }
        let x = data.x();
        Ok(Self {
            data,
            prior,
            restrictions,
            xxt: x * x.transpose(),
            determinant_tolerance: DEFAULT_DETERMINANT_TOLERANCE,
        })
    }

    /// Override the |det B| threshold below which a draw is singular.
    pub fn with_determinant_tolerance(mut self, tolerance: f64) -> Self {
        self.determinant_tolerance = tolerance;
        self
    }

    /// Observed data.
    pub fn data(&self) -> &SvarData {
        self.data
    }

    /// Prior bundle.
    pub fn prior(&self) -> &Prior {
        self.prior
    }

    /// Restriction set on `B`.
    pub fn restrictions(&self) -> &RestrictionSet {
        self.restrictions
    }

    /// Precomputed X Xᵀ.
    pub fn xxt(&self) -> &Matrix {
        &self.xxt
    }

    /// Singularity threshold on |det B|.
    pub fn determinant_tolerance(&self) -> f64 {
        self.determinant_tolerance
    }

    /// Check that `state` can seed a run under this context.
    pub fn validate_state(&self, state: &SamplerState) -> Result<()> {
        state.validate(
            self.data.n_variables(),
            self.data.n_regressors(),
            self.restrictions,
            self.determinant_tolerance,
        )
    }

    /// One Gibbs sweep: hyper, then A, then B.
    pub fn sweep(&self, state: &mut SamplerState, rng: &mut SamplerRng) -> Result<()> {
        sample_hyperparameters(state, self, rng)?;
        sample_a(state, self, rng)?;
        sample_b(state, self, rng)
    }
}
