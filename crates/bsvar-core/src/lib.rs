//! Core numerical machinery for Bayesian structural vector autoregressions.
//!
//! The homoskedastic SVAR is
//!
//! ```text
//! Y = A X + E        (reduced form, Y: N×T, X: K×T, A: N×K)
//! B E = U            (structural form, B: N×N, U ~ N(0, I_N) i.i.d. over t)
//! ```
//!
//! with a Minnesota-style Normal prior on the rows of `A`, a generalised-normal
//! prior on `B` restricted by per-equation linear subspaces, and a 3-level
//! hierarchical prior on the two overall shrinkage parameters.
//!
//! This crate holds everything that does not need logging or I/O: the
//! conditional samplers, the restriction set, posterior storage, sign
//! normalisation and the Savage–Dickey evaluator. The Gibbs orchestrator with
//! cancellation and progress reporting lives in the `bsvar` crate.
//!
//! # Features
//!
//! - `parallel`: generate the slope-sampler innovations on the rayon pool
//! - `serde`: derive `Serialize`/`Deserialize` on states and posteriors
//!
//! ```ignore
//! use bsvar_core::{
//!     prior::Prior,
//!     restrictions::RestrictionSet,
//!     sampler::{sample_a, sample_b, sample_hyperparameters, SweepContext},
//!     state::SamplerState,
//! };
//! ```

pub mod constants;
pub mod data;
pub mod error;
pub mod linalg;
pub mod normalisation;
pub mod posterior;
pub mod prior;
pub mod restrictions;
pub mod rng;
pub mod sampler;
pub mod sddr;
pub mod state;
pub mod types;

// Re-export commonly used items at crate root
pub use data::SvarData;
pub use error::{BsvarError, Parameter, Result};
pub use posterior::{Posterior, PosteriorStore, PosteriorSummary};
pub use prior::Prior;
pub use restrictions::RestrictionSet;
pub use sddr::{EquationSddr, SddrResult};
pub use state::{Hyperparameters, SamplerState};
pub use types::{Matrix, Vector};
