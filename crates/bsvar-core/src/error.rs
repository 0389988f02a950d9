//! Error taxonomy for input validation and numerical failures.

use core::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, BsvarError>;

/// Parameter block a numerical failure originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    /// The shrinkage hyperparameter vector.
    Hyper,
    /// A row of the reduced-form slope matrix `A`.
    A {
        /// Zero-based row index.
        row: usize,
    },
    /// An equation (row) of the structural matrix `B`.
    B {
        /// Zero-based equation index.
        equation: usize,
    },
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hyper => write!(f, "hyper"),
            Self::A { row } => write!(f, "A[row {}]", row),
            Self::B { equation } => write!(f, "B[equation {}]", equation),
        }
    }
}

/// Errors surfaced by validation and by the conditional samplers.
///
/// The first four variants are caller-input errors detected before any
/// sampling. `NumericalFailure` is fatal for a run; the orchestrator attaches
/// the index of the sweep that triggered it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BsvarError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("invalid starting value: {message}")]
    InvalidStartingValue { message: String },

    #[error("invalid restriction for equation {equation}: {message}")]
    InvalidRestriction { equation: usize, message: String },

    #[error("numerical failure in {parameter}{}: {message}", fmt_sweep(.sweep))]
    NumericalFailure {
        sweep: Option<usize>,
        parameter: Parameter,
        message: String,
    },
}

fn fmt_sweep(sweep: &Option<usize>) -> String {
    match sweep {
        Some(s) => format!(" at sweep {}", s),
        None => String::new(),
    }
}

impl BsvarError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn dimension(
        what: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn starting_value(message: impl Into<String>) -> Self {
        Self::InvalidStartingValue {
            message: message.into(),
        }
    }

    pub(crate) fn numerical(parameter: Parameter, message: impl Into<String>) -> Self {
        Self::NumericalFailure {
            sweep: None,
            parameter,
            message: message.into(),
        }
    }

    /// Attach the sweep index to a numerical failure. Other variants pass through.
    pub fn at_sweep(self, s: usize) -> Self {
        match self {
            Self::NumericalFailure {
                parameter, message, ..
            } => Self::NumericalFailure {
                sweep: Some(s),
                parameter,
                message,
            },
            other => other,
        }
    }

    /// True for errors caused by caller input rather than by the sampler.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::NumericalFailure { .. })
    }
}
