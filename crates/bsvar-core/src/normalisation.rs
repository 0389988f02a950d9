//! Sign normalisation of structural draws (Waggoner & Zha 2003).
//!
//! The likelihood is invariant to flipping the sign of any row of `B`, so raw
//! draws mix over 2^N sign patterns. Each draw is mapped to the pattern
//! closest to a benchmark `B̂`: the sign matrix D minimising
//! ‖D B_s B̂⁻¹ − I‖_F, which separates by row into
//!
//! ```text
//! d_n = sign((B_s B̂⁻¹)_{nn})
//! ```

use crate::error::{BsvarError, Result};
use crate::posterior::Posterior;
use crate::types::Matrix;

/// Normalise every `B` draw in place against `benchmark`.
///
/// `A` is reduced-form and unaffected. Zero restrictions are preserved exactly.
pub fn normalise_posterior(posterior: &mut Posterior, benchmark: &Matrix) -> Result<()> {
    let benchmark_inv = benchmark_inverse(posterior, benchmark)?;
    for b in posterior.b.iter_mut() {
        normalise_draw(b, &benchmark_inv);
    }
    Ok(())
}

/// Normalise so every diagonal element of `B` is positive (benchmark `I`).
pub fn normalise_positive_diagonal(posterior: &mut Posterior) {
    for b in posterior.b.iter_mut() {
        for n in 0..b.nrows() {
            if b[(n, n)] < 0.0 {
                b.row_mut(n).neg_mut();
            }
        }
    }
}

/// Flip rows of a single draw given B̂⁻¹.
pub fn normalise_draw(b: &mut Matrix, benchmark_inv: &Matrix) {
    for n in 0..b.nrows() {
        let diag = b.row(n).dot(&benchmark_inv.column(n).transpose());
        if diag < 0.0 {
            b.row_mut(n).neg_mut();
        }
    }
}

fn benchmark_inverse(posterior: &Posterior, benchmark: &Matrix) -> Result<Matrix> {
    let n = posterior.restrictions.n_equations();
    if benchmark.shape() != (n, n) {
        return Err(BsvarError::dimension(
            "normalisation benchmark",
            format!("{}x{}", n, n),
            format!("{}x{}", benchmark.nrows(), benchmark.ncols()),
        ));
    }
    benchmark
        .clone()
        .try_inverse()
        .ok_or_else(|| BsvarError::invalid_argument("normalisation benchmark must be invertible"))
}
