//! Storage and summaries of the Markov chain.
//!
//! Draws are kept in iteration order: they form the chain trajectory and are
//! autocorrelated, so summaries report effective sample sizes next to means.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{ESS_MAX_LAG, ESS_RHO_CUTOFF, HYPER_DIM};
use crate::error::{BsvarError, Result};
use crate::restrictions::RestrictionSet;
use crate::state::{Hyperparameters, SamplerState};
use crate::types::Matrix;

/// Append-only buffer of draws with capacity fixed at construction.
#[derive(Debug, Clone)]
pub struct PosteriorStore {
    capacity: usize,
    a: Vec<Matrix>,
    b: Vec<Matrix>,
    hyper: Vec<Hyperparameters>,
}

impl PosteriorStore {
    /// Pre-allocate room for `capacity` draws.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            a: Vec::with_capacity(capacity),
            b: Vec::with_capacity(capacity),
            hyper: Vec::with_capacity(capacity),
        }
    }

    /// Record the current state as the next draw.
    pub fn append(&mut self, state: &SamplerState) {
        debug_assert!(
            self.a.len() < self.capacity,
            "posterior store is full ({} draws)",
            self.capacity
        );
        self.a.push(state.a.clone());
        self.b.push(state.b.clone());
        self.hyper.push(state.hyper);
    }

    /// Number of draws recorded so far.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// True before the first append.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent draw, if any.
    pub fn last(&self) -> Option<SamplerState> {
        let s = self.len().checked_sub(1)?;
        Some(SamplerState::new(
            self.a[s].clone(),
            self.b[s].clone(),
            self.hyper[s],
        ))
    }

    /// Freeze the store into a [`Posterior`].
    pub fn into_posterior(self, restrictions: RestrictionSet) -> Posterior {
        Posterior {
            a: self.a,
            b: self.b,
            hyper: self.hyper,
            restrictions,
        }
    }
}

/// Ordered posterior draws of `A`, `B` and the hyperparameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Posterior {
    /// Draws of the N×K slope matrix.
    pub a: Vec<Matrix>,
    /// Draws of the N×N structural matrix.
    pub b: Vec<Matrix>,
    /// Draws of the hyperparameters.
    pub hyper: Vec<Hyperparameters>,
    /// Restrictions the `B` draws were generated under.
    pub restrictions: RestrictionSet,
}

impl Posterior {
    /// Number of draws S.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// True when no draw was recorded.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Draw `s` as a state.
    pub fn draw(&self, s: usize) -> Option<SamplerState> {
        Some(SamplerState::new(
            self.a.get(s)?.clone(),
            self.b.get(s)?.clone(),
            *self.hyper.get(s)?,
        ))
    }

    /// Final draw, usable as starting values for a follow-up run.
    pub fn last(&self) -> Option<SamplerState> {
        self.len().checked_sub(1).and_then(|s| self.draw(s))
    }

    /// Append the draws of a continuation run of the same chain.
    pub fn extend(&mut self, other: Posterior) -> Result<()> {
        if other.restrictions != self.restrictions {
            return Err(BsvarError::invalid_argument(
                "cannot join posteriors drawn under different restrictions",
            ));
        }
        if let (Some(mine), Some(theirs)) = (self.a.first(), other.a.first()) {
            if mine.shape() != theirs.shape() {
                return Err(BsvarError::dimension(
                    "continuation A",
                    format!("{}x{}", mine.nrows(), mine.ncols()),
                    format!("{}x{}", theirs.nrows(), theirs.ncols()),
                ));
            }
        }
        self.a.extend(other.a);
        self.b.extend(other.b);
        self.hyper.extend(other.hyper);
        Ok(())
    }

    /// Keep draws `burn, burn + every, burn + 2·every, …`.
    pub fn thin(&self, burn: usize, every: usize) -> Posterior {
        let every = every.max(1);
        let keep = |s: &usize| *s >= burn && (*s - burn) % every == 0;
        let idx: Vec<usize> = (0..self.len()).filter(keep).collect();
        Posterior {
            a: idx.iter().map(|&s| self.a[s].clone()).collect(),
            b: idx.iter().map(|&s| self.b[s].clone()).collect(),
            hyper: idx.iter().map(|&s| self.hyper[s]).collect(),
            restrictions: self.restrictions.clone(),
        }
    }

    /// Posterior mean of `A`.
    pub fn mean_a(&self) -> Option<Matrix> {
        mean_matrix(&self.a)
    }

    /// Posterior mean of `B`.
    pub fn mean_b(&self) -> Option<Matrix> {
        mean_matrix(&self.b)
    }

    /// Posterior mean of the hyperparameters.
    pub fn mean_hyper(&self) -> Option<Hyperparameters> {
        if self.is_empty() {
            return None;
        }
        let mut sum = [0.0; HYPER_DIM];
        for h in &self.hyper {
            for (acc, v) in sum.iter_mut().zip(h.to_array()) {
                *acc += v;
            }
        }
        let s = self.len() as f64;
        Some(Hyperparameters::from_array(sum.map(|v| v / s)))
    }

    /// Trace of `A[(i, j)]` across draws.
    pub fn a_trace(&self, i: usize, j: usize) -> Vec<f64> {
        self.a.iter().map(|a| a[(i, j)]).collect()
    }

    /// Trace of `B[(i, j)]` across draws.
    pub fn b_trace(&self, i: usize, j: usize) -> Vec<f64> {
        self.b.iter().map(|b| b[(i, j)]).collect()
    }

    /// Means and effective sample sizes of every parameter.
    pub fn summary(&self) -> Option<PosteriorSummary> {
        let mean_a = self.mean_a()?;
        let mean_b = self.mean_b()?;
        let mean_hyper = self.mean_hyper()?;
        let (n, k) = mean_a.shape();

        let ess_a = Matrix::from_fn(n, k, |i, j| chain_ess(&self.a_trace(i, j)));
        let ess_b = Matrix::from_fn(n, n, |i, j| chain_ess(&self.b_trace(i, j)));
        let mut ess_hyper = [0.0; HYPER_DIM];
        for (h, ess) in ess_hyper.iter_mut().enumerate() {
            let chain: Vec<f64> = self.hyper.iter().map(|draw| draw.to_array()[h]).collect();
            *ess = chain_ess(&chain);
        }

        Some(PosteriorSummary {
            draws: self.len(),
            mean_a,
            mean_b,
            mean_hyper,
            ess_a,
            ess_b,
            ess_hyper,
        })
    }
}

/// Posterior means with chain diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PosteriorSummary {
    /// Number of draws summarised.
    pub draws: usize,
    /// Posterior mean of `A`.
    pub mean_a: Matrix,
    /// Posterior mean of `B`.
    pub mean_b: Matrix,
    /// Posterior mean of the hyperparameters.
    pub mean_hyper: Hyperparameters,
    /// Effective sample size of each entry of `A`.
    pub ess_a: Matrix,
    /// Effective sample size of each entry of `B`.
    ///
    /// Entries fixed at zero by restrictions have no variance and report the
    /// number of draws.
    pub ess_b: Matrix,
    /// Effective sample size of each hyperparameter, in storage order.
    pub ess_hyper: [f64; HYPER_DIM],
}

impl PosteriorSummary {
    /// Smallest effective sample size over every parameter.
    pub fn min_ess(&self) -> f64 {
        self.ess_a
            .iter()
            .chain(self.ess_b.iter())
            .chain(self.ess_hyper.iter())
            .cloned()
            .fold(f64::INFINITY, f64::min)
    }
}

fn mean_matrix(draws: &[Matrix]) -> Option<Matrix> {
    let first = draws.first()?;
    let mut sum = Matrix::zeros(first.nrows(), first.ncols());
    for d in draws {
        sum += d;
    }
    Some(sum / draws.len() as f64)
}

/// Effective number of independent draws in a Markov chain trajectory.
///
/// `S / (1 + 2 Σ ρ_k)` with the lag-k autocorrelations ρ_k accumulated up
/// to `ESS_MAX_LAG` while they stay above `ESS_RHO_CUTOFF`. Constant traces,
/// such as entries of `B` fixed at zero, count every draw.
pub fn chain_ess(trace: &[f64]) -> f64 {
    let s = trace.len();
    if s < 2 {
        return s as f64;
    }
    let mean = trace.iter().sum::<f64>() / s as f64;
    let centred: Vec<f64> = trace.iter().map(|v| v - mean).collect();
    let gamma0 = centred.iter().map(|d| d * d).sum::<f64>() / s as f64;
    if gamma0 < 1e-12 {
        return s as f64;
    }

    let rho_sum: f64 = (1..=ESS_MAX_LAG.min(s / 2))
        .map(|lag| lag_covariance(&centred, lag) / gamma0)
        .take_while(|rho| *rho >= ESS_RHO_CUTOFF)
        .sum();
    s as f64 / (1.0 + 2.0 * rho_sum)
}

fn lag_covariance(centred: &[f64], lag: usize) -> f64 {
    let pairs = centred.len() - lag;
    centred[..pairs]
        .iter()
        .zip(&centred[lag..])
        .map(|(x, y)| x * y)
        .sum::<f64>()
        / pairs as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(v: f64) -> SamplerState {
        SamplerState::new(
            Matrix::from_element(2, 3, v),
            Matrix::identity(2, 2) * (1.0 + v),
            Hyperparameters::from_array([v + 1.0; HYPER_DIM]),
        )
    }

    #[test]
    fn test_store_preserves_order_and_last() {
        let mut store = PosteriorStore::with_capacity(3);
        assert!(store.last().is_none());
        for v in [0.0, 1.0, 2.0] {
            store.append(&state(v));
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.last(), Some(state(2.0)));
        let posterior = store.into_posterior(RestrictionSet::unrestricted(2));
        assert_eq!(posterior.draw(1), Some(state(1.0)));
        assert_eq!(posterior.last(), Some(state(2.0)));
    }

    #[test]
    fn test_means() {
        let mut store = PosteriorStore::with_capacity(2);
        store.append(&state(0.0));
        store.append(&state(2.0));
        let posterior = store.into_posterior(RestrictionSet::unrestricted(2));
        assert_eq!(posterior.mean_a().unwrap(), Matrix::from_element(2, 3, 1.0));
        assert_eq!(posterior.mean_hyper().unwrap().a_scale, 2.0);
        assert!(PosteriorStore::with_capacity(0)
            .into_posterior(RestrictionSet::unrestricted(2))
            .summary()
            .is_none());
    }

    #[test]
    fn test_thin_and_extend() {
        let mut store = PosteriorStore::with_capacity(10);
        for v in 0..10 {
            store.append(&state(v as f64));
        }
        let posterior = store.into_posterior(RestrictionSet::unrestricted(2));
        let thinned = posterior.thin(4, 3);
        assert_eq!(thinned.len(), 2);
        assert_eq!(thinned.draw(1), Some(state(7.0)));

        let mut joined = thinned.clone();
        joined.extend(thinned).unwrap();
        assert_eq!(joined.len(), 4);

        let other = PosteriorStore::with_capacity(0).into_posterior(RestrictionSet::diagonal(2));
        assert!(joined.extend(other).is_err());
    }

    #[test]
    fn test_ess_of_sticky_chain() {
        let trace: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
        let ess = chain_ess(&trace);
        assert!(ess > 0.0 && ess < 100.0);
        assert_eq!(chain_ess(&[1.0; 10]), 10.0);
        assert_eq!(chain_ess(&[3.0]), 1.0);
    }

    #[test]
    fn test_ess_of_alternating_chain_is_full() {
        // negative lag-1 correlation stops accumulation at once
        let trace: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_eq!(chain_ess(&trace), 50.0);
    }

    #[test]
    fn test_summary_covers_a() {
        let mut store = PosteriorStore::with_capacity(20);
        for v in 0..20 {
            store.append(&state((v % 3) as f64));
        }
        let summary = store
            .into_posterior(RestrictionSet::unrestricted(2))
            .summary()
            .unwrap();
        assert_eq!(summary.ess_a.shape(), (2, 3));
        assert!(summary.ess_a.iter().all(|e| *e > 0.0));
        assert!(summary.min_ess() <= summary.ess_a[(0, 0)]);
    }

    #[test]
    fn test_extend_rejects_other_dimensions() {
        let mut store = PosteriorStore::with_capacity(1);
        store.append(&state(0.0));
        let mut posterior = store.into_posterior(RestrictionSet::unrestricted(2));

        let mut wider = PosteriorStore::with_capacity(1);
        wider.append(&SamplerState::new(
            Matrix::zeros(2, 5),
            Matrix::identity(2, 2),
            Hyperparameters::ones(),
        ));
        let err = posterior
            .extend(wider.into_posterior(RestrictionSet::unrestricted(2)))
            .unwrap_err();
        assert!(matches!(err, BsvarError::DimensionMismatch { .. }));
        assert_eq!(posterior.len(), 1);
    }
}
