//! Run-level properties of the Gibbs sampler.

mod common;

use bsvar::{
    log_sddr_homoskedasticity, normalise_positive_diagonal, run_sampler, BsvarError, CancellationToken, GibbsSampler,
    Hyperparameters, Matrix, Prior, RestrictionSet, RunStatus, SamplerConfig, SamplerState,
    SvarData,
};
use common::{bivariate_a0, init_tracing, simulate_var1};

fn setup() -> (SvarData, Prior, RestrictionSet, SamplerState) {
    init_tracing();
    let b0 = Matrix::from_row_slice(2, 2, &[1.0, 0.0, -0.5, 1.0]);
    let data = simulate_var1(&bivariate_a0(), &b0, 200, 11);
    let prior = Prior::minnesota(2, 1, 1);
    let restrictions = RestrictionSet::lower_triangular(2);
    let start = SamplerState::default_for(data.n_regressors(), &restrictions);
    (data, prior, restrictions, start)
}

fn seeded(seed: u64) -> GibbsSampler {
    GibbsSampler::new(SamplerConfig::new().seed(seed))
}

// =============================================================================
// RUN INVARIANTS
// =============================================================================

#[test]
fn posterior_has_requested_length() {
    let (data, prior, restrictions, start) = setup();
    let output = run_sampler(150, data.y(), data.x(), &prior, &restrictions, start, false).unwrap();

    assert_eq!(output.status, RunStatus::Completed);
    assert_eq!(output.posterior.a.len(), 150);
    assert_eq!(output.posterior.b.len(), 150);
    assert_eq!(output.posterior.hyper.len(), 150);
}

#[test]
fn draws_are_invertible_and_positive() {
    let (data, prior, restrictions, start) = setup();
    let output = seeded(3)
        .run(300, &data, &prior, &restrictions, start)
        .unwrap();

    for (s, b) in output.posterior.b.iter().enumerate() {
        let det = b.determinant();
        assert!(det.abs() > 1e-10, "draw {} has |det B| = {}", s, det.abs());
    }
    for (s, h) in output.posterior.hyper.iter().enumerate() {
        assert!(
            h.to_array().iter().all(|v| v.is_finite() && *v > 0.0),
            "draw {} has non-positive hyperparameters {:?}",
            s,
            h
        );
    }
}

#[test]
fn zero_restrictions_hold_exactly() {
    let (data, prior, restrictions, start) = setup();
    let output = seeded(4)
        .run(200, &data, &prior, &restrictions, start)
        .unwrap();

    for b in &output.posterior.b {
        assert_eq!(b[(0, 1)], 0.0);
        assert_ne!(b[(1, 0)], 0.0);
    }
}

#[test]
fn diagonal_restrictions_hold_exactly() {
    let (data, prior, _, _) = setup();
    let restrictions = RestrictionSet::diagonal(2);
    let start = SamplerState::default_for(data.n_regressors(), &restrictions);
    let output = seeded(5)
        .run(100, &data, &prior, &restrictions, start)
        .unwrap();

    for b in &output.posterior.b {
        assert_eq!(b[(0, 1)], 0.0);
        assert_eq!(b[(1, 0)], 0.0);
    }
}

/// Three variables where equation 1 loads equally on variables 0 and 1.
fn tied_loading_restrictions() -> RestrictionSet {
    let mut e0 = Matrix::zeros(3, 1);
    e0[(0, 0)] = 1.0;
    let tied = Matrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    RestrictionSet::new(vec![e0, tied, Matrix::identity(3, 3)]).unwrap()
}

#[test]
fn general_basis_restrictions_hold_exactly() {
    init_tracing();
    let a0 = Matrix::from_row_slice(
        3,
        4,
        &[0.5, 0.0, 0.0, 0.1, 0.0, 0.4, 0.0, -0.2, 0.0, 0.0, 0.3, 0.0],
    );
    let b0 = Matrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.6, 0.6, 0.3, 0.0, 0.0, 1.0]);
    let data = simulate_var1(&a0, &b0, 200, 31);
    let prior = Prior::minnesota(3, 1, 1);
    let restrictions = tied_loading_restrictions();
    let start = SamplerState::default_for(data.n_regressors(), &restrictions);
    assert_eq!(start.b[(1, 0)], start.b[(1, 1)]);

    let output = seeded(31)
        .run(300, &data, &prior, &restrictions, start)
        .unwrap();

    assert_eq!(output.posterior.len(), 300);
    for (s, b) in output.posterior.b.iter().enumerate() {
        assert_eq!(b[(1, 0)], b[(1, 1)], "draw {} breaks the tied loading", s);
        assert_ne!(b[(1, 0)], 0.0);
        assert_eq!(b[(0, 1)], 0.0);
        assert_eq!(b[(0, 2)], 0.0);
    }

    // e_1 lies outside span{(1,1,0), (0,0,1)}, so a diagonal B is inadmissible
    let err = log_sddr_homoskedasticity(&output.posterior, &prior, data.y(), data.x(), false)
        .unwrap_err();
    assert!(matches!(err, BsvarError::InvalidArgument { .. }));
}

#[test]
fn fixed_seed_is_bit_identical() {
    let (data, prior, restrictions, start) = setup();
    let first = seeded(99)
        .run(100, &data, &prior, &restrictions, start.clone())
        .unwrap();
    let second = seeded(99)
        .run(100, &data, &prior, &restrictions, start.clone())
        .unwrap();
    let other = seeded(100)
        .run(100, &data, &prior, &restrictions, start)
        .unwrap();

    assert_eq!(first.posterior, second.posterior);
    assert_eq!(first.last_draw, second.last_draw);
    assert_ne!(first.posterior, other.posterior);
}

#[test]
fn single_draw_equals_last_draw() {
    let (data, prior, restrictions, start) = setup();
    let output = seeded(8)
        .run(1, &data, &prior, &restrictions, start.clone())
        .unwrap();

    assert_eq!(output.posterior.len(), 1);
    assert_eq!(output.posterior.last().unwrap(), output.last_draw);
    assert_ne!(output.last_draw, start);
}

// =============================================================================
// CANCELLATION AND PROGRESS
// =============================================================================

#[test]
fn cancellation_returns_completed_sweeps() {
    let (data, prior, restrictions, start) = setup();
    let token = CancellationToken::new();
    let trigger = token.clone();
    let mut sampler = GibbsSampler::new(
        SamplerConfig::new()
            .seed(21)
            .cancel_poll_interval(10)
            .progress_updates(20),
    )
    .with_cancellation(token);

    let mut sink = |done: usize, _total: usize| {
        if done == 50 {
            trigger.cancel();
        }
    };
    let output = sampler
        .run_with_progress(200, &data, &prior, &restrictions, start, &mut sink)
        .unwrap();

    assert_eq!(output.status, RunStatus::Cancelled { completed_sweeps: 50 });
    assert_eq!(output.posterior.len(), 50);
    assert_eq!(output.posterior.last().unwrap(), output.last_draw);
}

#[test]
fn progress_is_reported_at_bounded_cadence() {
    let (data, prior, restrictions, start) = setup();
    let mut ticks = Vec::new();
    {
        let mut sink = |done: usize, total: usize| ticks.push((done, total));
        seeded(2)
            .run_with_progress(1000, &data, &prior, &restrictions, start, &mut sink)
            .unwrap();
    }

    assert_eq!(ticks.len(), 50);
    assert_eq!(ticks.first(), Some(&(20, 1000)));
    assert_eq!(ticks.last(), Some(&(1000, 1000)));
    assert!(ticks.windows(2).all(|w| w[0].0 < w[1].0));
}

// =============================================================================
// CHECKPOINT CONTINUATION
// =============================================================================

#[test]
fn continuation_from_last_draw() {
    let (data, prior, restrictions, start) = setup();
    let first = seeded(31)
        .run(400, &data, &prior, &restrictions, start.clone())
        .unwrap();
    let second = seeded(32)
        .run(400, &data, &prior, &restrictions, first.last_draw.clone())
        .unwrap();
    let single = seeded(33)
        .run(800, &data, &prior, &restrictions, start)
        .unwrap();

    let mut chained = first.posterior.clone();
    chained.extend(second.posterior).unwrap();
    assert_eq!(chained.len(), 800);

    // rows of B are only identified up to sign
    let mut chained = chained.thin(100, 1);
    let mut single = single.posterior.thin(100, 1);
    normalise_positive_diagonal(&mut chained);
    normalise_positive_diagonal(&mut single);

    let chained_mean = chained.mean_b().unwrap();
    let single_mean = single.mean_b().unwrap();
    for i in 0..2 {
        for j in 0..2 {
            let (c, s) = (chained_mean[(i, j)], single_mean[(i, j)]);
            assert!(
                (c - s).abs() < 0.15,
                "B[{},{}]: chained {} vs single {}",
                i,
                j,
                c,
                s
            );
        }
    }
}

// =============================================================================
// INPUT ERRORS
// =============================================================================

#[test]
fn zero_draws_rejected() {
    let (data, prior, restrictions, start) = setup();
    let err = run_sampler(0, data.y(), data.x(), &prior, &restrictions, start, false).unwrap_err();
    assert!(matches!(err, BsvarError::InvalidArgument { .. }));
}

#[test]
fn mismatched_observations_rejected() {
    let (data, prior, restrictions, start) = setup();
    let x = data.x().columns(0, 150).into_owned();
    let err = run_sampler(10, data.y(), &x, &prior, &restrictions, start, false).unwrap_err();
    assert!(matches!(err, BsvarError::DimensionMismatch { .. }));
}

#[test]
fn wrong_restriction_count_rejected() {
    let (data, prior, _, start) = setup();
    let restrictions = RestrictionSet::lower_triangular(3);
    let err = seeded(1)
        .run(10, &data, &prior, &restrictions, start)
        .unwrap_err();
    assert!(matches!(err, BsvarError::DimensionMismatch { .. }));
}

#[test]
fn non_positive_hyper_rejected() {
    let (data, prior, restrictions, mut start) = setup();
    start.hyper = Hyperparameters::from_array([1.0, 1.0, 0.0, 1.0, 1.0]);
    let err = seeded(1)
        .run(10, &data, &prior, &restrictions, start)
        .unwrap_err();
    assert!(matches!(err, BsvarError::InvalidStartingValue { .. }));
}

#[test]
fn singular_start_rejected() {
    let (data, prior, restrictions, mut start) = setup();
    start.b = Matrix::from_row_slice(2, 2, &[1.0, 0.0, 2.0, 0.0]);
    let err = seeded(1)
        .run(10, &data, &prior, &restrictions, start)
        .unwrap_err();
    assert!(matches!(err, BsvarError::InvalidStartingValue { .. }));
}

#[test]
fn non_conforming_start_rejected() {
    let (data, prior, restrictions, mut start) = setup();
    start.b[(0, 1)] = 0.3;
    let err = seeded(1)
        .run(10, &data, &prior, &restrictions, start)
        .unwrap_err();
    assert!(matches!(err, BsvarError::InvalidStartingValue { .. }));
}

#[test]
fn misshapen_start_rejected() {
    let (data, prior, restrictions, mut start) = setup();
    start.a = Matrix::zeros(2, 2);
    let err = seeded(1)
        .run(10, &data, &prior, &restrictions, start)
        .unwrap_err();
    assert!(err.is_input_error());
    assert!(matches!(err, BsvarError::InvalidStartingValue { .. }));
}
