//! Synthetic SVAR data shared by the integration tests.

#![allow(dead_code)]

use bsvar::{Matrix, SvarData, Vector};
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing_subscriber::EnvFilter;

/// Route sampler logs to the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Slope matrix of a stationary bivariate VAR(1) with a constant,
/// columns ordered (lag of y1, lag of y2, constant).
pub fn bivariate_a0() -> Matrix {
    Matrix::from_row_slice(2, 3, &[0.5, 0.1, 0.2, 0.0, 0.4, -0.1])
}

/// Simulate `t` usable observations of `y_t = A0 [y_{t-1}; 1] + B0⁻¹ u_t`.
pub fn simulate_var1(a0: &Matrix, b0: &Matrix, t: usize, seed: u64) -> SvarData {
    let n = b0.nrows();
    let b0_inv = b0.clone().try_inverse().expect("B0 must be invertible");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let burn = 100;

    let mut series = Matrix::zeros(t + 1, n);
    let mut y = Vector::zeros(n);
    for step in 0..(burn + t + 1) {
        let mut regressors = Vector::from_element(n + 1, 1.0);
        regressors.rows_mut(0, n).copy_from(&y);
        let u = Vector::from_fn(n, |_, _| {
            let z: f64 = StandardNormal.sample(&mut rng);
            z
        });
        y = a0 * regressors + &b0_inv * u;
        if step >= burn {
            series.set_row(step - burn, &y.transpose());
        }
    }
    SvarData::from_series(&series, 1, None).expect("simulated series is valid")
}
