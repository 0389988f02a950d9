use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bsvar::{
    log_sddr_homoskedasticity, GibbsSampler, Matrix, Prior, RestrictionSet, SamplerConfig,
    SamplerState, SvarData,
};
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Random-walk panel of `n` variables over `t + p` periods.
fn random_walk_data(n: usize, t: usize, p: usize) -> SvarData {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let mut series = Matrix::zeros(t + p, n);
    for period in 1..(t + p) {
        for i in 0..n {
            let z: f64 = StandardNormal.sample(&mut rng);
            series[(period, i)] = 0.9 * series[(period - 1, i)] + z;
        }
    }
    SvarData::from_series(&series, p, None).unwrap()
}

fn bench_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("gibbs");
    group.sample_size(10);

    for (n, p) in [(3, 2), (6, 4)] {
        let data = random_walk_data(n, 200, p);
        let prior = Prior::minnesota(n, p, 1);
        let restrictions = RestrictionSet::lower_triangular(n);
        let start = SamplerState::default_for(data.n_regressors(), &restrictions);

        group.bench_function(format!("100_sweeps_n{}_p{}", n, p), |b| {
            b.iter(|| {
                let output = GibbsSampler::new(SamplerConfig::new().seed(3).progress_updates(0))
                    .run(100, &data, &prior, &restrictions, start.clone())
                    .unwrap();
                black_box(output.last_draw)
            });
        });
    }
    group.finish();
}

fn bench_sddr(c: &mut Criterion) {
    let data = random_walk_data(3, 200, 2);
    let prior = Prior::minnesota(3, 2, 1);
    let restrictions = RestrictionSet::lower_triangular(3);
    let start = SamplerState::default_for(data.n_regressors(), &restrictions);
    let output = GibbsSampler::new(SamplerConfig::new().seed(4))
        .run(500, &data, &prior, &restrictions, start)
        .unwrap();

    c.bench_function("sddr_500_draws", |b| {
        b.iter(|| {
            let result =
                log_sddr_homoskedasticity(&output.posterior, &prior, data.y(), data.x(), false)
                    .unwrap();
            black_box(result.log_sddr)
        });
    });
}

criterion_group!(benches, bench_sweeps, bench_sddr);
criterion_main!(benches);
