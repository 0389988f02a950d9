//! Reproducible random-number streams.
//!
//! A run owns one master [`Xoshiro256PlusPlus`] seeded once. Work that may be
//! spread over threads derives an independent stream per task from a seed
//! drawn off the master stream and the task's index, so results do not depend
//! on scheduling.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::Vector;

/// The generator used for every stream.
pub type SamplerRng = Xoshiro256PlusPlus;

/// Create the master stream for a run.
pub fn master_rng(seed: u64) -> SamplerRng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// Mix a base seed with a task counter (SplitMix64 finaliser).
///
/// Nearby counters map to well-separated seeds.
pub fn counter_rng_seed(seed: u64, counter: u64) -> u64 {
    let mut z = seed ^ counter.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Independent stream for task `counter` under `seed`.
pub fn stream(seed: u64, counter: u64) -> SamplerRng {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(seed, counter))
}

/// Draw a standard normal vector of length `k`.
pub fn sample_standard_normal_vector<R: Rng + ?Sized>(rng: &mut R, k: usize) -> Vector {
    Vector::from_iterator(
        k,
        (0..k).map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            z
        }),
    )
}

/// One standard normal vector per task, each from its own stream.
///
/// With the `parallel` feature the vectors are generated on the rayon pool;
/// the output is identical either way.
pub fn standard_normal_vectors(seed: u64, tasks: usize, k: usize) -> Vec<Vector> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..tasks)
            .into_par_iter()
            .map(|i| sample_standard_normal_vector(&mut stream(seed, i as u64), k))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..tasks)
            .map(|i| sample_standard_normal_vector(&mut stream(seed, i as u64), k))
            .collect()
    }
}
