//! Random variate sampling for the Monte Carlo core.
//!
//! Every sampler takes an injected `rand::Rng` — there is no global random
//! state anywhere in the engine. Callers that need reproducibility pass a
//! `StdRng::seed_from_u64(...)`; given the same seed and parameters the draw
//! sequence is identical, which the simulator relies on for bit-identical
//! reruns.
//!
//! Parameter preconditions are `debug_assert!`s: these functions sit in the
//! hot loop and are only reachable through the fitter, which already
//! guarantees valid parameters.

use rand::Rng;

/// Draw from `N(mean, std_dev²)` via the Box–Muller transform, clamped to
/// be non-negative.
///
/// The clamp exists because every stat we model (points, rebounds, minutes…)
/// cannot go below zero. It biases the sample mean slightly upward for
/// low-mean/high-variance stats; that is an accepted domain trade-off, not
/// a bug — a "-2 rebounds" draw is meaningless.
pub fn sample_normal<R: Rng + ?Sized>(mean: f64, std_dev: f64, rng: &mut R) -> f64 {
    debug_assert!(std_dev > 0.0, "std_dev must be positive");

    // u1 must be strictly positive for the log; gen() yields [0, 1)
    let mut u1: f64 = rng.gen();
    while u1 <= f64::MIN_POSITIVE {
        u1 = rng.gen();
    }
    let u2: f64 = rng.gen();

    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (mean + std_dev * z).max(0.0)
}

/// Draw from `Poisson(lambda)` via Knuth's cumulative-product inversion.
///
/// Runtime is O(lambda) per draw, which is fine for the single-digit rates
/// of the counting stats this engine models.
pub fn sample_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> u64 {
    debug_assert!(lambda >= 0.0, "lambda must be non-negative");
    if lambda == 0.0 {
        return 0;
    }

    let limit = (-lambda).exp();
    let mut k = 0u64;
    let mut product: f64 = 1.0;
    loop {
        product *= rng.gen::<f64>();
        if product <= limit {
            return k;
        }
        k += 1;
    }
}

/// Draw from `Binomial(n, p)` as a sum of `n` independent Bernoulli(p) trials.
pub fn sample_binomial<R: Rng + ?Sized>(n: u64, p: f64, rng: &mut R) -> u64 {
    debug_assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");
    (0..n).filter(|_| rng.gen::<f64>() < p).count() as u64
}
