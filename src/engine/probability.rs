//! Closed-form probability primitives.
//!
//! Everything here is stateless math shared by the fitter, the simulator and
//! ad-hoc analysis callers:
//! - Bayesian posterior update
//! - Poisson PMF and survival probability
//! - Normal CDF via the Abramowitz–Stegun error-function approximation
//! - Binomial PMF
//!
//! Preconditions are enforced with `EngineError::Domain` — these functions
//! sit at the public boundary where callers may feed unvalidated numbers.

use crate::error::EngineError;

/// Maximum absolute error of the A&S 7.1.26 erf approximation.
pub const NORMAL_CDF_MAX_ERROR: f64 = 1.5e-7;

// ── Bayes ────────────────────────────────────────────────────────────────────

/// Bayesian posterior update: `P(H|E) = P(E|H)·P(H) / P(E)`.
///
/// The result is intentionally NOT clamped to [0, 1]: callers own the
/// responsibility of supplying a coherent (prior, likelihood, evidence)
/// triple. An inconsistent triple yields a value outside [0, 1] and that
/// is a caller bug we want visible, not masked.
pub fn bayesian_update(prior: f64, likelihood: f64, evidence: f64) -> Result<f64, EngineError> {
    if evidence <= 0.0 {
        return Err(EngineError::Domain(format!(
            "evidence must be > 0, got {evidence}"
        )));
    }
    Ok(likelihood * prior / evidence)
}

// ── Poisson ──────────────────────────────────────────────────────────────────

/// Poisson probability mass: `P(X = k) = e^{-λ} λ^k / k!`.
///
/// Computed as an iterative product `e^{-λ} · Π_{i=1..k} (λ/i)` rather than
/// raw powers and factorials, which overflow f64 around k ≈ 170.
pub fn poisson_pmf(lambda: f64, k: u64) -> Result<f64, EngineError> {
    if lambda < 0.0 {
        return Err(EngineError::Domain(format!(
            "lambda must be >= 0, got {lambda}"
        )));
    }
    let mut p = (-lambda).exp();
    for i in 1..=k {
        p *= lambda / i as f64;
    }
    Ok(p)
}

/// Survival probability `P(X > threshold)` for a Poisson variable, via
/// `1 − Σ_{k=0..⌊threshold⌋} pmf(k)`.
///
/// A negative threshold means every outcome clears it: returns 1.0.
pub fn poisson_over_probability(lambda: f64, threshold: f64) -> Result<f64, EngineError> {
    if lambda < 0.0 {
        return Err(EngineError::Domain(format!(
            "lambda must be >= 0, got {lambda}"
        )));
    }
    if threshold < 0.0 {
        return Ok(1.0);
    }
    let upper = threshold.floor() as u64;
    let mut cdf = 0.0;
    let mut p = (-lambda).exp();
    for k in 0..=upper {
        if k > 0 {
            p *= lambda / k as f64;
        }
        cdf += p;
    }
    Ok((1.0 - cdf).max(0.0))
}

// ── Normal ───────────────────────────────────────────────────────────────────

/// Normal cumulative distribution `P(X ≤ x)` for `X ~ N(mean, std_dev²)`.
///
/// Uses `Φ(z) = (1 + erf(z/√2)) / 2` with the Abramowitz–Stegun 7.1.26
/// rational approximation of erf (max abs error ≈ 1.5e-7). At `x == mean`
/// the approximation is exact: erf(0) = 0 → 0.5.
pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> Result<f64, EngineError> {
    if std_dev <= 0.0 {
        return Err(EngineError::Domain(format!(
            "std_dev must be > 0, got {std_dev}"
        )));
    }
    let z = (x - mean) / (std_dev * std::f64::consts::SQRT_2);
    Ok(0.5 * (1.0 + erf(z)))
}

/// Abramowitz–Stegun 7.1.26 rational approximation of the error function.
fn erf(x: f64) -> f64 {
    // erf is odd; evaluate on |x| and restore the sign
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

// ── Binomial ─────────────────────────────────────────────────────────────────

/// Binomial probability mass: `P(X = k) = C(n, k) p^k (1−p)^{n−k}`.
pub fn binomial_pmf(n: u64, p: f64, k: u64) -> Result<f64, EngineError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(EngineError::Domain(format!(
            "p must be in [0, 1], got {p}"
        )));
    }
    if k > n {
        return Err(EngineError::Domain(format!("k ({k}) must be <= n ({n})")));
    }
    // C(n, k) built incrementally via the symmetric smaller index to keep
    // intermediate values small
    let m = k.min(n - k);
    let mut coeff = 1.0;
    for i in 0..m {
        coeff = coeff * (n - i) as f64 / (i + 1) as f64;
    }
    Ok(coeff * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32))
}
