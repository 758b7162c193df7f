use thiserror::Error;

/// Errors raised by the prediction core.
///
/// Only contract violations raise. Absence of history is an expected,
/// common case and is handled by the fitter's league-average fallback,
/// never by an error. The core performs no logging and no retries;
/// both belong to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid request input (non-positive player id, negative line, …).
    /// Raised before any computation; never silently corrected.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A mathematical precondition was violated (negative lambda,
    /// evidence ≤ 0, probability outside [0, 1]). Propagated unmodified.
    #[error("domain error: {0}")]
    Domain(String),
}
