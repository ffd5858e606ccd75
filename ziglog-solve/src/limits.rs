//! Resource limits and per-query metrics for the solver. Mirrors the
//! config/metrics split of a `ResourceLimitConfig`/`EvalMetrics` pair: a
//! `Default`-able, `serde`-able knob struct the embedder can tune, plus a
//! plain counters struct returned alongside a query's result.

use serde::{Deserialize, Serialize};

/// `spec.md` §4.3/§9: "depth... fails with a DepthExceeded error if it
/// crosses a fixed ceiling (≈600 in the source)". Exposed as a configurable
/// limit rather than a baked-in constant, per the Design Notes' preferred
/// alternative ("a configurable limit").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverLimits {
    /// Maximum recursion depth a single query may reach before
    /// `ErrorKind::DepthExceeded` aborts it.
    pub max_depth: usize,
}

impl Default for SolverLimits {
    fn default() -> Self {
        SolverLimits { max_depth: 600 }
    }
}

impl SolverLimits {
    pub fn new(max_depth: usize) -> Self {
        SolverLimits { max_depth }
    }
}

/// Counters accumulated over the lifetime of one `solve` call. Purely
/// observational — nothing here feeds back into solver behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveMetrics {
    pub clause_resolutions: u64,
    pub candidate_attempts: u64,
    pub probes: u64,
    pub backtracks: u64,
}
