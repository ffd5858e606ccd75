//! The error taxonomy (`spec.md` §7). Logic failure is not an error — it is
//! the absence of a handler invocation and an eventual `Normal` return; only
//! the kinds enumerated here ever propagate out of [`crate::solver::solve`].
//!
//! `ProbeSucceeded`/`NegationFound` are internal sentinels (§7: "never
//! surface to embedders"): [`crate::probe::probe`] is the one place that is
//! allowed to observe them, converting them back into a plain `bool`.
//! Leaking one past that boundary is a bug in this crate, not in a caller.

error_chain::error_chain! {
    errors {
        Uninstantiated {
            description("uninstantiated variable")
            display("uninstantiated variable encountered in arithmetic evaluation")
        }
        TypeError(detail: String) {
            description("type error")
            display("type error: {}", detail)
        }
        UnknownOperator(name: String, arity: usize) {
            description("unknown arithmetic operator")
            display("unknown arithmetic operator {}/{}", name, arity)
        }
        DepthExceeded(limit: usize) {
            description("solver depth exceeded")
            display("solver recursion depth exceeded the configured limit of {}", limit)
        }
        IoError(detail: String) {
            description("write sink I/O error")
            display("I/O error: {}", detail)
        }
        OutOfMemory {
            description("arena exhausted")
            display("arena exhausted")
        }
        ProbeSucceeded {
            description("internal: probe succeeded")
            display("internal sentinel leaked past probe() — this is a bug")
        }
        NegationFound {
            description("internal: negation found a solution")
            display("internal sentinel leaked past probe() — this is a bug")
        }
    }
}
