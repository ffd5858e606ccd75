//! The one-shot probe used by `->`, `;` with `->`, `\+`, and `not`
//! (`spec.md` §4.3 "Probe", Design Notes "Probes without mutation leakage").
//!
//! A probe runs the solver on a clone of the caller's environment with a
//! handler that throws the `ProbeSucceeded` sentinel the instant it is
//! invoked. Catching that sentinel here — and nowhere else — is what keeps
//! it an implementation detail rather than a leak into the embedder-visible
//! `Error` type (`spec.md` §7: "leaking them is a bug").

use crate::error::{ErrorKind, Result};
use crate::solver::{solve, SolveCtx};
use ziglog_ir::{Environment, TermId};

/// Runs `cond` to at most one solution. Returns `Some(env)` — a full clone
/// of the environment as it stood at that one solution — on success, or
/// `None` if `cond` has no solutions at all. Never yields a second solution
/// even if more exist (`spec.md` §4.3).
pub fn probe(
    ctx: &mut SolveCtx,
    env: &Environment,
    depth: usize,
    cond: TermId,
) -> Result<Option<Environment>> {
    ctx.metrics.probes += 1;
    let mut clone = env.clone();
    let scope = ctx.fresh_scope();
    let mut captured: Option<Environment> = None;

    let result = {
        let captured_ref = &mut captured;
        let mut sentinel_handler = move |_arena: &ziglog_ir::Arena, e: &mut Environment| -> Result<()> {
            *captured_ref = Some(e.clone());
            Err(ErrorKind::ProbeSucceeded.into())
        };
        solve(ctx, vec![cond], &mut clone, depth, scope, &mut sentinel_handler)
    };

    match result {
        Ok(_) => Ok(None),
        Err(e) => match e.kind() {
            ErrorKind::ProbeSucceeded => Ok(captured),
            _ => Err(e),
        },
    }
}
