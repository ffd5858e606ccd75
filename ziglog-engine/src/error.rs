//! The embedder-facing error type (`spec.md` §7). Wraps
//! [`ziglog_solve::Error`] via `error-chain`'s `links` so a caller holding a
//! `ziglog_engine::Error` can match on the solver's `ErrorKind` variants
//! without this crate re-declaring them.

error_chain::error_chain! {
    links {
        Solve(ziglog_solve::Error, ziglog_solve::ErrorKind);
    }
    errors {
        NoClauseHead {
            description("rule has no valid head")
            display("a clause or DCG rule's head must be an Atom or Compound term")
        }
    }
}
