//! Unification, arithmetic, and SLD resolution (`spec.md` §4, components
//! C3/C4/C6): everything that turns a clause database and a goal list into
//! either a sequence of handler invocations or a propagated [`error::Error`].

pub mod arith;
pub mod error;
pub mod limits;
pub mod probe;
pub mod solver;
pub mod unify;

pub use arith::{evaluate, Numeric};
pub use error::{Error, ErrorKind, Result};
pub use limits::{SolveMetrics, SolverLimits};
pub use probe::probe;
pub use solver::{solve, ScopeId, SolveCtx, SolveStatus, Handler, TOP_SCOPE};
pub use unify::unify;
