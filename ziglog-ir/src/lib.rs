//! Term representation, environment, clause storage and first-argument
//! indexing — the data model shared by the rest of the workspace
//! (`spec.md` §3, components C1, C2, C5).

pub mod clause;
pub mod env;
pub mod index;
pub mod sym;
pub mod term;
pub mod var;

pub use clause::{Clause, ClauseId, Database};
pub use env::Environment;
pub use index::ClauseIndex;
pub use sym::Sym;
pub use term::{functor_key, Arena, TermData, TermId};
pub use var::{Var, VarValue};
