//! Logic variables.
//!
//! `spec.md` §9 ("Variable identity") explicitly blesses "a per-activation
//! integer index into a flat bindings vector, avoiding string allocation" as
//! the systems-language alternative to name-based lookup. `Var` is that
//! integer index, and it doubles as an `ena::unify::UnifyKey` so the
//! environment (`env.rs`) can use `ena`'s union-find table as its trail
//! (spec §9, Design Notes: "a trail (undo log)... the canonical
//! Warren-style design").

use ena::unify::{UnifyKey, UnifyValue};
use std::convert::Infallible;
use ziglog_macros::index_struct;

index_struct! {
    /// A freshened logic variable. Two `Var`s are the same variable iff
    /// they compare equal; there is no meaning to the raw index beyond
    /// identity and array-indexing.
    pub struct Var(u32);
}

impl UnifyKey for Var {
    type Value = VarValue;

    fn index(&self) -> u32 {
        self.as_u32()
    }

    fn from_index(u: u32) -> Self {
        Var::from_u32(u)
    }

    fn tag() -> &'static str {
        "Var"
    }
}

/// The value `ena` stores per union-find root: either unbound (`None`) or
/// bound to a term (by [`crate::term::TermId`], boxed away from this crate's
/// view as a raw `u32` so `ziglog-ir` doesn't need `ena`'s `UnifyValue` to
/// know about `TermId` directly — see the `From`/`Into` pair below).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VarValue(pub Option<u32>);

impl UnifyValue for VarValue {
    type Error = Infallible;

    /// Merges the value of two variables being unioned. At most one side
    /// should ever be bound in practice (binding an already-bound variable
    /// goes through `resolve` first), but if both are we keep the
    /// earlier-bound (left) one rather than erroring, matching the
    /// "bind `v ↦ other`; succeed" unconditional-success rule of
    /// `spec.md` §4.1 — the unifier, not this table, is responsible for
    /// rejecting genuine conflicts before they reach `union`.
    fn unify_values(value1: &Self, value2: &Self) -> Result<Self, Self::Error> {
        match (value1.0, value2.0) {
            (Some(a), _) => Ok(VarValue(Some(a))),
            (None, b) => Ok(VarValue(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_is_a_plain_copy_key() {
        let a = Var::from_u32(0);
        let b = Var::from_u32(1);
        assert_ne!(a, b);
        assert_eq!(a.index(), 0);
    }
}
