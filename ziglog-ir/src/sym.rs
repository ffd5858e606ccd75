//! Atom/functor name interning.
//!
//! `spec.md` §3 describes `Atom` as "an interned-or-copied byte sequence".
//! We take the interned branch: every atom and compound functor name is
//! interned once into the process-wide table `lalrpop-intern` maintains, so
//! equality and hashing of names is a `u32` comparison rather than a byte
//! compare, and clause-index keys (`"functor/arity"`, §4.2) are cheap to
//! build and cache.

use std::fmt;

/// An interned name: an atom, a functor, or (pre-freshening) a surface
/// variable name.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sym(lalrpop_intern::InternedString);

impl Sym {
    pub fn intern(s: &str) -> Self {
        Sym(lalrpop_intern::intern(s))
    }

    pub fn as_str(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

lazy_static::lazy_static! {
    /// Interned `[]` (the empty list atom), looked up constantly enough by
    /// the list machinery (unifier, writer, DCG expander) to cache.
    pub static ref NIL: Sym = Sym::intern("[]");
    pub static ref DOT: Sym = Sym::intern(".");
    pub static ref TRUE: Sym = Sym::intern("true");
    pub static ref FAIL: Sym = Sym::intern("fail");
    pub static ref FALSE: Sym = Sym::intern("false");
    pub static ref CUT: Sym = Sym::intern("!");
    pub static ref REPEAT: Sym = Sym::intern("repeat");
    pub static ref NL: Sym = Sym::intern("nl");
    pub static ref NAN: Sym = Sym::intern("nan");
    pub static ref INF: Sym = Sym::intern("inf");
    pub static ref BRACES: Sym = Sym::intern("{}");
    pub static ref END_SCOPE: Sym = Sym::intern("$end_scope");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_by_value() {
        let a = Sym::intern("grandparent");
        let b = Sym::intern("grandparent");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "grandparent");
    }

    #[test]
    fn well_known_atoms_round_trip() {
        assert_eq!(NIL.as_str(), "[]");
        assert_eq!(CUT.as_str(), "!");
    }
}
