//! The environment (`spec.md` §3/§4, component C2): a mapping from variable
//! to term, with `resolve` (path-following lookup) and `clone` (independent
//! copy for a branch that must not leak bindings back).
//!
//! Backed by `ena`'s union-find table rather than a `HashMap<Var, Term>`.
//! This is the trail the Design Notes (`spec.md` §9) call "the canonical
//! Warren-style design": binding a variable is `O(1)` amortized, `resolve`
//! benefits from `ena`'s path compression, and — crucially for the
//! deterministic-frame optimization in §4.3/§5 — a *branch point* can be
//! recorded with [`Environment::snapshot`] and discarded with
//! [`Environment::rollback_to`] instead of deep-copying the whole map. Full
//! [`Clone`] (used where the solver's contract calls for an independent
//! copy it will keep, e.g. `\=`, probes) is still available and is a real
//! deep copy of the table.

use crate::sym::Sym;
use crate::term::TermId;
use crate::var::{Var, VarValue};
use ena::unify::{InPlace, InPlaceUnificationTable, Snapshot};

#[derive(Clone)]
pub struct Environment {
    table: InPlaceUnificationTable<Var>,
    /// Index = `Var`'s raw index -> the `TermId` of the `TermData::Var`
    /// node that names it (see [`crate::term::Arena::fresh_var`]).
    var_term: Vec<TermId>,
    /// Index = `Var`'s raw index -> surface name, for display only.
    var_name: Vec<Sym>,
    /// Variables the embedder asked to track for solution extraction
    /// (`spec.md` §6: "read resolved bindings for each query variable").
    query_vars: Vec<(Sym, Var)>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            table: InPlaceUnificationTable::new(),
            var_term: Vec::new(),
            var_name: Vec::new(),
            query_vars: Vec::new(),
        }
    }

    /// Allocates a new, unbound variable. The caller (normally
    /// [`crate::term::Arena::fresh_var`]) must immediately patch in the
    /// `TermId` that names it with [`Environment::set_var_term`].
    pub fn new_var(&mut self, display_name: Sym) -> Var {
        let v = self.table.new_key(VarValue(None));
        debug_assert_eq!(v.as_u32() as usize, self.var_name.len());
        self.var_name.push(display_name);
        self.var_term.push(TermId::from_u32(u32::MAX));
        v
    }

    pub fn set_var_term(&mut self, v: Var, term: TermId) {
        self.var_term[v.as_usize()] = term;
    }

    pub fn var_name(&self, v: Var) -> Sym {
        self.var_name[v.as_usize()]
    }

    /// Registers `var` under `name` as a query variable whose binding the
    /// embedder wants to read back after a successful `solve` (§6).
    pub fn mark_query_var(&mut self, name: Sym, var: Var) {
        self.query_vars.push((name, var));
    }

    pub fn query_vars(&self) -> &[(Sym, Var)] {
        &self.query_vars
    }

    /// Binds `v` to `term`, unconditionally. Per `spec.md` §4.1, binding a
    /// variable to *anything* always succeeds; rejecting genuine conflicts
    /// (e.g. two already-resolved non-variable terms that differ) is the
    /// unifier's job, performed before it ever calls this.
    pub fn bind(&mut self, v: Var, term: TermId) {
        let _ = self.table.unify_var_value(v, VarValue(Some(term.as_u32())));
    }

    /// Aliases two unbound variables together (`X = Y`).
    pub fn union_vars(&mut self, a: Var, b: Var) {
        let _ = self.table.union(a, b);
    }

    /// `resolve(t, E)` (`spec.md` §3): follow variable bindings until
    /// reaching a non-variable term, or an unbound variable, and return
    /// that. Never mutates observable bindings (path compression is an
    /// internal bookkeeping detail, not a semantic one).
    pub fn resolve(&mut self, arena: &crate::term::Arena, term: TermId) -> TermId {
        let mut current = term;
        loop {
            let var = match arena.get(current) {
                crate::term::TermData::Var(v) => *v,
                _ => return current,
            };
            let root = self.table.find(var);
            match self.table.probe_value(root).0 {
                Some(bound_raw) => current = TermId::from_u32(bound_raw),
                None => return self.var_term[root.as_usize()],
            }
        }
    }

    /// A snapshot of the current trail. Cheaper than [`Clone`] when the
    /// branch either commits (keeping all bindings) or is abandoned in its
    /// entirety (rolled back) without needing to be kept around afterward.
    pub fn snapshot(&mut self) -> Snapshot<InPlace<Var>> {
        self.table.snapshot()
    }

    pub fn rollback_to(&mut self, snapshot: Snapshot<InPlace<Var>>) {
        self.table.rollback_to(snapshot)
    }

    pub fn commit(&mut self, snapshot: Snapshot<InPlace<Var>>) {
        self.table.commit(snapshot)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Arena, TermData};

    #[test]
    fn resolve_follows_chains_and_stops_at_ground_terms() {
        let mut arena = Arena::new();
        let mut env = Environment::new();

        let x = arena.fresh_var(&mut env, "X");
        let y = arena.fresh_var(&mut env, "Y");
        let atom = arena.atom("john");

        // X -> Y -> john
        if let TermData::Var(vx) = *arena.get(x) {
            env.bind(vx, y);
        }
        if let TermData::Var(vy) = *arena.get(y) {
            env.bind(vy, atom);
        }

        let resolved = env.resolve(&arena, x);
        assert!(matches!(arena.get(resolved), TermData::Atom(a) if a.as_str() == "john"));
    }

    #[test]
    fn resolve_is_idempotent_for_acyclic_bindings() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let x = arena.fresh_var(&mut env, "X");
        let atom = arena.atom("a");
        if let TermData::Var(vx) = *arena.get(x) {
            env.bind(vx, atom);
        }
        let once = env.resolve(&arena, x);
        let twice = env.resolve(&arena, once);
        assert_eq!(once.as_u32(), twice.as_u32());
    }

    #[test]
    fn clone_is_independent() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let x = arena.fresh_var(&mut env, "X");
        let mut branch = env.clone();
        let atom = arena.atom("a");
        if let TermData::Var(vx) = *arena.get(x) {
            branch.bind(vx, atom);
        }
        // The original environment must not see the branch's binding.
        let resolved_original = env.resolve(&arena, x);
        assert_eq!(resolved_original.as_u32(), x.as_u32());
        let resolved_branch = branch.resolve(&arena, x);
        assert!(matches!(arena.get(resolved_branch), TermData::Atom(_)));
    }

    #[test]
    fn snapshot_rollback_discards_bindings() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let x = arena.fresh_var(&mut env, "X");
        let atom = arena.atom("a");
        let snap = env.snapshot();
        if let TermData::Var(vx) = *arena.get(x) {
            env.bind(vx, atom);
        }
        env.rollback_to(snap);
        let resolved = env.resolve(&arena, x);
        assert_eq!(resolved.as_u32(), x.as_u32());
    }
}
