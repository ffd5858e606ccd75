//! The unifier (`spec.md` §4.1, component C3).

use ziglog_ir::{Arena, Environment, TermData, TermId};

/// `unify(t1, t2, E) -> bool`, mutating `env` on success. Partial bindings
/// made before a failure are *not* rolled back — callers that need an
/// all-or-nothing attempt must snapshot/clone `env` first (`\=`, probes; see
/// `crate::probe`).
pub fn unify(arena: &Arena, env: &mut Environment, t1: TermId, t2: TermId) -> bool {
    let a = env.resolve(arena, t1);
    let b = env.resolve(arena, t2);

    if a == b {
        return true;
    }

    match (arena.get(a), arena.get(b)) {
        (TermData::Var(va), TermData::Var(vb)) => {
            env.union_vars(*va, *vb);
            true
        }
        (TermData::Var(va), _) => {
            env.bind(*va, b);
            true
        }
        (_, TermData::Var(vb)) => {
            env.bind(*vb, a);
            true
        }
        (TermData::Atom(na), TermData::Atom(nb)) => na == nb,
        (TermData::Int(ia), TermData::Int(ib)) => ia == ib,
        // NaN fails to unify with itself: plain `==` already gives this.
        (TermData::Float(fa), TermData::Float(fb)) => fa == fb,
        (TermData::Str(sa), TermData::Str(sb)) => sa == sb,
        (TermData::Compound(fa, args_a), TermData::Compound(fb, args_b)) => {
            if fa != fb || args_a.len() != args_b.len() {
                return false;
            }
            args_a
                .iter()
                .zip(args_b.iter())
                .all(|(&x, &y)| unify(arena, env, x, y))
        }
        // Int/Float deliberately do not unify with each other (§4.1); every
        // other cross-shape pairing fails too.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ziglog_ir::TermData as TD;

    #[test]
    fn atoms_unify_iff_same_name() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let a1 = arena.atom("john");
        let a2 = arena.atom("john");
        let a3 = arena.atom("mary");
        assert!(unify(&arena, &mut env, a1, a2));
        assert!(!unify(&arena, &mut env, a1, a3));
    }

    #[test]
    fn ints_and_floats_never_cross_unify() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let i = arena.int(1);
        let f = arena.float(1.0);
        assert!(!unify(&arena, &mut env, i, f));
    }

    #[test]
    fn nan_does_not_unify_with_itself() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let n1 = arena.float(f64::NAN);
        let n2 = arena.float(f64::NAN);
        assert!(!unify(&arena, &mut env, n1, n2));
    }

    #[test]
    fn variable_binds_to_other_side() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let x = arena.fresh_var(&mut env, "X");
        let john = arena.atom("john");
        assert!(unify(&arena, &mut env, x, john));
        let resolved = env.resolve(&arena, x);
        assert!(matches!(arena.get(resolved), TD::Atom(a) if a.as_str() == "john"));
    }

    #[test]
    fn unification_is_symmetric() {
        let mut arena = Arena::new();
        let john = arena.atom("john");
        let mary = arena.atom("mary");
        let compound_a = arena.compound("parent", vec![john, mary]);
        let compound_b = arena.compound("parent", vec![john, mary]);

        let mut env1 = Environment::new();
        let forward = unify(&arena, &mut env1, compound_a, compound_b);
        let mut env2 = Environment::new();
        let backward = unify(&arena, &mut env2, compound_b, compound_a);
        assert_eq!(forward, backward);
        assert!(forward);
    }

    #[test]
    fn compound_unification_recurses_and_short_circuits() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let john = arena.atom("john");
        let mary = arena.atom("mary");
        let ann = arena.atom("ann");
        let t1 = arena.compound("p", vec![john, mary]);
        let t2 = arena.compound("p", vec![john, ann]);
        assert!(!unify(&arena, &mut env, t1, t2));
    }
}
