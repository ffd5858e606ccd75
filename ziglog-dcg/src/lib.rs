//! DCG (Definite Clause Grammar) expansion (`spec.md` §4.5, component C7).
//!
//! Runs once per DCG rule at clause-ingestion time, before the resulting
//! ordinary clause ever reaches `ziglog_ir::ClauseIndex`.

use ziglog_ir::{Arena, Clause, Environment, TermData, TermId};

/// A DCG rule as it arrives from the surface form `Head --> Body.`: shaped
/// like [`ziglog_ir::Clause`], except `body` holds DCG *elements*
/// (non-terminals, terminal lists, empty lists, brace goals) rather than
/// ordinary goals — one entry per comma-separated element.
pub struct DcgRule {
    pub head: TermId,
    pub body: Vec<TermId>,
}

/// Threads a chain of fresh difference-list variables `S0, ..., Sn` through
/// `rule.body` and returns the equivalent ordinary [`Clause`].
pub fn expand(rule: &DcgRule, arena: &mut Arena, env: &mut Environment) -> Clause {
    let mut threads = Vec::with_capacity(rule.body.len() + 1);
    for i in 0..=rule.body.len() {
        threads.push(arena.fresh_var(env, &format!("S{}", i)));
    }

    let mut body_goals = Vec::new();
    for (i, &element) in rule.body.iter().enumerate() {
        expand_element(arena, element, threads[i], threads[i + 1], &mut body_goals);
    }

    let s0 = threads[0];
    let sn = threads[rule.body.len()];
    let head = append_thread_args(arena, rule.head, s0, sn);
    Clause::rule(head, body_goals)
}

fn expand_element(
    arena: &mut Arena,
    element: TermId,
    s_in: TermId,
    s_out: TermId,
    body_goals: &mut Vec<TermId>,
) {
    match arena.get(element).clone() {
        TermData::Atom(name) if name.as_str() == "[]" => {
            body_goals.push(unify_goal(arena, s_in, s_out));
        }
        TermData::Compound(functor, args) if functor.as_str() == "." && args.len() == 2 => {
            let items = collect_terminal_list(arena, element);
            let list = list_with_tail(arena, &items, s_out);
            body_goals.push(unify_goal(arena, s_in, list));
        }
        TermData::Compound(functor, args) if functor.as_str() == "{}" && args.len() == 1 => {
            body_goals.push(args[0]);
            body_goals.push(unify_goal(arena, s_in, s_out));
        }
        // Non-terminal atom or compound: thread S_in/S_out onto it.
        _ => body_goals.push(append_thread_args(arena, element, s_in, s_out)),
    }
}

/// Appends `s_in, s_out` to a non-terminal's argument list. The same rule
/// turns `rule.head` into its indexable, threaded form (`spec.md` §4.5).
fn append_thread_args(arena: &mut Arena, term: TermId, s_in: TermId, s_out: TermId) -> TermId {
    match arena.get(term).clone() {
        TermData::Atom(name) => arena.compound_sym(name, vec![s_in, s_out]),
        TermData::Compound(functor, args) => {
            let mut new_args: Vec<TermId> = args.to_vec();
            new_args.push(s_in);
            new_args.push(s_out);
            arena.compound_sym(functor, new_args)
        }
        // Not a valid non-terminal shape; wrap it so ingestion doesn't
        // panic and the solver reports the failure at call time instead.
        _ => arena.compound("call", vec![term, s_in, s_out]),
    }
}

fn unify_goal(arena: &mut Arena, a: TermId, b: TermId) -> TermId {
    arena.compound("=", vec![a, b])
}

fn collect_terminal_list(arena: &Arena, list: TermId) -> Vec<TermId> {
    let mut out = Vec::new();
    let mut current = list;
    loop {
        match arena.get(current) {
            TermData::Compound(functor, args) if functor.as_str() == "." && args.len() == 2 => {
                out.push(args[0]);
                current = args[1];
            }
            _ => break,
        }
    }
    out
}

fn list_with_tail(arena: &mut Arena, items: &[TermId], tail: TermId) -> TermId {
    let mut current = tail;
    for &item in items.iter().rev() {
        current = arena.cons(item, current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_head_gets_two_threaded_args() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let sleeps = arena.atom("sleeps");
        let terminal = arena.list(vec![sleeps]);
        let head = arena.atom("vp");
        let rule = DcgRule {
            head,
            body: vec![terminal],
        };
        let clause = expand(&rule, &mut arena, &mut env);
        match arena.get(clause.head) {
            TermData::Compound(functor, args) => {
                assert_eq!(functor.as_str(), "vp");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected threaded compound head"),
        }
        assert_eq!(clause.body.len(), 1);
    }

    #[test]
    fn non_terminal_compound_gets_args_appended_not_replaced() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let x = arena.fresh_var(&mut env, "X");
        let det = arena.compound("det", vec![x]);
        let head = arena.compound("np", vec![x]);
        let rule = DcgRule {
            head,
            body: vec![det],
        };
        let clause = expand(&rule, &mut arena, &mut env);
        match arena.get(clause.body[0]) {
            TermData::Compound(functor, args) => {
                assert_eq!(functor.as_str(), "det");
                assert_eq!(args.len(), 3); // X, S_in, S_out
            }
            _ => panic!("expected threaded non-terminal call"),
        }
    }

    #[test]
    fn empty_list_element_unifies_threads_directly() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let empty = arena.nil();
        let head = arena.atom("empty_rule");
        let rule = DcgRule {
            head,
            body: vec![empty],
        };
        let clause = expand(&rule, &mut arena, &mut env);
        match arena.get(clause.body[0]) {
            TermData::Compound(functor, args) => {
                assert_eq!(functor.as_str(), "=");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected unify goal"),
        }
    }

    #[test]
    fn brace_goal_emits_the_goal_then_a_unify() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let check = arena.atom("check");
        let brace = arena.compound("{}", vec![check]);
        let head = arena.atom("guarded");
        let rule = DcgRule {
            head,
            body: vec![brace],
        };
        let clause = expand(&rule, &mut arena, &mut env);
        assert_eq!(clause.body.len(), 2);
        assert!(matches!(arena.get(clause.body[0]), TermData::Atom(a) if a.as_str() == "check"));
        assert!(matches!(arena.get(clause.body[1]), TermData::Compound(f, _) if f.as_str() == "="));
    }

    #[test]
    fn terminal_list_unifies_s_in_with_list_ending_in_s_out() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let the = arena.atom("the");
        let cat = arena.atom("cat");
        let terminal = arena.list(vec![the, cat]);
        let head = arena.atom("np");
        let rule = DcgRule {
            head,
            body: vec![terminal],
        };
        let clause = expand(&rule, &mut arena, &mut env);
        match arena.get(clause.body[0]) {
            TermData::Compound(functor, args) => {
                assert_eq!(functor.as_str(), "=");
                // args[1] should be [the, cat | S_out]: a two-deep cons
                // chain whose final tail is a bare variable, not `[]`.
                match arena.get(args[1]) {
                    TermData::Compound(f, a) => {
                        assert_eq!(f.as_str(), ".");
                        match arena.get(a[1]) {
                            TermData::Compound(f2, a2) => {
                                assert_eq!(f2.as_str(), ".");
                                assert!(matches!(arena.get(a2[1]), TermData::Var(_)));
                            }
                            _ => panic!("expected nested cons"),
                        }
                    }
                    _ => panic!("expected cons cell"),
                }
            }
            _ => panic!("expected unify goal"),
        }
    }
}
