//! The embedder-facing facade (`spec.md` §6, component boundary C1–C8 all
//! meet here): `Engine` owns the arena, clause database, index, and solver
//! configuration for one session, and exposes only the operations an
//! embedder (REPL, file loader, test harness — all out of scope here) needs.

pub mod error;

pub use error::{Error, ErrorKind, Result};
pub use ziglog_dcg::DcgRule;
pub use ziglog_ir::{Arena, Clause, ClauseId, Environment, Sym, TermData, TermId};
pub use ziglog_solve::{Handler, ScopeId, SolveMetrics, SolveStatus, SolverLimits, TOP_SCOPE};

use std::io::{self, Write};
use ziglog_ir::{functor_key, ClauseIndex, Database};
use ziglog_solve::SolveCtx;

/// A clause or DCG rule as submitted to [`Engine::add_clause`] (`spec.md`
/// §6: "`Engine::add_clause(rule)` — append to database and index",
/// folding in §4.5's DCG expansion so the embedder never has to call
/// `ziglog_dcg::expand` itself).
pub enum Rule {
    Clause(Clause),
    Dcg(DcgRule),
}

/// One session's worth of state (`spec.md` §5 "Shared resources": "the
/// arena that backs all terms and environments is bound to the session
/// lifetime"). The clause database and index persist across queries.
///
/// `template_env` is the `Environment` every clause's variables are
/// allocated in (via [`Engine::arena_mut`]/[`Engine::template_env_mut`])
/// before [`Engine::add_clause`] indexes it. A clause template's `Var`s are
/// just raw indices (`ziglog_ir::var`) into *some* `Environment`'s naming
/// vectors, so freshening a clause at solve time (`ziglog_solve::solver`)
/// must look its display name up in an `Environment` that has an entry at
/// that index — [`Engine::fresh_query_env`] hands out a clone of
/// `template_env` for exactly this reason, rather than a bare
/// `Environment::new()`, which would panic the first time a clause
/// containing a variable got resolved (§5: "no cross-query sharing of
/// environment *state*" means bindings, not the variable-naming registry).
pub struct Engine {
    arena: Arena,
    template_env: Environment,
    database: Database,
    index: ClauseIndex,
    limits: SolverLimits,
    metrics: SolveMetrics,
    sink: Box<dyn Write>,
}

impl Engine {
    /// `Engine::new()` (`spec.md` §6), with the default
    /// [`SolverLimits`] (`max_depth` ≈ 600, §4.3/§9) and stdout as the
    /// write sink.
    pub fn new() -> Self {
        Engine::with_limits(SolverLimits::default())
    }

    pub fn with_limits(limits: SolverLimits) -> Self {
        Engine {
            arena: Arena::new(),
            template_env: Environment::new(),
            database: Database::new(),
            index: ClauseIndex::new(),
            limits,
            metrics: SolveMetrics::default(),
            sink: Box::new(io::stdout()),
        }
    }

    /// Redirects `write/1`, `format/1,2`, and `nl`'s output away from
    /// stdout. The test suites use this to capture output into a `Vec<u8>`.
    pub fn set_sink(&mut self, sink: Box<dyn Write>) {
        self.sink = sink;
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// The environment clause terms must be built in — see the struct-level
    /// note on `template_env`. Whatever constructs `Rule::Clause`/`Rule::Dcg`
    /// values for [`Engine::add_clause`] should allocate their variables
    /// here, through [`Engine::arena_mut`]'s `fresh_var`.
    pub fn template_env_mut(&mut self) -> &mut Environment {
        &mut self.template_env
    }

    /// Allocates a fresh template variable, registered in `template_env`.
    /// A thin convenience over `arena_mut().fresh_var(template_env_mut(), ..)`
    /// that sidesteps borrowing both through separate method calls.
    pub fn fresh_var(&mut self, name: &str) -> TermId {
        self.arena.fresh_var(&mut self.template_env, name)
    }

    /// A fresh per-query environment (`spec.md` §5), seeded with every
    /// variable name registered so far so that freshening a clause added
    /// before this call can look up its template variables' display names.
    /// Bindings made through the returned `Environment` are independent of
    /// `template_env` and of every other query's environment.
    pub fn fresh_query_env(&self) -> Environment {
        self.template_env.clone()
    }

    pub fn metrics(&self) -> &SolveMetrics {
        &self.metrics
    }

    /// `Engine::add_clause(rule)` (`spec.md` §6). DCG rules are expanded
    /// (`spec.md` §4.5) before indexing; ordinary clauses are indexed
    /// as-is. Appends to both the database and the index in the same call,
    /// preserving the index's "called once per clause, in insertion order"
    /// invariant (`ziglog_ir::ClauseIndex::add`).
    pub fn add_clause(&mut self, rule: Rule) -> Result<ClauseId> {
        let clause = match rule {
            Rule::Clause(c) => c,
            Rule::Dcg(dcg) => ziglog_dcg::expand(&dcg, &mut self.arena, &mut self.template_env),
        };
        if functor_key(&self.arena, clause.head).is_none() {
            return Err(ErrorKind::NoClauseHead.into());
        }
        let id = self.database.push(clause.clone());
        self.index.add(id, &clause, &self.arena);
        Ok(id)
    }

    /// `Engine::solve(goals, env, handler) -> Result` (`spec.md` §6): drive
    /// the solver from a fresh top-level activation (`depth = 0`,
    /// `scope_id = TOP_SCOPE`, since a stray top-level `!` has no enclosing
    /// predicate to prune — `spec.md` §4.3).
    pub fn solve(
        &mut self,
        goals: Vec<TermId>,
        env: &mut Environment,
        handler: &mut Handler<'_>,
    ) -> Result<SolveStatus> {
        let mut ctx = SolveCtx::new(
            &mut self.arena,
            &self.database,
            &self.index,
            &self.limits,
            &mut self.metrics,
            &mut *self.sink,
        );
        let status = ziglog_solve::solve(&mut ctx, goals, env, 0, TOP_SCOPE, handler)?;
        Ok(status)
    }

    /// `Engine::resolve(term, env)` (`spec.md` §6): follow bindings without
    /// copying anything. The result may alias arena state that a later
    /// binding mutates through `env` — callers that need an independent
    /// value should follow up with [`Engine::copy_resolved`].
    pub fn resolve(&self, term: TermId, env: &mut Environment) -> TermId {
        env.resolve(&self.arena, term)
    }

    /// `Engine::copy_resolved(term, env)` (`spec.md` §6): a genuine
    /// structural copy of `term`'s current value, independent of further
    /// mutation to `env`. Unbound variables are left as-is — there is
    /// nothing to copy. Does not guard against cyclic terms produced by
    /// occurs-check-free unification (`spec.md` §9 "Cyclic terms"): copying
    /// a term built from `X = f(X)` recurses until the arena (or the
    /// native stack) is exhausted.
    pub fn copy_resolved(&mut self, term: TermId, env: &mut Environment) -> TermId {
        let resolved = env.resolve(&self.arena, term);
        match self.arena.get(resolved).clone() {
            TermData::Var(_) => resolved,
            TermData::Atom(name) => self.arena.atom_sym(name),
            TermData::Int(i) => self.arena.int(i),
            TermData::Float(f) => self.arena.float(f),
            TermData::Str(bytes) => self.arena.string(bytes.to_vec()),
            TermData::Compound(functor, args) => {
                let new_args: Vec<TermId> =
                    args.iter().map(|&a| self.copy_resolved(a, env)).collect();
                self.arena.compound_sym(functor, new_args)
            }
        }
    }

    /// Renders `term`'s current value the way the REPL's solution printer
    /// would (`spec.md` §4.7).
    pub fn write_term(&self, term: TermId, env: &mut Environment) -> String {
        ziglog_fmt::write_term(&self.arena, env, term)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// `spec.md` §8's six literal end-to-end scenarios, each built by hand
/// against `Engine`'s arena/template-env handles since the lexer/parser is
/// out of scope (`spec.md` §1).
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ziglog_fmt::write_term;

    fn add_fact(engine: &mut Engine, functor: &str, args: Vec<TermId>) {
        let head = engine.arena_mut().compound(functor, args);
        engine.add_clause(Rule::Clause(Clause::fact(head))).unwrap();
    }

    #[test]
    fn grandparent_emits_both_solutions_in_insertion_order() {
        let mut engine = Engine::new();
        let john = engine.arena_mut().atom("john");
        let mary = engine.arena_mut().atom("mary");
        let jane = engine.arena_mut().atom("jane");
        let ann = engine.arena_mut().atom("ann");
        add_fact(&mut engine, "parent", vec![john, mary]);
        add_fact(&mut engine, "parent", vec![jane, mary]);
        add_fact(&mut engine, "parent", vec![mary, ann]);

        let x = engine.fresh_var("X");
        let y = engine.fresh_var("Y");
        let z = engine.fresh_var("Z");
        let head = engine.arena_mut().compound("grandparent", vec![x, y]);
        let g1 = engine.arena_mut().compound("parent", vec![x, z]);
        let g2 = engine.arena_mut().compound("parent", vec![z, y]);
        engine
            .add_clause(Rule::Clause(Clause::rule(head, vec![g1, g2])))
            .unwrap();

        let mut env = engine.fresh_query_env();
        let qx = engine.arena_mut().fresh_var(&mut env, "X");
        let query = engine.arena_mut().compound("grandparent", vec![qx, ann]);

        let mut solutions = Vec::new();
        let status = engine
            .solve(vec![query], &mut env, &mut |arena, env| {
                solutions.push(write_term(arena, env, qx));
                Ok(())
            })
            .unwrap();

        assert_eq!(status, SolveStatus::Normal);
        assert_eq!(solutions, vec!["john", "jane"]);
    }

    #[test]
    fn append_builds_the_concatenated_list() {
        let mut engine = Engine::new();
        let l = engine.fresh_var("L");
        let nil = engine.arena_mut().nil();
        let fact_head = engine.arena_mut().compound("append", vec![nil, l, l]);
        engine
            .add_clause(Rule::Clause(Clause::fact(fact_head)))
            .unwrap();

        let h = engine.fresh_var("H");
        let t = engine.fresh_var("T");
        let l2 = engine.fresh_var("L2");
        let r = engine.fresh_var("R");
        let cons_ht = engine.arena_mut().cons(h, t);
        let cons_hr = engine.arena_mut().cons(h, r);
        let rule_head = engine.arena_mut().compound("append", vec![cons_ht, l2, cons_hr]);
        let rule_body = engine.arena_mut().compound("append", vec![t, l2, r]);
        engine
            .add_clause(Rule::Clause(Clause::rule(rule_head, vec![rule_body])))
            .unwrap();

        let one = engine.arena_mut().int(1);
        let two = engine.arena_mut().int(2);
        let three = engine.arena_mut().int(3);
        let list12 = engine.arena_mut().list(vec![one, two]);
        let list3 = engine.arena_mut().list(vec![three]);

        let mut env = engine.fresh_query_env();
        let qx = engine.arena_mut().fresh_var(&mut env, "X");
        let query = engine.arena_mut().compound("append", vec![list12, list3, qx]);

        let mut solutions = Vec::new();
        engine
            .solve(vec![query], &mut env, &mut |arena, env| {
                solutions.push(write_term(arena, env, qx));
                Ok(())
            })
            .unwrap();

        assert_eq!(solutions, vec!["[1, 2, 3]"]);
    }

    #[test]
    fn arithmetic_is_covers_division_intdiv_mod_and_infinity() {
        let run_is = |build_expr: &dyn Fn(&mut Engine) -> TermId| -> String {
            let mut engine = Engine::new();
            let mut env = engine.fresh_query_env();
            let x = engine.arena_mut().fresh_var(&mut env, "X");
            let expr = build_expr(&mut engine);
            let goal = engine.arena_mut().compound("is", vec![x, expr]);
            let mut solutions = Vec::new();
            engine
                .solve(vec![goal], &mut env, &mut |arena, env| {
                    solutions.push(write_term(arena, env, x));
                    Ok(())
                })
                .unwrap();
            solutions.into_iter().next().expect("is/2 should succeed")
        };

        assert_eq!(
            run_is(&|e| {
                let seven = e.arena_mut().int(7);
                let two = e.arena_mut().int(2);
                e.arena_mut().compound("/", vec![seven, two])
            }),
            "3.5"
        );
        assert_eq!(
            run_is(&|e| {
                let seven = e.arena_mut().int(7);
                let two = e.arena_mut().int(2);
                e.arena_mut().compound("//", vec![seven, two])
            }),
            "3"
        );
        assert_eq!(
            run_is(&|e| {
                let seven = e.arena_mut().int(7);
                let three = e.arena_mut().int(3);
                e.arena_mut().compound("mod", vec![seven, three])
            }),
            "1"
        );
        assert_eq!(
            run_is(&|e| {
                let inf = e.arena_mut().atom("inf");
                let one = e.arena_mut().int(1);
                e.arena_mut().compound("+", vec![inf, one])
            }),
            "1.0Inf"
        );
    }

    #[test]
    fn cut_in_max_commits_to_a_single_solution() {
        let mut engine = Engine::new();
        let x = engine.fresh_var("X");
        let y = engine.fresh_var("Y");
        let head1 = engine.arena_mut().compound("max", vec![x, y, x]);
        let cond = engine.arena_mut().compound(">=", vec![x, y]);
        let cut = engine.arena_mut().atom("!");
        engine
            .add_clause(Rule::Clause(Clause::rule(head1, vec![cond, cut])))
            .unwrap();

        let blank = engine.fresh_var("_");
        let y2 = engine.fresh_var("Y2");
        add_fact(&mut engine, "max", vec![blank, y2, y2]);

        let three = engine.arena_mut().int(3);
        let seven = engine.arena_mut().int(7);
        let mut env = engine.fresh_query_env();
        let qz = engine.arena_mut().fresh_var(&mut env, "Z");
        let query = engine.arena_mut().compound("max", vec![three, seven, qz]);

        let mut solutions = Vec::new();
        engine
            .solve(vec![query], &mut env, &mut |arena, env| {
                solutions.push(write_term(arena, env, qz));
                Ok(())
            })
            .unwrap();

        assert_eq!(solutions, vec!["7"]);
    }

    #[test]
    fn dcg_phrase_succeeds_on_a_matching_sentence_and_fails_otherwise() {
        let mut engine = Engine::new();
        let np_atom = engine.arena_mut().atom("np");
        let vp_atom = engine.arena_mut().atom("vp");
        let s_head = engine.arena_mut().atom("s");
        engine
            .add_clause(Rule::Dcg(DcgRule {
                head: s_head,
                body: vec![np_atom, vp_atom],
            }))
            .unwrap();

        let the = engine.arena_mut().atom("the");
        let cat = engine.arena_mut().atom("cat");
        let term_the = engine.arena_mut().list(vec![the]);
        let term_cat = engine.arena_mut().list(vec![cat]);
        let np_head = engine.arena_mut().atom("np");
        engine
            .add_clause(Rule::Dcg(DcgRule {
                head: np_head,
                body: vec![term_the, term_cat],
            }))
            .unwrap();

        let sleeps = engine.arena_mut().atom("sleeps");
        let term_sleeps = engine.arena_mut().list(vec![sleeps]);
        let vp_head = engine.arena_mut().atom("vp");
        engine
            .add_clause(Rule::Dcg(DcgRule {
                head: vp_head,
                body: vec![term_sleeps],
            }))
            .unwrap();

        let s_call = engine.arena_mut().atom("s");
        let the2 = engine.arena_mut().atom("the");
        let cat2 = engine.arena_mut().atom("cat");
        let sleeps2 = engine.arena_mut().atom("sleeps");
        let matching = engine.arena_mut().list(vec![the2, cat2, sleeps2]);
        let phrase_ok = engine.arena_mut().compound("phrase", vec![s_call, matching]);

        let mut env_ok = engine.fresh_query_env();
        let mut ok_count = 0;
        engine
            .solve(vec![phrase_ok], &mut env_ok, &mut |_, _| {
                ok_count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(ok_count, 1);

        let runs = engine.arena_mut().atom("runs");
        let non_matching = engine.arena_mut().list(vec![the2, cat2, runs]);
        let phrase_bad = engine.arena_mut().compound("phrase", vec![s_call, non_matching]);
        let mut env_bad = engine.fresh_query_env();
        let mut bad_count = 0;
        engine
            .solve(vec![phrase_bad], &mut env_bad, &mut |_, _| {
                bad_count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(bad_count, 0);
    }

    #[test]
    fn distinct_suppresses_the_duplicate_solution() {
        let mut engine = Engine::new();
        let one = engine.arena_mut().int(1);
        let two = engine.arena_mut().int(2);
        let one_again = engine.arena_mut().int(1);
        add_fact(&mut engine, "p", vec![one]);
        add_fact(&mut engine, "p", vec![two]);
        add_fact(&mut engine, "p", vec![one_again]);

        let mut env = engine.fresh_query_env();
        let qx = engine.arena_mut().fresh_var(&mut env, "X");
        let p_goal = engine.arena_mut().compound("p", vec![qx]);
        let query = engine.arena_mut().compound("distinct", vec![qx, p_goal]);

        let mut solutions = Vec::new();
        engine
            .solve(vec![query], &mut env, &mut |arena, env| {
                solutions.push(write_term(arena, env, qx));
                Ok(())
            })
            .unwrap();

        assert_eq!(solutions, vec!["1", "2"]);
    }

    #[test]
    fn add_clause_rejects_a_variable_head() {
        let mut engine = Engine::new();
        let v = engine.fresh_var("H");
        let result = engine.add_clause(Rule::Clause(Clause::fact(v)));
        assert!(result.is_err());
    }
}
