//! SLD resolution with cut, disjunction, if-then(-else), negation-as-
//! failure, and built-ins (`spec.md` §4.3, component C6 — the largest
//! component in the system).

use crate::arith::{evaluate, Numeric};
use crate::error::{ErrorKind, Result};
use crate::unify::unify;
use std::collections::HashMap;
use ziglog_ir::{Arena, ClauseIndex, Clause, Database, Environment, TermData, TermId, Var};

use crate::limits::{SolveMetrics, SolverLimits};

/// `scope_id` (`spec.md` §4.3, Glossary: "the activation frame that a cut
/// should prune"). `0` is reserved for the top-level query, which has no
/// enclosing predicate for a stray cut to target.
pub type ScopeId = u32;

pub const TOP_SCOPE: ScopeId = 0;

/// `Result ∈ { Normal, Cut(scope_id) }` (`spec.md` §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Normal,
    Cut(ScopeId),
}

/// The solution handler (`spec.md` §6): invoked once per refutation with a
/// read-only (in spirit — mutable only so it can call `env.resolve`) view
/// of the environment. May return `Err` to abort enumeration early; probes
/// (`crate::probe`) are the one sanctioned user of this to smuggle out a
/// one-shot sentinel.
pub type Handler<'h> = dyn FnMut(&Arena, &mut Environment) -> Result<()> + 'h;

/// Everything `solve` needs besides the goal list and environment: the
/// arena (mutable — freshening and `is` both allocate), the read-only
/// clause store/index, resource limits, metrics, an output sink, and the
/// bookkeeping a handful of built-ins need (fresh scope ids, `distinct/2`'s
/// per-call seen-sets).
pub struct SolveCtx<'a> {
    pub arena: &'a mut Arena,
    pub database: &'a Database,
    pub index: &'a ClauseIndex,
    pub limits: &'a SolverLimits,
    pub metrics: &'a mut SolveMetrics,
    pub sink: &'a mut dyn std::io::Write,
    next_scope: ScopeId,
    distinct_tables: HashMap<u32, Vec<DistinctValue>>,
    next_distinct_table: u32,
}

impl<'a> SolveCtx<'a> {
    pub fn new(
        arena: &'a mut Arena,
        database: &'a Database,
        index: &'a ClauseIndex,
        limits: &'a SolverLimits,
        metrics: &'a mut SolveMetrics,
        sink: &'a mut dyn std::io::Write,
    ) -> Self {
        SolveCtx {
            arena,
            database,
            index,
            limits,
            metrics,
            sink,
            next_scope: TOP_SCOPE + 1,
            distinct_tables: HashMap::new(),
            next_distinct_table: 0,
        }
    }

    pub(crate) fn fresh_scope(&mut self) -> ScopeId {
        let s = self.next_scope;
        self.next_scope += 1;
        s
    }
}

/// `solve(goals, E, depth, scope_id, handler) -> Result` (`spec.md` §4.3).
/// Written as an explicit loop so the four tail-call goal shapes the spec
/// calls out (`$end_scope`, `phrase/2`, `phrase/3`, and pure rewrites like
/// `true`/`nl`) update `goals`/`scope_id`/`depth` in place and `continue`
/// rather than recurse; every other dispatch recurses (directly, or via a
/// helper that itself calls back into `solve`).
pub fn solve(
    ctx: &mut SolveCtx,
    mut goals: Vec<TermId>,
    env: &mut Environment,
    mut depth: usize,
    mut scope_id: ScopeId,
    handler: &mut Handler<'_>,
) -> Result<SolveStatus> {
    // A deeply recursive query can overrun the native stack well before
    // `depth` reaches `max_depth` for a generous limit; growing the stack
    // on demand keeps `DepthExceeded` — not a segfault — the real failure
    // mode (`spec.md` §9 "Depth guard").
    stacker::maybe_grow(1024 * 1024, 8 * 1024 * 1024, || {
        solve_inner(ctx, &mut goals, env, &mut depth, &mut scope_id, handler)
    })
}

fn solve_inner(
    ctx: &mut SolveCtx,
    goals: &mut Vec<TermId>,
    env: &mut Environment,
    depth: &mut usize,
    scope_id: &mut ScopeId,
    handler: &mut Handler<'_>,
) -> Result<SolveStatus> {
    loop {
        if *depth > ctx.limits.max_depth {
            return Err(ErrorKind::DepthExceeded(ctx.limits.max_depth).into());
        }

        let (g, rest) = match split_first(goals) {
            None => {
                handler(ctx.arena, env)?;
                return Ok(SolveStatus::Normal);
            }
            Some(pair) => pair,
        };

        let resolved = env.resolve(ctx.arena, g);
        let data = ctx.arena.get(resolved).clone();

        match data {
            TermData::Atom(name) if name == *ziglog_ir::sym::CUT => {
                let status = solve(ctx, rest, env, *depth, *scope_id, handler)?;
                return Ok(match status {
                    SolveStatus::Normal => SolveStatus::Cut(*scope_id),
                    cut => cut,
                });
            }
            TermData::Atom(name) if name == *ziglog_ir::sym::TRUE => {
                *goals = rest;
            }
            TermData::Atom(name) if name == *ziglog_ir::sym::FAIL || name == *ziglog_ir::sym::FALSE => {
                return Ok(SolveStatus::Normal);
            }
            TermData::Atom(name) if name == *ziglog_ir::sym::NL => {
                write_sink(ctx, "\n")?;
                *goals = rest;
            }
            TermData::Atom(name) if name == *ziglog_ir::sym::REPEAT => loop {
                let mut branch = env.clone();
                let status = solve(ctx, rest.clone(), &mut branch, *depth, *scope_id, handler)?;
                if let SolveStatus::Cut(cs) = status {
                    return Ok(SolveStatus::Cut(cs));
                }
                // Normal: loop again. Cut is the sole termination (§4.3).
            },
            TermData::Compound(functor, args)
                if functor == *ziglog_ir::sym::END_SCOPE && args.len() == 2 =>
            {
                *scope_id = term_as_scope(ctx.arena, args[1]);
                *goals = rest;
            }
            TermData::Compound(functor, args) if functor.as_str() == "is" && args.len() == 2 => {
                let value = evaluate(ctx.arena, env, args[1])?;
                let term = value.into_term(ctx.arena);
                if unify(ctx.arena, env, args[0], term) {
                    *goals = rest;
                } else {
                    return Ok(SolveStatus::Normal);
                }
            }
            TermData::Compound(functor, args) if args.len() == 2 && is_comparison(&functor.as_str()) => {
                let a = evaluate(ctx.arena, env, args[0])?;
                let b = evaluate(ctx.arena, env, args[1])?;
                if compare(&functor.as_str(), a, b) {
                    *goals = rest;
                } else {
                    return Ok(SolveStatus::Normal);
                }
            }
            TermData::Compound(functor, args) if functor.as_str() == "=" && args.len() == 2 => {
                if unify(ctx.arena, env, args[0], args[1]) {
                    *goals = rest;
                } else {
                    return Ok(SolveStatus::Normal);
                }
            }
            TermData::Compound(functor, args) if functor.as_str() == "\\=" && args.len() == 2 => {
                let mut probe_env = env.clone();
                let unified = unify(ctx.arena, &mut probe_env, args[0], args[1]);
                if unified {
                    return Ok(SolveStatus::Normal);
                }
                *goals = rest;
            }
            TermData::Compound(functor, args) if functor.as_str() == "->" && args.len() == 2 => {
                match crate::probe::probe(ctx, env, *depth, args[0])? {
                    Some(committed) => {
                        *env = committed;
                        *goals = prepend_one(args[1], rest);
                    }
                    None => return Ok(SolveStatus::Normal),
                }
            }
            TermData::Compound(functor, args) if functor.as_str() == ";" && args.len() == 2 => {
                if let Some(then_branch) = if_then_else_condition(ctx.arena, env, args[0]) {
                    match crate::probe::probe(ctx, env, *depth, then_branch.cond)? {
                        Some(committed) => {
                            *env = committed;
                            *goals = prepend_one(then_branch.then_goal, rest);
                        }
                        None => {
                            *goals = prepend_one(args[1], rest);
                        }
                    }
                    continue;
                }

                let mut branch_a = env.clone();
                let goals_a = prepend_one(args[0], rest.clone());
                let status_a = solve(ctx, goals_a, &mut branch_a, *depth, *scope_id, handler)?;
                if status_a != SolveStatus::Normal {
                    return Ok(status_a);
                }
                let mut branch_b = env.clone();
                let goals_b = prepend_one(args[1], rest);
                return solve(ctx, goals_b, &mut branch_b, *depth, *scope_id, handler);
            }
            TermData::Compound(functor, args)
                if (functor.as_str() == "\\+" || functor.as_str() == "not") && args.len() == 1 =>
            {
                match crate::probe::probe(ctx, env, *depth, args[0])? {
                    Some(_) => return Ok(SolveStatus::Normal),
                    None => *goals = rest,
                }
            }
            TermData::Compound(functor, args)
                if functor.as_str() == "phrase" && (args.len() == 2 || args.len() == 3) =>
            {
                let l = args[1];
                let r = if args.len() == 3 {
                    args[2]
                } else {
                    ctx.arena.nil()
                };
                let call = append_call_args(ctx.arena, args[0], l, r);
                *goals = prepend_one(call, rest);
            }
            TermData::Compound(functor, args) if functor.as_str() == "distinct" && args.len() == 2 => {
                let table_id = ctx.next_distinct_table;
                ctx.next_distinct_table += 1;
                ctx.distinct_tables.insert(table_id, Vec::new());
                let table_id_term = ctx.arena.int(table_id as i64);
                let marker = ctx
                    .arena
                    .compound("$distinct_check", vec![args[0], table_id_term]);
                *goals = prepend_two(args[1], marker, rest);
            }
            TermData::Compound(functor, args) if functor.as_str() == "$distinct_check" && args.len() == 2 => {
                let table_id = match ctx.arena.get(args[1]) {
                    TermData::Int(i) => *i as u32,
                    _ => unreachable!("$distinct_check's second argument is always an Int"),
                };
                let value = snapshot(ctx.arena, env, args[0]);
                let table = ctx.distinct_tables.entry(table_id).or_default();
                if table.iter().any(|seen| *seen == value) {
                    return Ok(SolveStatus::Normal);
                }
                table.push(value);
                *goals = rest;
            }
            TermData::Compound(functor, args) if functor.as_str() == "format" && (args.len() == 1 || args.len() == 2) => {
                let arg_list = if args.len() == 2 { args[1] } else { ctx.arena.nil() };
                let text = ziglog_fmt::process_format(ctx.arena, env, args[0], arg_list)
                    .map_err(fmt_err)?;
                write_sink(ctx, &text)?;
                *goals = rest;
            }
            TermData::Compound(functor, args) if functor.as_str() == "write" && args.len() == 1 => {
                let text = ziglog_fmt::write_term(ctx.arena, env, args[0]);
                write_sink(ctx, &text)?;
                *goals = rest;
            }
            _ => return resolve_clause(ctx, resolved, rest, env, *depth, *scope_id, handler),
        }
    }
}

fn write_sink(ctx: &mut SolveCtx, text: &str) -> Result<()> {
    use std::io::Write as _;
    write!(ctx.sink, "{}", text).map_err(|e| ErrorKind::IoError(e.to_string()).into())
}

fn fmt_err(e: ziglog_fmt::FmtError) -> crate::error::Error {
    match e {
        ziglog_fmt::FmtError::TypeError(detail) => ErrorKind::TypeError(detail).into(),
        ziglog_fmt::FmtError::IoError(detail) => ErrorKind::IoError(detail).into(),
    }
}

fn split_first(goals: &mut Vec<TermId>) -> Option<(TermId, Vec<TermId>)> {
    if goals.is_empty() {
        return None;
    }
    let g = goals.remove(0);
    Some((g, std::mem::take(goals)))
}

fn prepend_one(item: TermId, mut rest: Vec<TermId>) -> Vec<TermId> {
    rest.insert(0, item);
    rest
}

fn prepend_two(a: TermId, b: TermId, mut rest: Vec<TermId>) -> Vec<TermId> {
    rest.insert(0, b);
    rest.insert(0, a);
    rest
}

fn term_as_scope(arena: &Arena, term: TermId) -> ScopeId {
    match arena.get(term) {
        TermData::Int(i) => *i as ScopeId,
        _ => unreachable!("$end_scope's arguments are always Int scope ids"),
    }
}

fn is_comparison(name: &str) -> bool {
    matches!(name, ">" | "<" | ">=" | "=<" | "=:=" | "=\\=")
}

fn compare(name: &str, a: Numeric, b: Numeric) -> bool {
    let (a, b) = (a.as_f64(), b.as_f64());
    match name {
        ">" => a > b,
        "<" => a < b,
        ">=" => a >= b,
        "=<" => a <= b,
        "=:=" => a == b,
        "=\\=" => a != b,
        _ => unreachable!(),
    }
}

struct ThenBranch {
    cond: TermId,
    then_goal: TermId,
}

/// Recognizes the special form `;(->(Cond,Then), Else)` (`spec.md` §4.3).
fn if_then_else_condition(arena: &Arena, env: &mut Environment, lhs: TermId) -> Option<ThenBranch> {
    let resolved = env.resolve(arena, lhs);
    match arena.get(resolved) {
        TermData::Compound(functor, args) if functor.as_str() == "->" && args.len() == 2 => {
            Some(ThenBranch {
                cond: args[0],
                then_goal: args[1],
            })
        }
        _ => None,
    }
}

/// Appends `s_in, s_out` to a callable's argument list — the runtime
/// mirror of `ziglog_dcg`'s head/non-terminal threading, used by
/// `phrase/2,3` (`spec.md` §4.5: "`phrase/2,3` calls at run time simply
/// mirror the expansion for calls rather than heads").
fn append_call_args(arena: &mut Arena, callee: TermId, s_in: TermId, s_out: TermId) -> TermId {
    match arena.get(callee).clone() {
        TermData::Atom(name) => arena.compound_sym(name, vec![s_in, s_out]),
        TermData::Compound(functor, args) => {
            let mut new_args: Vec<TermId> = args.to_vec();
            new_args.push(s_in);
            new_args.push(s_out);
            arena.compound_sym(functor, new_args)
        }
        _ => arena.compound("call", vec![callee, s_in, s_out]),
    }
}

/// A structural snapshot of a resolved term, used only by `distinct/2`'s
/// duplicate check. Unlike the clause index's value-hash (§4.2, tolerant of
/// collisions because the unifier filters survivors), this needs exact
/// equality: there is no unification step downstream to correct a
/// collision-induced false duplicate.
#[derive(Clone, PartialEq)]
enum DistinctValue {
    Var(Var),
    Atom(String),
    Int(i64),
    Float(f64),
    Str(Vec<u8>),
    Compound(String, Vec<DistinctValue>),
}

fn snapshot(arena: &Arena, env: &mut Environment, term: TermId) -> DistinctValue {
    let resolved = env.resolve(arena, term);
    match arena.get(resolved) {
        TermData::Var(v) => DistinctValue::Var(*v),
        TermData::Atom(name) => DistinctValue::Atom(name.as_str()),
        TermData::Int(i) => DistinctValue::Int(*i),
        // `distinct/2` NaN/-0.0 policy (`spec.md` §9 Open Question,
        // resolved in DESIGN.md): NaN never equals itself; -0.0 and 0.0
        // are treated as the same value. `PartialEq` on `f64` already
        // gives both of these for free (`NaN == NaN` is false, `-0.0 ==
        // 0.0` is true), so no normalization is needed here — unlike the
        // clause index's hash bucket, which must hash them consistently.
        TermData::Float(f) => DistinctValue::Float(*f),
        TermData::Str(bytes) => DistinctValue::Str(bytes.to_vec()),
        TermData::Compound(functor, args) => DistinctValue::Compound(
            functor.as_str(),
            args.iter().map(|&a| snapshot(arena, env, a)).collect(),
        ),
    }
}

/// Ordinary clause resolution (`spec.md` §4.3 "Clause resolution (ordinary
/// user predicate)").
fn resolve_clause(
    ctx: &mut SolveCtx,
    goal: TermId,
    rest: Vec<TermId>,
    env: &mut Environment,
    depth: usize,
    caller_scope: ScopeId,
    handler: &mut Handler<'_>,
) -> Result<SolveStatus> {
    let candidates = ctx.index.candidates(ctx.arena, env, goal);
    if candidates.is_empty() {
        return Ok(SolveStatus::Normal);
    }
    let deterministic = candidates.len() == 1;
    ctx.metrics.clause_resolutions += 1;

    for clause_id in candidates {
        ctx.metrics.candidate_attempts += 1;
        let clause = ctx.database.get(clause_id).clone();
        let new_scope = ctx.fresh_scope();

        let mut owned_branch;
        let branch_env: &mut Environment = if deterministic {
            env
        } else {
            owned_branch = env.clone();
            &mut owned_branch
        };

        let (fresh_head, fresh_body) = freshen_clause(ctx.arena, branch_env, &clause);

        if !unify(ctx.arena, branch_env, goal, fresh_head) {
            if deterministic {
                return Ok(SolveStatus::Normal);
            }
            ctx.metrics.backtracks += 1;
            continue;
        }

        let parent_term = ctx.arena.int(caller_scope as i64);
        let new_scope_term = ctx.arena.int(new_scope as i64);
        let end_scope = ctx
            .arena
            .compound("$end_scope", vec![new_scope_term, parent_term]);

        let mut new_goals = fresh_body;
        new_goals.push(end_scope);
        new_goals.extend(rest.iter().copied());

        let status = solve(ctx, new_goals, branch_env, depth + 1, new_scope, handler)?;
        match status {
            SolveStatus::Normal => {
                if deterministic {
                    return Ok(SolveStatus::Normal);
                }
                ctx.metrics.backtracks += 1;
            }
            SolveStatus::Cut(cs) if cs == new_scope => return Ok(SolveStatus::Normal),
            cut => return Ok(cut),
        }
    }
    Ok(SolveStatus::Normal)
}

/// Renames every variable in `clause`'s head and body with a suffix unique
/// to this activation (`spec.md` §4.3; identity scheme per §9: a flat
/// per-activation `Var` rather than string-suffixed names). Constants are
/// returned as-is — sharing a sub-`TermId` across activations is invisible
/// to semantics (`spec.md` §3).
fn freshen_clause(arena: &mut Arena, env: &mut Environment, clause: &Clause) -> (TermId, Vec<TermId>) {
    let mut mapping: HashMap<Var, TermId> = HashMap::new();
    let head = freshen_term(arena, env, clause.head, &mut mapping);
    let body = clause
        .body
        .iter()
        .map(|&g| freshen_term(arena, env, g, &mut mapping))
        .collect();
    (head, body)
}

fn freshen_term(
    arena: &mut Arena,
    env: &mut Environment,
    term: TermId,
    mapping: &mut HashMap<Var, TermId>,
) -> TermId {
    match arena.get(term).clone() {
        TermData::Var(v) => {
            if let Some(&fresh) = mapping.get(&v) {
                fresh
            } else {
                let name = env.var_name(v).as_str();
                let fresh = arena.fresh_var(env, &name);
                mapping.insert(v, fresh);
                fresh
            }
        }
        TermData::Compound(functor, args) => {
            let new_args: Vec<TermId> = args
                .iter()
                .map(|&a| freshen_term(arena, env, a, mapping))
                .collect();
            arena.compound_sym(functor, new_args)
        }
        _ => term,
    }
}
