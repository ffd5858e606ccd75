//! First-argument clause indexing (`spec.md` §3 "Clause index", component
//! C5, operations in §4.2).

use crate::clause::{Clause, ClauseId};
use crate::term::{Arena, TermData, TermId};
use itertools::Itertools;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

#[derive(Default)]
struct FunctorBucket {
    /// Fallback order: every clause with this functor/arity, insertion order.
    all: Vec<ClauseId>,
    /// Populated only for clauses whose first argument is ground at
    /// add-time (the clause template, not a runtime binding).
    by_first_arg_hash: HashMap<u64, Vec<ClauseId>>,
    /// Clauses whose first argument is a bare variable: must be tried for
    /// every query under this functor/arity.
    var_first_arg: Vec<ClauseId>,
}

/// Keyed by `"functor/arity"` (`spec.md` §3). Maintains, in addition, a
/// global insertion-ordered list (for the "goal is a variable" case) and the
/// unindexed bucket for clauses whose head is itself a variable.
#[derive(Default)]
pub struct ClauseIndex {
    buckets: HashMap<String, FunctorBucket>,
    /// Clauses whose head is a bare variable; tried for every goal
    /// regardless of functor/arity (`spec.md` §3, §4.2 rule set).
    unindexed: Vec<ClauseId>,
    /// Every clause, in insertion order — the candidate set when the goal
    /// itself is an unbound variable (§4.2 rule 1).
    all_clauses: Vec<ClauseId>,
}

fn value_hash(arena: &Arena, term: TermId) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    match arena.get(term) {
        TermData::Atom(name) => {
            0u8.hash(&mut hasher);
            name.as_str().hash(&mut hasher);
        }
        TermData::Int(i) => {
            1u8.hash(&mut hasher);
            i.hash(&mut hasher);
        }
        TermData::Float(f) => {
            2u8.hash(&mut hasher);
            // Normalize -0.0 to 0.0 so the two compare as the same bucket;
            // NaN hashes consistently but will never unify with anything
            // once candidates reach the unifier (`spec.md` §4.1).
            let normalized = if *f == 0.0 { 0.0 } else { *f };
            normalized.to_bits().hash(&mut hasher);
        }
        TermData::Str(bytes) => {
            3u8.hash(&mut hasher);
            bytes.hash(&mut hasher);
        }
        TermData::Compound(..) | TermData::Var(..) => {
            unreachable!("value_hash is only called on ground, non-compound terms")
        }
    }
    hasher.finish()
}

/// True for `Atom`/`Int`/`Float`/`Str` — the shapes `spec.md` §4.2 calls
/// "ground" for indexing purposes (a raw clause-template check, not a
/// runtime `resolve`).
fn is_ground_leaf(data: &TermData) -> bool {
    matches!(
        data,
        TermData::Atom(_) | TermData::Int(_) | TermData::Float(_) | TermData::Str(_)
    )
}

impl ClauseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `rule`'s head and appends `id` to the relevant buckets.
    /// Must be called once per clause, in the same order the clause was
    /// appended to the [`crate::clause::Database`], to keep "insertion
    /// order" meaningful.
    pub fn add(&mut self, id: ClauseId, rule: &Clause, arena: &Arena) {
        self.all_clauses.push(id);

        match arena.get(rule.head) {
            TermData::Var(_) => {
                self.unindexed.push(id);
            }
            TermData::Atom(name) => {
                let key = format!("{}/0", name);
                self.buckets.entry(key).or_default().all.push(id);
            }
            TermData::Compound(functor, args) => {
                let key = format!("{}/{}", functor, args.len());
                let bucket = self.buckets.entry(key).or_default();
                bucket.all.push(id);
                let first = args[0];
                let first_data = arena.get(first);
                if is_ground_leaf(first_data) {
                    let hash = value_hash(arena, first);
                    bucket.by_first_arg_hash.entry(hash).or_default().push(id);
                } else if matches!(first_data, TermData::Var(_)) {
                    bucket.var_first_arg.push(id);
                }
                // Else: first argument is itself a compound term. Neither
                // the hash bucket nor the var bucket applies; `all`
                // (already recorded above) is its only home.
            }
            // Ints/Floats/Strs are not valid clause heads; the embedder is
            // expected to only ever submit Atom/Compound heads per
            // `spec.md` §3 ("head is Atom or Compound"). Fall back to the
            // unindexed bucket rather than panicking on malformed input.
            _ => self.unindexed.push(id),
        }
    }

    /// `candidates(goal, E)` (`spec.md` §4.2). `goal` and `env` must
    /// already have `goal` resolved by the caller down to its outermost
    /// shape; the first argument (if any) is resolved here.
    pub fn candidates(
        &self,
        arena: &Arena,
        env: &mut crate::env::Environment,
        goal: TermId,
    ) -> Vec<ClauseId> {
        match arena.get(goal) {
            TermData::Var(_) => {
                // Rule 1: every clause in the database. `all_clauses` is
                // already the full union (`add` pushes every clause id here,
                // including variable-headed ones, in addition to
                // `unindexed`) — chaining `unindexed` again would duplicate
                // those entries.
                self.all_clauses.clone()
            }
            TermData::Atom(name) => {
                let key = format!("{}/0", name);
                let bucket_hits = self.buckets.get(&key).map(|b| b.all.as_slice()).unwrap_or(&[]);
                bucket_hits.iter().chain(self.unindexed.iter()).copied().collect()
            }
            TermData::Compound(functor, args) => {
                let key = format!("{}/{}", functor, args.len());
                let hits: Vec<ClauseId> = match self.buckets.get(&key) {
                    None => Vec::new(),
                    Some(bucket) => {
                        let first_resolved = env.resolve(arena, args[0]);
                        if is_ground_leaf(arena.get(first_resolved)) {
                            let hash = value_hash(arena, first_resolved);
                            let hashed = bucket
                                .by_first_arg_hash
                                .get(&hash)
                                .map(|v| v.as_slice())
                                .unwrap_or(&[]);
                            hashed.iter().chain(bucket.var_first_arg.iter()).copied().collect_vec()
                        } else {
                            bucket.all.clone()
                        }
                    }
                };
                hits.into_iter().chain(self.unindexed.iter().copied()).collect()
            }
            _ => self.unindexed.clone(),
        }
    }
}
