//! The canonical term writer (`spec.md` §4.7, half of component C8).
//!
//! Solution values appear in both the REPL and the test harness, so the
//! rendering rules below are load-bearing, not cosmetic.

use itertools::Itertools;
use std::fmt::Write as _;
use ziglog_ir::{Arena, Environment, Sym, TermData, TermId};

/// Functors that render infix when applied to exactly two arguments.
const INFIX_FUNCTORS: &[&str] = &[
    "+", "-", "*", "/", ">", "<", ">=", "=<", "\\=", "=", "is", ";",
];

/// Renders `term`'s current value under `env` the way the engine's own
/// solution handler and REPL do. Resolves at every level, so passing an
/// unresolved term with bound subterms is fine — there is no need to
/// pre-copy with `Engine::copy_resolved` first.
pub fn write_term(arena: &Arena, env: &mut Environment, term: TermId) -> String {
    let mut out = String::new();
    write_term_into(arena, env, term, &mut out);
    out
}

fn write_term_into(arena: &Arena, env: &mut Environment, term: TermId, out: &mut String) {
    let resolved = env.resolve(arena, term);
    match arena.get(resolved) {
        TermData::Var(v) => {
            // Unbound: the source's convention is to print a generated
            // name derived from the variable's identity, not its
            // (possibly shared, pre-freshening) surface name.
            let _ = write!(out, "_G{}", v.as_u32());
        }
        TermData::Atom(name) => write_atom(name, out),
        TermData::Int(i) => {
            let _ = write!(out, "{}", i);
        }
        TermData::Float(f) => out.push_str(&format_float(*f)),
        TermData::Str(bytes) => {
            out.push('"');
            out.push_str(&String::from_utf8_lossy(bytes));
            out.push('"');
        }
        TermData::Compound(functor, args) if functor.as_str() == "." && args.len() == 2 => {
            write_list(arena, env, resolved, out)
        }
        TermData::Compound(functor, args) if args.len() == 2 && is_infix(functor) => {
            write_term_into(arena, env, args[0], out);
            let _ = write!(out, " {} ", functor);
            write_term_into(arena, env, args[1], out);
        }
        TermData::Compound(functor, args) => {
            write_atom(functor, out);
            out.push('(');
            let rendered = args
                .iter()
                .map(|&arg| {
                    let mut piece = String::new();
                    write_term_into(arena, env, arg, &mut piece);
                    piece
                })
                .join(", ");
            out.push_str(&rendered);
            out.push(')');
        }
    }
}

fn is_infix(functor: &Sym) -> bool {
    let name = functor.as_str();
    INFIX_FUNCTORS.contains(&name.as_str())
}

fn write_atom(name: &Sym, out: &mut String) {
    let s = name.as_str();
    if is_bare_identifier(&s) {
        out.push_str(&s);
    } else {
        out.push('\'');
        for c in s.chars() {
            if c == '\'' {
                out.push('\'');
                out.push('\'');
            } else {
                out.push(c);
            }
        }
        out.push('\'');
    }
}

fn is_bare_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `Compound(".", [H,T])` renders as `[H, ..., last | tail]`, bottoming out
/// at `Atom("[]")`. An improper tail (anything else once the cons chain
/// ends) is rendered after a `|`.
fn write_list(arena: &Arena, env: &mut Environment, list: TermId, out: &mut String) {
    out.push('[');
    let mut current = list;
    let mut first = true;
    loop {
        let resolved = env.resolve(arena, current);
        match arena.get(resolved) {
            TermData::Compound(functor, args) if functor.as_str() == "." && args.len() == 2 => {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                write_term_into(arena, env, args[0], out);
                current = args[1];
            }
            TermData::Atom(name) if name.as_str() == "[]" => break,
            _ => {
                out.push_str(" | ");
                write_term_into(arena, env, resolved, out);
                break;
            }
        }
    }
    out.push(']');
}

/// Float rendering rules (`spec.md` §4.7): `+Inf -> 1.0Inf`, `-Inf ->
/// -1.0Inf`, `NaN -> 1.5NaN`; whole-valued floats with magnitude <= 10^15
/// write as `n.0`; everything else uses its shortest round-tripping form.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "1.5NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 {
            "1.0Inf".to_string()
        } else {
            "-1.0Inf".to_string()
        };
    }
    if f.fract() == 0.0 && f.abs() <= 1e15 {
        return format!("{:.1}", f);
    }
    let s = format!("{}", f);
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_quote_only_when_not_bare_identifiers() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let plain = arena.atom("john");
        let needs_quote = arena.atom("Capital");
        assert_eq!(write_term(&arena, &mut env, plain), "john");
        assert_eq!(write_term(&arena, &mut env, needs_quote), "'Capital'");
    }

    #[test]
    fn special_floats_render_per_spec() {
        assert_eq!(format_float(f64::INFINITY), "1.0Inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-1.0Inf");
        assert_eq!(format_float(f64::NAN), "1.5NaN");
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(3.5), "3.5");
    }

    #[test]
    fn lists_render_bracketed() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let one = arena.int(1);
        let two = arena.int(2);
        let three = arena.int(3);
        let list = arena.list(vec![one, two, three]);
        assert_eq!(write_term(&arena, &mut env, list), "[1, 2, 3]");
    }

    #[test]
    fn improper_list_renders_with_bar() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let one = arena.int(1);
        let tail_var = arena.fresh_var(&mut env, "T");
        let list = arena.cons(one, tail_var);
        let rendered = write_term(&arena, &mut env, list);
        assert!(rendered.starts_with("[1 | _G"));
    }

    #[test]
    fn infix_functors_render_between_operands() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let x = arena.int(1);
        let y = arena.int(2);
        let sum = arena.compound("+", vec![x, y]);
        assert_eq!(write_term(&arena, &mut env, sum), "1 + 2");
    }

    #[test]
    fn generic_compounds_render_as_functor_applications() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let john = arena.atom("john");
        let mary = arena.atom("mary");
        let t = arena.compound("parent", vec![john, mary]);
        ziglog_macros::assert_rendered_eq("parent(john, mary)", &write_term(&arena, &mut env, t));
    }
}
