//! `format/1,2` directive processing (`spec.md` §4.6, the other half of
//! component C8).

use crate::error::{FmtError, Result};
use crate::writer::{format_float, write_term};
use ziglog_ir::{Arena, Environment, TermData, TermId};

/// Extracts the format-string text from an `Atom` or `Str` term.
fn format_text(arena: &Arena, env: &mut Environment, fmt: TermId) -> Result<String> {
    let resolved = env.resolve(arena, fmt);
    match arena.get(resolved) {
        TermData::Atom(name) => Ok(name.as_str()),
        TermData::Str(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        _ => Err(FmtError::TypeError(
            "format/1,2's first argument must be an Atom or Str".into(),
        )),
    }
}

/// Walks a (supposedly proper) Prolog list, collecting its elements.
/// Stops, rather than erroring, the first time the spine isn't a cons cell
/// — `format/2`'s argument list is produced internally by the solver, so a
/// malformed spine here indicates a caller bug, not a logic failure to
/// report through this sink.
fn collect_list(arena: &Arena, env: &mut Environment, list: TermId) -> Vec<TermId> {
    let mut out = Vec::new();
    let mut current = env.resolve(arena, list);
    loop {
        match arena.get(current) {
            TermData::Compound(functor, args) if functor.as_str() == "." && args.len() == 2 => {
                out.push(args[0]);
                current = env.resolve(arena, args[1]);
            }
            _ => break,
        }
    }
    out
}

/// `format(FmtString, Args)` (`spec.md` §4.6). `args` should be `Engine`'s
/// `nil()` for the one-argument form.
pub fn process_format(
    arena: &Arena,
    env: &mut Environment,
    fmt: TermId,
    args: TermId,
) -> Result<String> {
    let text = format_text(arena, env, fmt)?;
    let values = collect_list(arena, env, args);
    let mut values = values.into_iter();
    let mut out = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('w') => {
                let t = next_arg(&mut values)?;
                out.push_str(&write_term(arena, env, t));
            }
            Some('d') => {
                let t = next_arg(&mut values)?;
                let resolved = env.resolve(arena, t);
                match arena.get(resolved) {
                    TermData::Int(i) => out.push_str(&i.to_string()),
                    _ => return Err(FmtError::TypeError("~d requires an Int argument".into())),
                }
            }
            Some('f') => {
                let t = next_arg(&mut values)?;
                let resolved = env.resolve(arena, t);
                let f = match arena.get(resolved) {
                    TermData::Int(i) => *i as f64,
                    TermData::Float(f) => *f,
                    _ => {
                        return Err(FmtError::TypeError(
                            "~f requires a numeric argument".into(),
                        ))
                    }
                };
                out.push_str(&format_float(f));
            }
            Some('a') => {
                let t = next_arg(&mut values)?;
                let resolved = env.resolve(arena, t);
                match arena.get(resolved) {
                    TermData::Atom(name) => out.push_str(&name.as_str()),
                    _ => return Err(FmtError::TypeError("~a requires an Atom argument".into())),
                }
            }
            Some('s') => {
                let t = next_arg(&mut values)?;
                let resolved = env.resolve(arena, t);
                match arena.get(resolved) {
                    TermData::Str(bytes) => out.push_str(&String::from_utf8_lossy(bytes)),
                    TermData::Atom(name) => out.push_str(&name.as_str()),
                    _ => {
                        return Err(FmtError::TypeError(
                            "~s requires a Str or Atom argument".into(),
                        ))
                    }
                }
            }
            Some('n') => out.push('\n'),
            Some('~') => out.push('~'),
            // Conservative unknown-directive policy: copy literally.
            Some(other) => {
                out.push('~');
                out.push(other);
            }
            None => out.push('~'),
        }
    }
    Ok(out)
}

fn next_arg(values: &mut impl Iterator<Item = TermId>) -> Result<TermId> {
    values
        .next()
        .ok_or_else(|| FmtError::TypeError("format directive has no matching argument".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn w_directive_writes_any_term() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let fmt = arena.string(b"value: ~w~n".to_vec());
        let val = arena.int(42);
        let args = arena.list(vec![val]);
        let out = process_format(&arena, &mut env, fmt, args).unwrap();
        assert_eq!(out, "value: 42\n");
    }

    #[test]
    fn unknown_directive_is_copied_literally() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let fmt = arena.string(b"~q".to_vec());
        let args = arena.nil();
        let out = process_format(&arena, &mut env, fmt, args).unwrap();
        assert_eq!(out, "~q");
    }

    #[test]
    fn insufficient_arguments_is_an_error() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let fmt = arena.string(b"~w".to_vec());
        let args = arena.nil();
        assert!(process_format(&arena, &mut env, fmt, args).is_err());
    }

    #[test]
    fn tilde_tilde_is_a_literal_tilde() {
        let mut arena = Arena::new();
        let mut env = Environment::new();
        let fmt = arena.string(b"100~~".to_vec());
        let args = arena.nil();
        let out = process_format(&arena, &mut env, fmt, args).unwrap();
        assert_eq!(out, "100~");
    }
}
