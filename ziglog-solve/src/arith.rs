//! The arithmetic evaluator (`spec.md` §4.4, component C4): a recursive
//! expression evaluator over a two-member numeric tower.

use crate::error::{ErrorKind, Result};
use ziglog_ir::{Arena, Environment, TermData, TermId};

/// `Numeric = Int(i64) | Float(f64)` (`spec.md` §4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    pub fn into_term(self, arena: &mut Arena) -> TermId {
        match self {
            Numeric::Int(i) => arena.int(i),
            Numeric::Float(f) => arena.float(f),
        }
    }
}

/// `evaluate(expr, E) -> Numeric` (`spec.md` §4.4).
pub fn evaluate(arena: &Arena, env: &mut Environment, expr: TermId) -> Result<Numeric> {
    let resolved = env.resolve(arena, expr);
    match arena.get(resolved) {
        TermData::Int(i) => Ok(Numeric::Int(*i)),
        TermData::Float(f) => Ok(Numeric::Float(*f)),
        TermData::Var(_) => Err(ErrorKind::Uninstantiated.into()),
        TermData::Str(_) => Err(ErrorKind::TypeError(
            "a string cannot appear in an arithmetic expression".into(),
        )
        .into()),
        TermData::Atom(name) => match name.as_str().as_str() {
            "nan" => Ok(Numeric::Float(f64::NAN)),
            "inf" => Ok(Numeric::Float(f64::INFINITY)),
            other => Err(ErrorKind::UnknownOperator(other.to_string(), 0).into()),
        },
        TermData::Compound(functor, args) => {
            let name = functor.as_str();
            eval_compound(arena, env, &name, args)
        }
    }
}

fn eval_compound(
    arena: &Arena,
    env: &mut Environment,
    name: &str,
    args: &[TermId],
) -> Result<Numeric> {
    match (name, args.len()) {
        ("-", 1) => Ok(negate(evaluate(arena, env, args[0])?)),
        ("abs", 1) => Ok(abs(evaluate(arena, env, args[0])?)),
        ("sign", 1) => Ok(sign(evaluate(arena, env, args[0])?)),
        ("+", 2) => Ok(add(
            evaluate(arena, env, args[0])?,
            evaluate(arena, env, args[1])?,
        )),
        ("-", 2) => Ok(sub(
            evaluate(arena, env, args[0])?,
            evaluate(arena, env, args[1])?,
        )),
        ("*", 2) => Ok(mul(
            evaluate(arena, env, args[0])?,
            evaluate(arena, env, args[1])?,
        )),
        ("/", 2) => {
            let a = evaluate(arena, env, args[0])?;
            let b = evaluate(arena, env, args[1])?;
            Ok(Numeric::Float(a.as_f64() / b.as_f64()))
        }
        ("//", 2) => int_op(arena, env, args, "//", checked_int_div),
        ("div", 2) => int_op(arena, env, args, "div", |x, y| {
            checked_nonzero(y)?;
            Ok(floor_div(x, y))
        }),
        ("mod", 2) => int_op(arena, env, args, "mod", |x, y| {
            checked_nonzero(y)?;
            Ok(x - floor_div(x, y) * y)
        }),
        ("rem", 2) => int_op(arena, env, args, "rem", |x, y| {
            checked_nonzero(y)?;
            Ok(x.wrapping_rem(y))
        }),
        ("min", 2) => Ok(min_max(
            evaluate(arena, env, args[0])?,
            evaluate(arena, env, args[1])?,
            true,
        )),
        ("max", 2) => Ok(min_max(
            evaluate(arena, env, args[0])?,
            evaluate(arena, env, args[1])?,
            false,
        )),
        _ => Err(ErrorKind::UnknownOperator(name.to_string(), args.len()).into()),
    }
}

fn int_op(
    arena: &Arena,
    env: &mut Environment,
    args: &[TermId],
    op_name: &str,
    f: impl FnOnce(i64, i64) -> Result<i64>,
) -> Result<Numeric> {
    let a = evaluate(arena, env, args[0])?;
    let b = evaluate(arena, env, args[1])?;
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => Ok(Numeric::Int(f(x, y)?)),
        _ => Err(ErrorKind::TypeError(format!("`{}` requires both operands to be Int", op_name)).into()),
    }
}

fn checked_nonzero(y: i64) -> Result<()> {
    if y == 0 {
        Err(ErrorKind::TypeError("division by zero".into()).into())
    } else {
        Ok(())
    }
}

fn checked_int_div(x: i64, y: i64) -> Result<i64> {
    checked_nonzero(y)?;
    Ok(x.wrapping_div(y))
}

/// Floored division (toward −∞), as `div` requires.
fn floor_div(x: i64, y: i64) -> i64 {
    let q = x.wrapping_div(y);
    let r = x.wrapping_rem(y);
    if r != 0 && (r < 0) != (y < 0) {
        q - 1
    } else {
        q
    }
}

fn negate(x: Numeric) -> Numeric {
    match x {
        Numeric::Int(i) => Numeric::Int(i.wrapping_neg()),
        Numeric::Float(f) => Numeric::Float(-f),
    }
}

fn abs(x: Numeric) -> Numeric {
    match x {
        Numeric::Int(i) => Numeric::Int(i.wrapping_abs()),
        Numeric::Float(f) => Numeric::Float(f.abs()),
    }
}

fn sign(x: Numeric) -> Numeric {
    match x {
        Numeric::Int(i) => Numeric::Int(i.signum()),
        Numeric::Float(f) => Numeric::Float(if f.is_nan() {
            f64::NAN
        } else if f > 0.0 {
            1.0
        } else if f < 0.0 {
            -1.0
        } else {
            0.0
        }),
    }
}

fn add(a: Numeric, b: Numeric) -> Numeric {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => Numeric::Int(x.wrapping_add(y)),
        _ => Numeric::Float(a.as_f64() + b.as_f64()),
    }
}

fn sub(a: Numeric, b: Numeric) -> Numeric {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => Numeric::Int(x.wrapping_sub(y)),
        _ => Numeric::Float(a.as_f64() - b.as_f64()),
    }
}

fn mul(a: Numeric, b: Numeric) -> Numeric {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => Numeric::Int(x.wrapping_mul(y)),
        _ => Numeric::Float(a.as_f64() * b.as_f64()),
    }
}

fn min_max(a: Numeric, b: Numeric, want_min: bool) -> Numeric {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => {
            Numeric::Int(if want_min { x.min(y) } else { x.max(y) })
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            Numeric::Float(if want_min { x.min(y) } else { x.max(y) })
        }
    }
}
