//! Small macros shared across the `ziglog-*` crates: a trace/debug facility
//! gated by an environment variable (the teacher crate's own substitute for
//! a logging framework) and a helper for declaring `Copy` newtype indices.

#[macro_use]
extern crate lazy_static;

use itertools::Itertools;
use std::env;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};

lazy_static! {
    /// Set once from `ZIGLOG_DEBUG` on first use. `0` = off, `1` = on.
    static ref TRACE_ENABLED: bool = match env::var("ZIGLOG_DEBUG") {
        Ok(v) => v != "0" && !v.is_empty(),
        Err(_) => false,
    };
}

/// Current nesting depth, bumped by [`trace_heading!`] so nested traces
/// indent like the teacher's own `debug_heading!` macro.
pub static TRACE_INDENT: AtomicUsize = AtomicUsize::new(0);

#[doc(hidden)]
pub fn trace_enabled() -> bool {
    *TRACE_ENABLED
}

#[doc(hidden)]
pub fn trace_indent() -> usize {
    TRACE_INDENT.load(Ordering::Relaxed)
}

/// Print a diagnostic line to stderr if `ZIGLOG_DEBUG` is set. A no-op
/// (and the format arguments are never evaluated) otherwise.
#[macro_export]
macro_rules! ziglog_trace {
    ($($arg:tt)*) => {
        if $crate::trace_enabled() {
            let indent = $crate::trace_indent();
            eprintln!("{:indent$}{}", "", format!($($arg)*), indent = indent * 2);
        }
    };
}

/// Like [`ziglog_trace!`], but indents everything traced inside `$body` one
/// level deeper. Mirrors the teacher's `debug_heading!` macro, used at
/// clause-resolution and probe entry points so nested solver activity reads
/// as a tree in the trace output.
#[macro_export]
macro_rules! ziglog_trace_heading {
    ($fmt:expr $(, $arg:expr)* => $body:expr) => {{
        $crate::ziglog_trace!($fmt $(, $arg)*);
        $crate::TRACE_INDENT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let result = $body;
        $crate::TRACE_INDENT.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
        result
    }};
}

/// Declares a `Copy` newtype wrapping a `u32` index, with the boilerplate
/// (`Debug`, equality, `From<u32>`/`as u32` style accessors) that every
/// arena-relative id in `ziglog-ir` needs. Mirrors chalk's own
/// `index_struct!` convention for id types.
#[macro_export]
macro_rules! index_struct {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($inner_vis:vis u32);) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name($inner_vis u32);

        impl $name {
            #[inline]
            $vis fn from_u32(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            $vis fn as_u32(self) -> u32 {
                self.0
            }

            #[inline]
            $vis fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

/// Compares two rendered-term or trace strings line-by-line (trimming each
/// line first, so incidental indentation doesn't fail a test), and panics
/// with a unified diff rather than Rust's default full-string dump when they
/// disagree. Used across the writer/format/solver test suites.
pub fn assert_rendered_eq(expected: &str, actual: &str) {
    let expected_trimmed: String = expected.lines().map(|l| l.trim()).intersperse("\n").collect();
    let actual_trimmed: String = actual.lines().map(|l| l.trim()).intersperse("\n").collect();

    if expected_trimmed == actual_trimmed {
        return;
    }

    let diff = diff::lines(&expected_trimmed, &actual_trimmed);
    let diff = diff.iter().skip_while(|r| matches!(r, diff::Result::Both(..)));

    let mut final_diff = String::new();
    let mut accumulator = vec![];
    for result in diff {
        let (prefix, s) = match result {
            diff::Result::Both(a, _) => {
                accumulator.push(a);
                continue;
            }
            diff::Result::Left(a) => ("- ", a),
            diff::Result::Right(a) => ("+ ", a),
        };
        for l in accumulator.drain(..) {
            let _ = writeln!(&mut final_diff, "  {}", l);
        }
        let _ = writeln!(&mut final_diff, "{}{}", prefix, s);
    }

    panic!("expected did not match actual, diff:\n{}", final_diff);
}

#[cfg(test)]
mod tests {
    index_struct! {
        struct Demo(u32);
    }

    #[test]
    fn index_struct_roundtrips() {
        let d = Demo::from_u32(7);
        assert_eq!(d.as_u32(), 7);
        assert_eq!(d.as_usize(), 7usize);
    }

    #[test]
    fn trace_macro_does_not_panic_when_disabled() {
        ziglog_trace!("value = {}", 1 + 1);
        let result = ziglog_trace_heading!("entering scope {}", 3 => { 1 + 1 });
        assert_eq!(result, 2);
    }

    #[test]
    fn assert_rendered_eq_ignores_incidental_whitespace() {
        super::assert_rendered_eq("  a\n  b  ", "a\nb");
    }

    #[test]
    #[should_panic(expected = "diff")]
    fn assert_rendered_eq_panics_with_a_diff_on_mismatch() {
        super::assert_rendered_eq("a\nb", "a\nc");
    }
}
