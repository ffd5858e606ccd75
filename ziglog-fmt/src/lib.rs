//! The format/write sink (`spec.md` §4.6–§4.7, component C8): the canonical
//! term writer and the `format/1,2` directive processor that sits on top of
//! it.

pub mod error;
pub mod format;
pub mod writer;

pub use error::FmtError;
pub use format::process_format;
pub use writer::{format_float, write_term};
