//! This crate's slice of the error taxonomy in `spec.md` §7: the two kinds
//! that can originate from the write sink. `ziglog-solve` folds these into
//! its own `ErrorKind` at the call sites that invoke `write`/`format`.

use std::fmt;

#[derive(Debug, Clone)]
pub enum FmtError {
    TypeError(String),
    IoError(String),
}

impl fmt::Display for FmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmtError::TypeError(detail) => write!(f, "type error: {}", detail),
            FmtError::IoError(detail) => write!(f, "I/O error: {}", detail),
        }
    }
}

impl std::error::Error for FmtError {}

pub type Result<T> = std::result::Result<T, FmtError>;
