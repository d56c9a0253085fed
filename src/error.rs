//! Typed errors for the narrow set of conditions that are genuine
//! programming-contract violations, rather than ordinary
//! "this line can't be debugged" results (which are plain `Option::None`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShaderDebugError {
    #[error("line numbers are 1-based; got {0}")]
    InvalidLine(usize),
    #[error("file path must not be empty when the debug line is locked")]
    EmptyFilePath,
}
