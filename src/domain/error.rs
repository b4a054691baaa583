//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed input to pure tree operations.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("newick syntax error at position {position}: {message}")]
    Newick { position: usize, message: String },

    #[error("invalid tree selector: {0}")]
    InvalidSelector(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
