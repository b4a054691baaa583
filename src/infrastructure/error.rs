//! Infrastructure-level errors (wraps application errors)

use std::path::Path;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::traits::FetchError;

/// Errors from wiring up the document source and touching the config location.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot set up document source: {0}")]
    Source(#[source] FetchError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// I/O error naming the action and the file involved.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context: format!("{action} {}", path.display()),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
