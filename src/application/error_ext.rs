//! Path context for I/O errors on tree and config files.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Converts `io::Result` into `ApplicationResult`, naming the file involved.
pub trait IoResultExt<T> {
    /// ```ignore
    /// fs::read_to_string(path).with_path_context("read tree", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{action} {}", path.display()),
            source: Box::new(e),
        })
    }
}
