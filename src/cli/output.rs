//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Trees and config go to stdout, everything else to stderr.

use std::path::Path;

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow(), msg);
}

/// Report a file written by the tool
pub fn written(path: &Path) {
    eprintln!("{} {}", "wrote".green(), path.display());
}

/// Heading in front of each tree when a page holds several
pub fn tree_header(n: usize, total: usize) {
    println!("{}", format!("tree {n}/{total}").cyan().bold());
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
