//! Domain layer: clade trees and the pure operations on them
//!
//! This layer is independent of external concerns (no network, no CLI, no config loading).

pub mod arena;
pub mod diagnostics;
pub mod display;
pub mod entities;
pub mod error;
pub mod locator;
pub mod markup;
pub mod matcher;
pub mod newick;
pub mod query;

pub use arena::{CladeNode, CladeTree};
pub use diagnostics::{Diagnostics, PageKind, Warning};
pub use display::TextTreeConvert;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use query::TreeQuery;
