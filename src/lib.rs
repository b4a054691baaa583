//! wikiclade: Wikipedia cladograms to Newick trees
//!
//! Layers, innermost first:
//! - `domain`: clade trees, table location, name matching, Newick codec
//! - `application`: tree building and cross-page stitching, tree files
//! - `infrastructure`: document retrieval and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
