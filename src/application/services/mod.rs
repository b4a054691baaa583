//! Application services

pub mod clade;

pub use clade::CladeService;
