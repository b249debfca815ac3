//! Utility modules

pub mod fuzzy;

pub use fuzzy::{best_match, search, FileMatch};
