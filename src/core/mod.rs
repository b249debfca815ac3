//! Core processing modules
//!
//! Transcript normalization and spoken number resolution shared by the
//! command parser.

pub mod numbers;
pub mod text_normalizer;
