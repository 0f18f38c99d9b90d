//! Input/output helpers.
//!
//! - wide-table CSV export with fixed decimal precision (`export`)

pub mod export;

pub use export::*;
