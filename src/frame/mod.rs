//! Table assembly.
//!
//! - multi-series wide collection (`collect`)
//! - two-dimensional tidy sweeps (`tidy`)
//! - tidy-to-wide pivots with deterministic column order (`pivot`)

pub mod collect;
pub mod pivot;
pub mod tidy;

pub use collect::*;
pub use pivot::*;
pub use tidy::*;

/// Per-series progress callback for long fetch loops.
///
/// The CLI wires this to stdout, the TUI to its status line, tests to a
/// no-op. Core code never prints directly.
pub type Progress<'a> = &'a mut dyn FnMut(&str);
