//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - canonical series shapes (`NumericSeries`, `TidyObservation`, `WideTable`)
//! - fetch parameters (`SeriesKey`, `DateSpan`, `Measure`)
//! - the configured series registries (`registry`)

pub mod registry;
pub mod types;

pub use types::*;
