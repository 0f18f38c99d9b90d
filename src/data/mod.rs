//! Data acquisition.
//!
//! - provider transports (`ecb`, `fred`) behind the `SeriesTransport` trait
//! - raw response normalization (`normalize`)
//! - the retrying fetch orchestrator (`fetch`)

pub mod ecb;
pub mod fetch;
pub mod fred;
pub mod normalize;

use crate::domain::DateSpan;
use crate::error::TransportError;

/// A loosely-structured tabular provider response.
///
/// Column names and casing are not guaranteed; the normalizer resolves the
/// date and value columns by case-insensitive alias matching. Cells are kept
/// as strings so provider quirks (decimal commas, `.` missing markers) are
/// handled in exactly one place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Blocking retrieval of one series' raw response.
///
/// Implementations own the wire protocol (query keys, endpoints, body
/// decoding); the contract to the rest of the pipeline is only "rows with a
/// date-like and a value-like column". Start/end bounds are forwarded
/// verbatim; their inclusive semantics are provider-defined.
pub trait SeriesTransport {
    fn fetch_raw(&self, code: &str, span: &DateSpan) -> Result<RawTable, TransportError>;

    /// Date-column aliases accepted from this provider, checked in order.
    fn date_aliases(&self) -> &'static [&'static str] {
        &normalize::DATE_ALIASES
    }

    /// Value-column aliases accepted from this provider, checked in order.
    fn value_aliases(&self) -> &'static [&'static str] {
        &normalize::VALUE_ALIASES
    }
}
