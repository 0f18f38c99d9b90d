//! Retrying series fetch orchestration.
//!
//! `SeriesFetcher` wraps a transport with a bounded retry loop and hands the
//! raw response to the normalizer. Only transport failures are retried;
//! a structurally bad response will not get better on a second request, so
//! malformed-data errors propagate immediately.

use std::thread;
use std::time::Duration;

use crate::data::normalize::{NormalizedSeries, normalize_series};
use crate::data::{RawTable, SeriesTransport};
use crate::domain::{DateSpan, SeriesKey};
use crate::error::{AppError, TransportError};

/// Retry budget for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            pause: Duration::from_secs(1),
        }
    }
}

pub struct SeriesFetcher<T: SeriesTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: SeriesTransport> SeriesFetcher<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Fetch and normalize one series.
    pub fn fetch(&self, key: &SeriesKey, span: &DateSpan) -> Result<NormalizedSeries, AppError> {
        let raw = self.fetch_raw_with_retry(key, span)?;
        normalize_series(
            &key.code,
            &raw,
            self.transport.date_aliases(),
            self.transport.value_aliases(),
        )
    }

    /// Like `fetch`, but maps the "no data" class of malformed results to
    /// `Ok(None)`. Sweeps over many series use this to treat empty series as
    /// valid absence rather than an error.
    pub fn fetch_optional(
        &self,
        key: &SeriesKey,
        span: &DateSpan,
    ) -> Result<Option<NormalizedSeries>, AppError> {
        match self.fetch(key, span) {
            Ok(normalized) => Ok(Some(normalized)),
            Err(AppError::MalformedData { kind, .. }) if kind.is_empty_data() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn fetch_raw_with_retry(&self, key: &SeriesKey, span: &DateSpan) -> Result<RawTable, AppError> {
        let attempts = self.retry.attempts.max(1);
        let mut last: Option<TransportError> = None;

        for attempt in 1..=attempts {
            match self.transport.fetch_raw(&key.code, span) {
                Ok(raw) => return Ok(raw),
                Err(err) => {
                    last = Some(err);
                    if attempt < attempts {
                        thread::sleep(self.retry.pause);
                    }
                }
            }
        }

        let cause = last.unwrap_or_else(|| TransportError::new("no attempt was made"));
        Err(AppError::FetchExhausted {
            key: key.code.clone(),
            attempts,
            cause,
        })
    }
}
