//! FRED transport (St. Louis Fed `series/observations` endpoint).
//!
//! Series are addressed by a short mnemonic (`FEDFUNDS`, `CPIAUCSL`). The
//! endpoint returns JSON observations which are lowered to the same
//! `RawTable` shape the normalizer sees from every provider.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::{RawTable, SeriesTransport};
use crate::domain::DateSpan;
use crate::error::TransportError;

const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const USER_AGENT: &str = "econ-suite/0.1";

pub struct FredClient {
    http: Client,
    api_key: String,
}

impl FredClient {
    /// The API key is resolved by the caller (CLI/TUI layer); this
    /// constructor only passes it through.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

impl SeriesTransport for FredClient {
    fn fetch_raw(&self, code: &str, span: &DateSpan) -> Result<RawTable, TransportError> {
        let mut req = self.http.get(OBSERVATIONS_URL).query(&[
            ("series_id", code),
            ("api_key", &self.api_key),
            ("file_type", "json"),
            ("sort_order", "asc"),
        ]);
        if let Some(start) = &span.start {
            req = req.query(&[("observation_start", start)]);
        }
        if let Some(end) = &span.end {
            req = req.query(&[("observation_end", end)]);
        }
        req = req.header(reqwest::header::USER_AGENT, USER_AGENT);

        let resp = req
            .send()
            .map_err(|e| TransportError::new(format!("request for {code} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::new(format!(
                "unexpected status {status} for {code}"
            )));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| TransportError::new(format!("failed to parse response for {code}: {e}")))?;

        Ok(raw_table_from_observations(body))
    }
}

fn raw_table_from_observations(body: ObservationsResponse) -> RawTable {
    RawTable {
        headers: vec!["date".to_string(), "value".to_string()],
        rows: body
            .observations
            .into_iter()
            .map(|obs| vec![obs.date, obs.value])
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::{DATE_ALIASES, VALUE_ALIASES, normalize_series};

    #[test]
    fn observations_lower_to_raw_table() {
        let body = ObservationsResponse {
            observations: vec![
                Observation {
                    date: "2024-01-01".to_string(),
                    value: "5.33".to_string(),
                },
                Observation {
                    date: "2024-02-01".to_string(),
                    value: ".".to_string(),
                },
            ],
        };
        let raw = raw_table_from_observations(body);
        assert_eq!(raw.headers, vec!["date", "value"]);
        assert_eq!(raw.rows.len(), 2);

        // The lowered table satisfies the shared normalizer contract; the
        // missing-value marker row is dropped there.
        let n = normalize_series("FEDFUNDS", &raw, &DATE_ALIASES, &VALUE_ALIASES).unwrap();
        assert_eq!(n.series.len(), 1);
        assert_eq!(n.rows_dropped, 1);
    }
}
