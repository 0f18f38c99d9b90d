//! ECB Statistical Data Warehouse transport.
//!
//! Series are addressed by a compound key (`ICP.M.U2.N.000000.4.ANR` style);
//! the first component names the dataflow, the rest the series within it.
//! The CSV export sometimes carries descriptive preamble lines before the
//! actual header row, so the body is scanned for the `TIME_PERIOD` header
//! before parsing.

use reqwest::blocking::Client;

use crate::data::{RawTable, SeriesTransport};
use crate::domain::DateSpan;
use crate::error::TransportError;

const SDW_DATA_URL: &str = "https://data-api.ecb.europa.eu/service/data";
const USER_AGENT: &str = "econ-suite/0.1";

pub struct EcbClient {
    http: Client,
}

impl EcbClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for EcbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesTransport for EcbClient {
    fn fetch_raw(&self, code: &str, span: &DateSpan) -> Result<RawTable, TransportError> {
        let (flow, series) = code.split_once('.').ok_or_else(|| {
            TransportError::new(format!("invalid ECB series key '{code}': missing dataflow"))
        })?;

        let url = format!("{SDW_DATA_URL}/{flow}/{series}");
        let mut req = self
            .http
            .get(&url)
            .query(&[("format", "csvdata")])
            .header(reqwest::header::ACCEPT, "text/csv")
            .header(reqwest::header::USER_AGENT, USER_AGENT);
        if let Some(start) = &span.start {
            req = req.query(&[("startPeriod", start)]);
        }
        if let Some(end) = &span.end {
            req = req.query(&[("endPeriod", end)]);
        }

        let resp = req
            .send()
            .map_err(|e| TransportError::new(format!("request for {code} failed: {e}")))?;

        let status = resp.status();
        // SDW answers "series exists but has no data in range" with an empty
        // 2xx/404 response rather than an error document.
        if status.as_u16() == 204 || status.as_u16() == 404 {
            return Ok(RawTable::default());
        }
        if !status.is_success() {
            return Err(TransportError::new(format!(
                "unexpected status {status} for {code}"
            )));
        }

        let body = resp
            .text()
            .map_err(|e| TransportError::new(format!("failed to read body for {code}: {e}")))?;
        parse_sdw_csv(code, &body)
    }
}

/// Parse an SDW CSV body into a `RawTable`, skipping any metadata preamble.
///
/// If no `TIME_PERIOD` header line is found the body is parsed from the
/// start, leaving the missing-column diagnosis to the normalizer.
fn parse_sdw_csv(code: &str, body: &str) -> Result<RawTable, TransportError> {
    let text = body.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Ok(RawTable::default());
    }

    let data = match header_line_offset(text) {
        Some(offset) => &text[offset..],
        None => text,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TransportError::new(format!("failed to read CSV headers for {code}: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| TransportError::new(format!("failed to parse CSV body for {code}: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Byte offset of the first line whose comma-separated fields contain
/// `TIME_PERIOD` (case-insensitive).
fn header_line_offset(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let has_time_period = line
            .trim_end()
            .split(',')
            .any(|field| field.trim().eq_ignore_ascii_case("TIME_PERIOD"));
        if has_time_period {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_metadata_preamble_before_header() {
        let body = "Data Source in SDW: FM.M.U2.EUR.RT.MM.EUR.IBOR.3M\n\
                    Frequency: Monthly\n\
                    TIME_PERIOD,OBS_VALUE,OBS_STATUS\n\
                    2024-01,-0.4,A\n\
                    2024-02,-0.41,A\n";
        let raw = parse_sdw_csv("FM.TEST", body).unwrap();
        assert_eq!(raw.headers, vec!["TIME_PERIOD", "OBS_VALUE", "OBS_STATUS"]);
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0], vec!["2024-01", "-0.4", "A"]);
    }

    #[test]
    fn body_without_preamble_parses_directly() {
        let body = "TIME_PERIOD,OBS_VALUE\n2024-01,1.5\n";
        let raw = parse_sdw_csv("FM.TEST", body).unwrap();
        assert_eq!(raw.headers, vec!["TIME_PERIOD", "OBS_VALUE"]);
        assert_eq!(raw.rows, vec![vec!["2024-01", "1.5"]]);
    }

    #[test]
    fn missing_header_line_is_left_to_the_normalizer() {
        let body = "FOO,BAR\n1,2\n";
        let raw = parse_sdw_csv("FM.TEST", body).unwrap();
        assert_eq!(raw.headers, vec!["FOO", "BAR"]);
    }

    #[test]
    fn empty_body_yields_empty_table() {
        let raw = parse_sdw_csv("FM.TEST", "").unwrap();
        assert!(raw.headers.is_empty());
        assert!(raw.rows.is_empty());
    }
}
