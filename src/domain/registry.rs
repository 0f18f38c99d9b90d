//! Configured series registries.
//!
//! Everything the pipeline fetches is named here: the Euribor maturities, the
//! FX currency basket, the euro-area geo codes and HICP sector aggregates,
//! and the US FRED series. Core code receives these as explicit parameters;
//! nothing below reads the environment.

use crate::domain::{Measure, SeriesKey};
use crate::error::AppError;

/// Euro area aggregate (`U2`) followed by member states.
pub const EURO_AREA_CODES: [&str; 20] = [
    "U2", "AT", "BE", "CY", "DE", "EE", "ES", "FI", "FR", "GR", "IE", "IT", "LT", "LU", "LV",
    "MT", "NL", "PT", "SI", "SK",
];

/// HICP "all items" ECOICOP aggregate.
pub const ALL_ITEMS: &str = "000000";

/// Broad HICP sector aggregates (name, ECOICOP code), in output column order.
pub const SECTORS: [(&str, &str); 5] = [
    ("ALL_ITEMS", "000000"),
    ("ENERGY", "NRGY00"),
    ("FOOD", "FOOD00"),
    ("SERVICES", "SERV00"),
    ("GOODS_X_ENERGY", "IGXE00"),
];

/// Monthly Euribor series (historical average through period).
pub const EURIBOR_SERIES: [(&str, &str); 3] = [
    ("euribor_3m", "FM.M.U2.EUR.RT.MM.EURIBOR3MD_.HSTA"),
    ("euribor_6m", "FM.M.U2.EUR.RT.MM.EURIBOR6MD_.HSTA"),
    ("euribor_12m", "FM.M.U2.EUR.RT.MM.EURIBOR1YD_.HSTA"),
];

/// Daily euro reference-rate currencies (foreign currency per 1 EUR).
pub const CURRENCIES: [&str; 20] = [
    "USD", "GBP", "JPY", "CHF", "CNY", "AUD", "CAD", "NOK", "SEK", "DKK", "PLN", "CZK", "HUF",
    "TRY", "ZAR", "BRL", "INR", "KRW", "MXN", "NZD",
];

/// US macro series fetched from FRED (name, series mnemonic).
pub const US_SERIES: [(&str, &str); 4] = [
    ("fed_funds", "FEDFUNDS"),
    ("cpi_all_urban", "CPIAUCSL"),
    ("t_bill_3m", "DTB3"),
    ("t_bill_6m", "DTB6"),
];

/// Build the compound HICP key: `ICP.M.<GEO>.N.<COICOP>.4.<MEASURE>`.
pub fn hicp_key(geo: &str, coicop: &str, measure: Measure) -> String {
    format!("ICP.M.{geo}.N.{coicop}.4.{}", measure.code())
}

/// Build the daily FX reference-rate key: `EXR.D.<CUR>.EUR.SP00.A`.
pub fn fx_key(currency: &str) -> String {
    format!("EXR.D.{currency}.EUR.SP00.A")
}

/// Turn a `(name, code)` registry into `SeriesKey`s, preserving order.
pub fn registry_keys(entries: &[(&str, &str)]) -> Vec<SeriesKey> {
    entries
        .iter()
        .map(|(name, code)| SeriesKey::new(*name, *code))
        .collect()
}

/// Resolve requested names against a registry, preserving request order.
///
/// An empty request selects the whole registry in its configured order.
pub fn select_series(
    entries: &[(&str, &str)],
    requested: &[String],
) -> Result<Vec<SeriesKey>, AppError> {
    if requested.is_empty() {
        return Ok(registry_keys(entries));
    }

    let mut out = Vec::with_capacity(requested.len());
    for name in requested {
        let found = entries.iter().find(|(n, _)| n == name);
        match found {
            Some((n, code)) => out.push(SeriesKey::new(*n, *code)),
            None => {
                let mut known: Vec<&str> = entries.iter().map(|(n, _)| *n).collect();
                known.sort_unstable();
                return Err(AppError::UnknownSeries {
                    name: name.clone(),
                    known: known.join(", "),
                });
            }
        }
    }
    Ok(out)
}
