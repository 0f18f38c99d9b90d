//! Artifact build steps.
//!
//! Each function turns configured registries plus fetch parameters into one
//! in-memory table; persistence and printing stay in `app`. Everything here
//! is generic over the transport so tests can feed canned responses.

use crate::data::SeriesTransport;
use crate::data::fetch::SeriesFetcher;
use crate::domain::registry::{
    ALL_ITEMS, CURRENCIES, EURIBOR_SERIES, EURO_AREA_CODES, SECTORS, US_SERIES, fx_key, hicp_key,
    registry_keys, select_series,
};
use crate::domain::{DateSpan, Measure, NumericSeries, SeriesKey, TidyObservation, WideTable};
use crate::error::AppError;
use crate::frame::{
    Progress, align_wide, build_tidy, collect_wide, pivot_by_category, pivot_by_entity,
};

/// Decimal places for interest-rate and FX artifacts.
pub const RATE_PRECISION: usize = 6;
/// Decimal places for price-index artifacts.
pub const INDEX_PRECISION: usize = 4;
/// Rows shown in terminal previews.
pub const PREVIEW_ROWS: usize = 5;

/// Wide table with one column per Euribor maturity (3M/6M/12M, monthly).
pub fn build_rates_table<T: SeriesTransport>(
    fetcher: &SeriesFetcher<T>,
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<WideTable, AppError> {
    collect_wide(fetcher, &registry_keys(&EURIBOR_SERIES), span, progress)
}

/// Wide table of daily euro reference rates, one column per currency.
///
/// An empty `currencies` list selects the configured basket.
pub fn build_fx_table<T: SeriesTransport>(
    fetcher: &SeriesFetcher<T>,
    currencies: &[String],
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<WideTable, AppError> {
    let mut keys = Vec::new();
    if currencies.is_empty() {
        for cur in CURRENCIES {
            keys.push(SeriesKey::new(cur, fx_key(cur)));
        }
    } else {
        for raw in currencies {
            let cur = raw.trim().to_ascii_uppercase();
            if cur.is_empty() {
                continue;
            }
            keys.push(SeriesKey::new(cur.clone(), fx_key(&cur)));
        }
    }
    collect_wide(fetcher, &keys, span, progress)
}

/// Wide table of HICP all-items, one column per geo (U2 + members).
pub fn build_hicp_by_country<T: SeriesTransport>(
    fetcher: &SeriesFetcher<T>,
    measure: Measure,
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<WideTable, AppError> {
    let keys: Vec<SeriesKey> = EURO_AREA_CODES
        .iter()
        .map(|geo| SeriesKey::new(*geo, hicp_key(geo, ALL_ITEMS, measure)))
        .collect();
    collect_wide(fetcher, &keys, span, progress)
}

/// The HICP sector sweep: the tidy base plus both pivot views.
pub struct HicpSectorTables {
    pub tidy: Vec<TidyObservation>,
    /// date|country plus one column per sector.
    pub by_country: WideTable,
    /// date|sector plus one column per country.
    pub by_sector: WideTable,
}

pub fn build_hicp_sector_tables<T: SeriesTransport>(
    fetcher: &SeriesFetcher<T>,
    measure: Measure,
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<HicpSectorTables, AppError> {
    let tidy = build_tidy(
        fetcher,
        &SECTORS,
        &EURO_AREA_CODES,
        |coicop, geo| hicp_key(geo, coicop, measure),
        span,
        progress,
    )?;

    let sector_names: Vec<&str> = SECTORS.iter().map(|(name, _)| *name).collect();
    let by_country = pivot_by_entity(&tidy, &sector_names, "country");
    let by_sector = pivot_by_category(&tidy, &EURO_AREA_CODES, "sector");

    Ok(HicpSectorTables {
        tidy,
        by_country,
        by_sector,
    })
}

/// CPI series whose level gets a derived year-over-year column.
const CPI_SERIES: &str = "cpi_all_urban";
/// Label of the derived column, placed right after the CPI level.
const CPI_YOY_COLUMN: &str = "cpi_yoy_pct";
/// Observations per year for the monthly CPI series.
const CPI_YOY_WINDOW: usize = 12;

/// Wide table of US macro series from FRED.
///
/// When the CPI level is selected, a derived `cpi_yoy_pct` column (percent
/// change over 12 observations) is published next to it.
pub fn build_us_table<T: SeriesTransport>(
    fetcher: &SeriesFetcher<T>,
    requested: &[String],
    span: &DateSpan,
    progress: Progress<'_>,
) -> Result<WideTable, AppError> {
    let keys = select_series(&US_SERIES, requested)?;
    let mut fetched: Vec<(String, NumericSeries)> = Vec::with_capacity(keys.len() + 1);
    for key in &keys {
        progress(&format!("Fetching {key} ..."));
        let normalized = fetcher.fetch(key, span)?;
        let derived = (key.name == CPI_SERIES)
            .then(|| pct_change(&normalized.series, CPI_YOY_WINDOW));
        fetched.push((key.name.clone(), normalized.series));
        if let Some(yoy) = derived {
            fetched.push((CPI_YOY_COLUMN.to_string(), yoy));
        }
    }
    Ok(align_wide(&fetched))
}

/// Percent change over `periods` observations (positional, not calendar).
///
/// The first `periods` dates have no base and are absent from the output;
/// zero or non-finite bases are skipped.
fn pct_change(series: &NumericSeries, periods: usize) -> NumericSeries {
    let points = series.points();
    let mut out = Vec::new();
    for (idx, (date, value)) in points.iter().enumerate().skip(periods) {
        let (_, base) = points[idx - periods];
        if base == 0.0 {
            continue;
        }
        let change = (value / base - 1.0) * 100.0;
        if change.is_finite() {
            out.push((*date, change));
        }
    }
    NumericSeries::from_unsorted(out)
}
