//! Command-line parsing for the macro data suite.
//!
//! Argument parsing and command dispatch stay separate from the fetch and
//! reshaping code; every flag is lowered into explicit config values before
//! the pipeline runs.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::data::fetch::RetryPolicy;
use crate::domain::{DateSpan, Measure};

pub const DEFAULT_OUT_RATES: &str = "euribor_3m_6m_12m_ecb.csv";
pub const DEFAULT_OUT_FX: &str = "fx_daily_ecb.csv";
pub const DEFAULT_OUT_HICP: &str = "hicp_all_items_by_country.csv";
pub const DEFAULT_OUT_BY_COUNTRY: &str = "hicp_sectors_filterbyCountry.csv";
pub const DEFAULT_OUT_BY_SECTOR: &str = "hicp_sectors_filterbySector.csv";
pub const DEFAULT_OUT_US: &str = "us_macro.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "econ",
    version,
    about = "Macro data suite: Euribor, FX, and HICP from the ECB; US series from FRED"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download monthly Euribor 3M/6M/12M into one wide CSV.
    Rates(RatesArgs),
    /// Download daily euro FX reference rates.
    Fx(FxArgs),
    /// Download HICP all-items by country (wide).
    Hicp(HicpArgs),
    /// Download the HICP sector sweep and write both pivot views.
    HicpSectors(HicpSectorsArgs),
    /// Download US macro series from FRED (requires FRED_API_KEY).
    Us(UsArgs),
    /// Run every download step in sequence with default output paths.
    All(AllArgs),
    /// Launch the interactive series browser.
    Tui(TuiArgs),
}

/// Options shared by every fetching command.
#[derive(Debug, Parser, Clone, Default)]
pub struct FetchArgs {
    /// Start period (YYYY-MM for monthly series; YYYY-MM-DD for daily).
    #[arg(long)]
    pub start: Option<String>,

    /// End period.
    #[arg(long)]
    pub end: Option<String>,

    /// Transport attempts per series (including the first).
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Pause between retry attempts, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub pause_ms: u64,
}

impl FetchArgs {
    pub fn span(&self) -> DateSpan {
        DateSpan::new(self.start.clone(), self.end.clone())
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retries.max(1),
            pause: Duration::from_millis(self.pause_ms),
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct RatesArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Output CSV.
    #[arg(long, default_value = DEFAULT_OUT_RATES)]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct FxArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Comma-separated currency list (default: the configured basket).
    #[arg(long, value_delimiter = ',')]
    pub currencies: Vec<String>,

    /// Output CSV.
    #[arg(long, default_value = DEFAULT_OUT_FX)]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct HicpArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// HICP measure: annual rate of change or index (2015=100).
    #[arg(long, value_enum, default_value_t = Measure::Anr)]
    pub measure: Measure,

    /// Output CSV.
    #[arg(long, default_value = DEFAULT_OUT_HICP)]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct HicpSectorsArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// HICP measure: annual rate of change or index (2015=100).
    #[arg(long, value_enum, default_value_t = Measure::Anr)]
    pub measure: Measure,

    /// Output CSV: date|country plus one column per sector.
    #[arg(long, default_value = DEFAULT_OUT_BY_COUNTRY)]
    pub out_by_country: PathBuf,

    /// Output CSV: date|sector plus one column per country.
    #[arg(long, default_value = DEFAULT_OUT_BY_SECTOR)]
    pub out_by_sector: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct UsArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Specific series names to download (default: all configured).
    #[arg(long, value_delimiter = ',')]
    pub series: Vec<String>,

    /// Output CSV.
    #[arg(long, default_value = DEFAULT_OUT_US)]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct AllArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// HICP measure for the index artifacts.
    #[arg(long, value_enum, default_value_t = Measure::Anr)]
    pub measure: Measure,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,
}
