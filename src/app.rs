//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - wires providers to the retrying fetcher
//! - runs the artifact build steps
//! - prints previews and writes the CSV outputs
//!
//! Each artifact is built and persisted in its own self-contained step, so a
//! failure aborts the remaining steps but leaves already-written files on
//! disk.

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{
    AllArgs, Cli, Command, DEFAULT_OUT_BY_COUNTRY, DEFAULT_OUT_BY_SECTOR, DEFAULT_OUT_FX,
    DEFAULT_OUT_HICP, DEFAULT_OUT_RATES, DEFAULT_OUT_US, FetchArgs, FxArgs, HicpArgs,
    HicpSectorsArgs, RatesArgs, UsArgs,
};
use crate::data::ecb::EcbClient;
use crate::data::fetch::SeriesFetcher;
use crate::data::fred::FredClient;
use crate::error::AppError;
use crate::io::write_wide_csv;
use crate::report;

pub mod pipeline;

use pipeline::{INDEX_PRECISION, PREVIEW_ROWS, RATE_PRECISION};

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    // Bare `econ` (or `econ --start ...`) behaves like `econ tui ...`. Clap
    // requires a subcommand name, so the argv list is rewritten explicitly
    // before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    match cli.command {
        Command::Rates(args) => handle_rates(&args),
        Command::Fx(args) => handle_fx(&args),
        Command::Hicp(args) => handle_hicp(&args),
        Command::HicpSectors(args) => handle_hicp_sectors(&args),
        Command::Us(args) => handle_us(&args),
        Command::All(args) => handle_all(&args),
        Command::Tui(args) => crate::tui::run(&args),
    }
}

pub fn ecb_fetcher(fetch: &FetchArgs) -> SeriesFetcher<EcbClient> {
    SeriesFetcher::new(EcbClient::new(), fetch.retry())
}

/// Resolve the FRED credential and build its fetcher.
///
/// Environment access stays in this layer; the transport only ever receives
/// the resolved key.
pub fn fred_fetcher_from_env(fetch: &FetchArgs) -> Result<SeriesFetcher<FredClient>, AppError> {
    dotenvy::dotenv().ok();
    let api_key = std::env::var("FRED_API_KEY")
        .map_err(|_| AppError::MissingCredential { var: "FRED_API_KEY" })?;
    Ok(SeriesFetcher::new(FredClient::new(api_key), fetch.retry()))
}

fn handle_rates(args: &RatesArgs) -> Result<(), AppError> {
    let fetcher = ecb_fetcher(&args.fetch);
    let mut progress = |msg: &str| println!("{msg}");
    let table = pipeline::build_rates_table(&fetcher, &args.fetch.span(), &mut progress)?;
    print!("{}", report::format_table_tail(&table, PREVIEW_ROWS, RATE_PRECISION));
    write_wide_csv(&args.out, &table, RATE_PRECISION)?;
    println!("Saved -> {}", args.out.display());
    Ok(())
}

fn handle_fx(args: &FxArgs) -> Result<(), AppError> {
    let fetcher = ecb_fetcher(&args.fetch);
    let mut progress = |msg: &str| println!("{msg}");
    let table =
        pipeline::build_fx_table(&fetcher, &args.currencies, &args.fetch.span(), &mut progress)?;
    print!("{}", report::format_table_tail(&table, PREVIEW_ROWS, RATE_PRECISION));
    write_wide_csv(&args.out, &table, RATE_PRECISION)?;
    println!("Saved -> {}", args.out.display());
    Ok(())
}

fn handle_hicp(args: &HicpArgs) -> Result<(), AppError> {
    let fetcher = ecb_fetcher(&args.fetch);
    let mut progress = |msg: &str| println!("{msg}");
    let table =
        pipeline::build_hicp_by_country(&fetcher, args.measure, &args.fetch.span(), &mut progress)?;
    print!("{}", report::format_table_tail(&table, PREVIEW_ROWS, INDEX_PRECISION));
    write_wide_csv(&args.out, &table, INDEX_PRECISION)?;
    println!("Saved -> {}", args.out.display());
    Ok(())
}

fn handle_hicp_sectors(args: &HicpSectorsArgs) -> Result<(), AppError> {
    let fetcher = ecb_fetcher(&args.fetch);
    let mut progress = |msg: &str| println!("{msg}");
    let tables = pipeline::build_hicp_sector_tables(
        &fetcher,
        args.measure,
        &args.fetch.span(),
        &mut progress,
    )?;
    print!("{}", report::format_tidy_head(&tables.tidy, PREVIEW_ROWS));

    write_wide_csv(&args.out_by_country, &tables.by_country, INDEX_PRECISION)?;
    println!("Saved -> {}", args.out_by_country.display());

    write_wide_csv(&args.out_by_sector, &tables.by_sector, INDEX_PRECISION)?;
    println!("Saved -> {}", args.out_by_sector.display());
    Ok(())
}

fn handle_us(args: &UsArgs) -> Result<(), AppError> {
    let fetcher = fred_fetcher_from_env(&args.fetch)?;
    let mut progress = |msg: &str| println!("{msg}");
    let table =
        pipeline::build_us_table(&fetcher, &args.series, &args.fetch.span(), &mut progress)?;
    print!("{}", report::format_table_tail(&table, PREVIEW_ROWS, RATE_PRECISION));
    write_wide_csv(&args.out, &table, RATE_PRECISION)?;
    println!("Saved -> {}", args.out.display());
    Ok(())
}

fn handle_all(args: &AllArgs) -> Result<(), AppError> {
    handle_rates(&RatesArgs {
        fetch: args.fetch.clone(),
        out: PathBuf::from(DEFAULT_OUT_RATES),
    })?;
    handle_fx(&FxArgs {
        fetch: args.fetch.clone(),
        currencies: Vec::new(),
        out: PathBuf::from(DEFAULT_OUT_FX),
    })?;
    handle_hicp(&HicpArgs {
        fetch: args.fetch.clone(),
        measure: args.measure,
        out: PathBuf::from(DEFAULT_OUT_HICP),
    })?;
    handle_hicp_sectors(&HicpSectorsArgs {
        fetch: args.fetch.clone(),
        measure: args.measure,
        out_by_country: PathBuf::from(DEFAULT_OUT_BY_COUNTRY),
        out_by_sector: PathBuf::from(DEFAULT_OUT_BY_SECTOR),
    })?;
    handle_us(&UsArgs {
        fetch: args.fetch.clone(),
        series: Vec::new(),
        out: PathBuf::from(DEFAULT_OUT_US),
    })?;
    Ok(())
}

/// Rewrite argv so `econ` defaults to `econ tui`.
///
/// Rules:
/// - `econ`                      -> `econ tui`
/// - `econ --start 2020-01 ...`  -> `econ tui --start 2020-01 ...`
/// - `econ --help/--version/-h`  -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "rates" | "fx" | "hicp" | "hicp-sectors" | "us" | "all" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
