//! gridcalc CLI - formula cells backed by a JSON file

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::prelude::*;
use gridcalc::{format_result, parse, parse_with_max_depth};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet cells with arithmetic formulas")]
struct Cli {
    /// JSON file holding the cells
    #[arg(long, global = true, env = "GRIDCALC_STORE", default_value = "gridcalc.json")]
    store: PathBuf,

    /// Maximum cell lookups per evaluation (0 = unlimited)
    #[arg(long, global = true, default_value = "256")]
    max_resolutions: usize,

    /// Maximum nesting of groups and references (0 = unlimited)
    #[arg(long, global = true, default_value = "512")]
    max_depth: usize,

    /// Keep sheet and cell identifiers case-sensitive
    #[arg(long, global = true)]
    case_sensitive: bool,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a cell's formula and print the stored cell
    Set {
        /// Sheet identifier
        sheet: String,
        /// Cell identifier
        cell: String,
        /// Formula, e.g. "=A1*2+1"
        value: String,
    },

    /// Print one cell
    Get {
        /// Sheet identifier
        sheet: String,
        /// Cell identifier
        cell: String,
    },

    /// Print every cell of a sheet
    Sheet {
        /// Sheet identifier
        sheet: String,
    },

    /// Evaluate a formula without storing it
    Eval {
        /// Formula to evaluate
        formula: String,

        /// Sheet whose cells references resolve to
        #[arg(short, long, default_value = "default")]
        sheet: String,
    },

    /// Show how a formula is grouped
    Parse {
        /// Formula to parse
        formula: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let max_depth = Some(cli.max_depth).filter(|&max| max > 0);
    if let Commands::Parse { formula } = &cli.command {
        return show_tree(formula, max_depth);
    }

    let store = JsonFileStore::open(&cli.store)
        .with_context(|| format!("Failed to open store '{}'", cli.store.display()))?;
    let options = ServiceOptions::default()
        .with_max_resolutions(Some(cli.max_resolutions).filter(|&max| max > 0))
        .with_max_depth(max_depth)
        .with_normalize_ids(!cli.case_sensitive);
    let service = CellService::with_options(store, options);

    match cli.command {
        Commands::Set { sheet, cell, value } => set_cell(&service, &sheet, &cell, &value),
        Commands::Get { sheet, cell } => {
            let found = service
                .get_cell(&sheet, &cell)
                .with_context(|| format!("Failed to read {}/{}", sheet, cell))?;
            print_json(&found)
        }
        Commands::Sheet { sheet } => {
            let listing = service
                .get_sheet(&sheet)
                .with_context(|| format!("Failed to read sheet '{}'", sheet))?;
            print_json(&listing)
        }
        Commands::Eval { formula, sheet } => {
            let value = service
                .evaluate(&sheet, &formula)
                .with_context(|| format!("Failed to evaluate '{}'", formula))?;
            println!("{}", format_result(value));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Parse { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Store a formula; a rejected formula prints its error report and fails
fn set_cell<S: CellStore>(
    service: &CellService<S>,
    sheet: &str,
    cell: &str,
    value: &str,
) -> Result<ExitCode> {
    match service.upsert_cell(sheet, cell, value) {
        Ok(stored) => print_json(&stored),
        Err(ServiceError::Store(e)) => {
            Err(e).with_context(|| format!("Failed to store {}/{}", sheet, cell))
        }
        Err(e) => {
            print_json(&ErrorReport::new(value, &e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_tree(formula: &str, max_depth: Option<usize>) -> Result<ExitCode> {
    let tree = match max_depth {
        Some(max) => parse_with_max_depth(formula, max),
        None => parse(formula),
    }
    .with_context(|| format!("Failed to parse '{}'", formula))?;
    println!("{}", tree);
    println!("{:#?}", tree.nodes());
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<ExitCode> {
    let text = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", text);
    Ok(ExitCode::SUCCESS)
}
