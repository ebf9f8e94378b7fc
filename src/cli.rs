//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use crate::adapters::coingecko_adapter::CoinGeckoAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::IngestError;
use crate::domain::pipeline::PipelineRunner;
use crate::domain::settings::{IngestSettings, StoreBackend};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::RowStore;

#[derive(Parser, Debug)]
#[command(
    name = "cryptoingest",
    about = "Fetch daily crypto prices, compute indicators, store them"
)]
pub struct Cli {
    /// INI configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch, enrich and store the top assets (default)
    Run,
    /// List assets present in the store
    ListSymbols,
    /// Show stored date range for asset(s)
    Info {
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let settings = match IngestSettings::from_env(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_ingest(&config, &settings),
        Command::ListSymbols => run_list_symbols(&config, &settings),
        Command::Info { symbol } => run_info(symbol.as_deref(), &config, &settings),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = IngestError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

fn fail(err: &IngestError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

/// Open the configured backend. Postgres reads its connection string from
/// `config`; SQLite uses the resolved path.
pub fn open_store(
    config: &dyn ConfigPort,
    settings: &IngestSettings,
) -> Result<Box<dyn RowStore>, IngestError> {
    match settings.store.backend {
        StoreBackend::Sqlite => open_sqlite(settings),
        StoreBackend::Postgres => open_postgres(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(settings: &IngestSettings) -> Result<Box<dyn RowStore>, IngestError> {
    use crate::adapters::sqlite_adapter::SqliteStore;
    info!(path = %settings.store.sqlite_path, "opening sqlite store");
    Ok(Box::new(SqliteStore::from_settings(&settings.store)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_settings: &IngestSettings) -> Result<Box<dyn RowStore>, IngestError> {
    Err(missing_backend("sqlite"))
}

#[cfg(feature = "postgres")]
fn open_postgres(config: &dyn ConfigPort) -> Result<Box<dyn RowStore>, IngestError> {
    use crate::adapters::postgres_adapter::PostgresStore;
    info!("opening postgres store");
    Ok(Box::new(PostgresStore::from_config(config)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_config: &dyn ConfigPort) -> Result<Box<dyn RowStore>, IngestError> {
    Err(missing_backend("postgres"))
}

#[cfg(not(all(feature = "sqlite", feature = "postgres")))]
fn missing_backend(feature: &str) -> IngestError {
    IngestError::ConfigInvalid {
        section: "database".into(),
        key: "backend".into(),
        reason: format!("built without the {feature} feature"),
    }
}

fn run_ingest(config: &dyn ConfigPort, settings: &IngestSettings) -> ExitCode {
    let store = match open_store(config, settings) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    if let Err(e) = store.ensure_schema() {
        return fail(&e);
    }

    let market = match CoinGeckoAdapter::from_settings(&settings.provider) {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };

    let runner = PipelineRunner::new(
        &market,
        store.as_ref(),
        settings.provider.top_n,
        settings.pipeline.pace,
    );

    match runner.run() {
        Ok(summary) => {
            eprintln!(
                "{} assets attempted: {} stored ({} rows), {} already present, {} failed",
                summary.attempted(),
                summary.stored(),
                summary.rows_written(),
                summary.duplicates(),
                summary.failed()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_symbols(config: &dyn ConfigPort, settings: &IngestSettings) -> ExitCode {
    let store = match open_store(config, settings) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let symbols = match store.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols stored");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(symbol: Option<&str>, config: &dyn ConfigPort, settings: &IngestSettings) -> ExitCode {
    let store = match open_store(config, settings) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let symbols = match symbol {
        Some(s) => vec![s.to_string()],
        None => match store.list_symbols() {
            Ok(s) => s,
            Err(e) => return fail(&e),
        },
    };

    for s in &symbols {
        match store.get_data_range(s) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} rows, {} to {}", s, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", s);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", s, e);
            }
        }
    }
    ExitCode::SUCCESS
}
