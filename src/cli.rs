//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::console_report::render_table;
use crate::adapters::csv_adapter::{self, CsvAdapter};
use crate::adapters::export::{default_export_path, export_to_file};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sql_dump_adapter::{SqlDumpAdapter, DEFAULT_TABLE};
use crate::domain::config_validation::{
    trade_constant, validate_store_config, validate_trade_config,
};
use crate::domain::error::TradeBoundsError;
use crate::domain::recompute::{recompute_all, RecomputePass};
use crate::domain::store::VariableStore;
use crate::domain::trade_function::TradeFunction;
use crate::domain::variable::{Field, Variable};
use crate::ports::config_port::ConfigPort;
use crate::ports::export_port::{ExportFormat, ExportPort};
use crate::ports::store_port::StorePort;

pub const DEFAULT_EXPORT_BASENAME: &str = "ConsoleDataBase";

#[derive(Parser, Debug)]
#[command(
    name = "tradebounds",
    about = "Worst/best case bounds for trade profit, amount and rates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the table and seed defaults if it is empty
    Init {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Restore every variable to its defaults
    Reset {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print all variables
    Show {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print one field of one variable
    Get {
        #[arg(long)]
        variable: String,
        #[arg(long)]
        field: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Change the minimum or maximum of a variable
    Set {
        #[arg(long)]
        variable: String,
        #[arg(long)]
        field: String,
        #[arg(long, allow_hyphen_values = true)]
        value: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Recompute derived bounds for all variables
    Recompute {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Treat rates as market rates (overrides the config file)
        #[arg(long)]
        market_rate: bool,
    },
    /// Write the store as CSV or SQL
    Export {
        #[arg(short, long, default_value = "csv")]
        format: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Replace the stored variables with the contents of a CSV export
    Import {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Init { config } => run_init(config.as_ref()),
        Command::Reset { config } => run_reset(config.as_ref()),
        Command::Show { config } => run_show(config.as_ref()),
        Command::Get {
            variable,
            field,
            config,
        } => run_get(&variable, &field, config.as_ref()),
        Command::Set {
            variable,
            field,
            value,
            config,
        } => run_set(&variable, &field, &value, config.as_ref()),
        Command::Recompute {
            config,
            market_rate,
        } => run_recompute(config.as_ref(), market_rate),
        Command::Export {
            format,
            output,
            config,
        } => run_export(&format, output.as_ref(), config.as_ref()),
        Command::Import { input, config } => run_import(&input, config.as_ref()),
    }
}

/// Loads the INI file, or an empty config when no path is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, TradeBoundsError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| TradeBoundsError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

pub fn build_trade_function(config: &dyn ConfigPort) -> Result<TradeFunction, TradeBoundsError> {
    validate_trade_config(config)?;

    let mut engine = TradeFunction::new(
        trade_constant(config, "spread")?,
        trade_constant(config, "rate_ka")?,
        trade_constant(config, "rate_pn")?,
    );
    engine.set_based_on_market_rate(config.get_bool("trade", "based_on_market_rate", false));
    Ok(engine)
}

/// Resolves the export target: an explicit path wins, else `[export]` settings.
pub fn resolve_export_path(
    config: &dyn ConfigPort,
    format: ExportFormat,
    output: Option<&PathBuf>,
) -> PathBuf {
    if let Some(path) = output {
        return path.clone();
    }
    let directory = config
        .get_string("export", "directory")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let basename = config
        .get_string("export", "basename")
        .unwrap_or_else(|| DEFAULT_EXPORT_BASENAME.to_string());
    default_export_path(&directory, &basename, format)
}

pub fn exporter_for(
    config: &dyn ConfigPort,
    format: ExportFormat,
    output: &Path,
) -> Result<Box<dyn ExportPort>, TradeBoundsError> {
    match format {
        ExportFormat::Csv => Ok(Box::new(CsvAdapter::new(output.to_path_buf()))),
        ExportFormat::Sql => {
            let table = config
                .get_string("sqlite", "table")
                .unwrap_or_else(|| DEFAULT_TABLE.to_string());
            Ok(Box::new(SqlDumpAdapter::new(&table)?))
        }
    }
}

pub fn get_value(
    port: &dyn StorePort,
    variable: &str,
    field: &str,
) -> Result<Decimal, TradeBoundsError> {
    port.load()?.lookup(variable, field)
}

/// Parses and applies one bound update, then persists the store.
pub fn set_bound(
    port: &dyn StorePort,
    variable: &str,
    field: &str,
    value: &str,
) -> Result<Decimal, TradeBoundsError> {
    let variable: Variable = variable.parse()?;
    let field: Field = field.parse()?;
    let value = Decimal::from_str(value.trim()).map_err(|e| TradeBoundsError::InvalidValue {
        value: value.to_string(),
        reason: format!("not a decimal: {e}"),
    })?;

    let mut store = port.load()?;
    store.update_bound(variable, field, value)?;
    port.persist(&store)?;
    tracing::info!(variable = %variable, field = %field, value = %value, "bound updated");
    Ok(value)
}

/// Loads, runs one recompute pass and persists. Nothing is written on failure.
pub fn recompute(
    port: &dyn StorePort,
    engine: &TradeFunction,
) -> Result<(VariableStore, RecomputePass), TradeBoundsError> {
    let mut store = port.load()?;
    let pass = recompute_all(&mut store, engine)?;
    port.persist(&store)?;
    Ok((store, pass))
}

/// Replaces whatever is stored with the defaults without reading it first.
pub fn reset_store(port: &dyn StorePort) -> Result<(), TradeBoundsError> {
    port.reset()
}

pub fn export_store(
    port: &dyn StorePort,
    exporter: &dyn ExportPort,
    output: &Path,
) -> Result<usize, TradeBoundsError> {
    let store = port.load()?;
    export_to_file(exporter, &store, output)
}

/// Reads a CSV export and replaces the stored variables with it.
pub fn import_csv(port: &dyn StorePort, input: &Path) -> Result<VariableStore, TradeBoundsError> {
    let bytes = std::fs::read(input)?;
    let store = csv_adapter::read_csv(&bytes)?;
    port.persist(&store)?;
    tracing::info!(path = %input.display(), "store imported from CSV");
    Ok(store)
}

fn report(result: Result<(), TradeBoundsError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

#[cfg(feature = "sqlite")]
pub fn open_sqlite(
    config: &dyn ConfigPort,
) -> Result<crate::adapters::sqlite_adapter::SqliteAdapter, TradeBoundsError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    validate_store_config(config)?;
    let adapter = SqliteAdapter::from_config(config)?;
    adapter.initialize_schema()?;
    adapter.seed_defaults_if_empty()?;
    Ok(adapter)
}

/// Runs `f` against the configured SQLite store.
fn with_store<F>(config_path: Option<&PathBuf>, f: F) -> ExitCode
where
    F: FnOnce(&FileConfigAdapter, &dyn StorePort) -> Result<(), TradeBoundsError>,
{
    #[cfg(feature = "sqlite")]
    {
        report(load_config(config_path).and_then(|config| {
            let adapter = open_sqlite(&config)?;
            f(&config, &adapter)
        }))
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, f);
        eprintln!("error: sqlite feature is required");
        ExitCode::from(1)
    }
}

fn run_init(config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |_, port| {
        let store = port.load()?;
        eprintln!("Store ready with {} variables", store.records().count());
        Ok(())
    })
}

fn run_reset(config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |_, port| {
        reset_store(port)?;
        eprintln!("All variables restored to defaults");
        Ok(())
    })
}

fn run_show(config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |_, port| {
        print!("{}", render_table(&port.load()?));
        Ok(())
    })
}

fn run_get(variable: &str, field: &str, config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |_, port| {
        println!("{}", get_value(port, variable, field)?);
        Ok(())
    })
}

fn run_set(variable: &str, field: &str, value: &str, config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |_, port| {
        let value = set_bound(port, variable, field, value)?;
        eprintln!("{variable}.{field} = {value}");
        Ok(())
    })
}

fn run_recompute(config_path: Option<&PathBuf>, market_rate: bool) -> ExitCode {
    with_store(config_path, |config, port| {
        let mut engine = build_trade_function(config)?;
        if market_rate {
            engine.set_based_on_market_rate(true);
        }
        let (store, _) = recompute(port, &engine)?;
        print!("{}", render_table(&store));
        Ok(())
    })
}

fn run_export(format: &str, output: Option<&PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |config, port| {
        let format: ExportFormat = format.parse()?;
        let path = resolve_export_path(config, format, output);
        let exporter = exporter_for(config, format, &path)?;
        export_store(port, exporter.as_ref(), &path)?;
        eprintln!("Database exported to {} successfully.", path.display());
        Ok(())
    })
}

fn run_import(input: &Path, config_path: Option<&PathBuf>) -> ExitCode {
    with_store(config_path, |_, port| {
        import_csv(port, input)?;
        eprintln!("Imported {}", input.display());
        Ok(())
    })
}
