//! `dashq`: query a dashboard's tables and views from the command line

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use dash_core::{listener_from_fn, FilterSpec, Value};
use dash_data::{
    DataConfig, DataError, DataManager, FilterRegistry, ManagerRecord, RemoteFetcher,
    RemoteRequest, Table, TableContext,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dashq", version, about = "Query dashboard tables and views")]
struct Args {
    /// Dashboard file: {"tables": {...}, "views": {...}, "filters": {...}}
    #[arg(short, long)]
    dashboard: PathBuf,

    /// Data configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List table names
    Tables,
    /// List view names
    Views,
    /// Distinct values of a column
    Values {
        column: String,
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Numeric spec of a column
    Numeric {
        column: String,
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Declared types of a column
    Types {
        column: String,
        #[arg(short, long)]
        table: Option<String>,
    },
    /// Rows of a view, filtered by the dashboard's named filters
    View { name: String },
    /// Rows of a table, optionally filtered by a JSON filter spec
    Rows {
        table: String,
        #[arg(short, long)]
        filter: Option<String>,
    },
}

/// Dashboard file: the manager record plus the named filter registry
#[derive(Deserialize, Debug)]
struct DashboardFile {
    #[serde(flatten)]
    record: ManagerRecord,
    #[serde(default)]
    filters: FilterRegistry,
}

/// Stands in for a transport; every remote request fails
struct NoTransport;

#[async_trait]
impl RemoteFetcher for NoTransport {
    async fn fetch(&self, request: RemoteRequest) -> Result<Value, DataError> {
        Err(DataError::Remote(format!(
            "no transport configured for {}",
            request.url
        )))
    }
}

fn load_dashboard(path: &Path) -> Result<DashboardFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dashboard {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse dashboard {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DataConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DataConfig::default(),
    };

    let dashboard = load_dashboard(&args.dashboard)?;
    info!(
        "Loaded dashboard with {} tables and {} views",
        dashboard.record.tables.len(),
        dashboard.record.views.len()
    );
    if dashboard.record.tables.values().any(|t| t.connector.is_some()) {
        warn!("Dashboard has remote tables; requests to them will fail without a transport");
    }

    let context = TableContext::new()
        .with_fetcher(Arc::new(NoTransport))
        .with_update_listener(listener_from_fn(|table| info!("Table '{}' updated", table)))
        .with_config(config);
    let manager = DataManager::from_record(dashboard.record, context)?;

    match args.command {
        Command::Tables => print_json(&manager.table_names())?,
        Command::Views => print_json(&manager.view_names())?,
        Command::Values { column, table } => {
            let values = manager.get_all_values(&column, table.as_deref()).await?;
            print_json(&values)?;
        }
        Command::Numeric { column, table } => {
            let spec = manager.get_numeric_spec(&column, table.as_deref()).await?;
            print_json(&spec)?;
        }
        Command::Types { column, table } => {
            print_json(&manager.get_types(&column, table.as_deref()))?;
        }
        Command::View { name } => {
            let rows = manager.view_data(&name, &dashboard.filters).await?;
            print_json(&rows)?;
        }
        Command::Rows { table, filter } => {
            let table = manager
                .table(&table)
                .with_context(|| format!("No table named '{}'", table))?;
            let filter: Option<FilterSpec> = filter
                .map(|text| serde_json::from_str(&text))
                .transpose()
                .context("Failed to parse filter spec")?;
            let rows = table.filtered_rows(filter.as_ref()).await?;
            print_json(&rows)?;
        }
    }

    Ok(())
}
