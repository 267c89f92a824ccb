use clap::{Parser, Subcommand};
use queryrunner::cli::{self as prog_cli, OutputMode};
use queryrunner::config::AppConfig;
use queryrunner::runner::{self, CollectionHandle};
use queryrunner::store::MemoryStore;
use queryrunner::types::Direction;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "queryrunner", version, about = "Run one query against a document collection", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Server host (default localhost)")]
    host: Option<String>,
    #[arg(long, help = "Server port (default 27017)")]
    port: Option<u16>,
    #[arg(long = "db", help = "Database name (default demo)")]
    database: Option<String>,
    #[arg(long, help = "Collection name (default dbtable)")]
    collection: Option<String>,
    #[arg(long, help = "Full connection string; overrides --host/--port")]
    uri: Option<String>,
    #[arg(long, help = "Run against an in-process collection loaded from an NDJSON file")]
    fixture: Option<PathBuf>,
    #[arg(long, help = "Output format: human, plain or json")]
    format: Option<String>,
    #[arg(long, help = "Log level: off, error, warn, info, debug, trace")]
    log_level: Option<String>,
    #[arg(long, help = "Write rolling log files to this directory instead of stderr")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print documents matching a filter")]
    Find {
        #[arg(long, default_value = "{}", help = "Filter as JSON, e.g. '{\"name\":{\"$regex\":\"^S\"}}'")]
        filter: String,
    },
    #[command(about = "Print documents ordered by one field")]
    Sort {
        #[arg(long, help = "Field to sort by")]
        field: String,
        #[arg(long, default_value = "asc", allow_hyphen_values = true, help = "asc|desc|1|-1")]
        direction: String,
        #[arg(long, default_value = "{}", help = "Filter as JSON")]
        filter: String,
    },
    #[command(name = "delete-many", about = "Delete every matching document")]
    DeleteMany {
        #[arg(long, help = "Filter as JSON")]
        filter: String,
        #[arg(long, help = "Print the remaining documents afterwards")]
        show_remaining: bool,
    },
    #[command(name = "delete-one", about = "Delete the first matching document")]
    DeleteOne {
        #[arg(long, help = "Filter as JSON")]
        filter: String,
        #[arg(long, help = "Print the remaining documents afterwards")]
        show_remaining: bool,
    },
}

fn to_prog(cmd: Commands) -> Result<prog_cli::Command, Box<dyn std::error::Error>> {
    Ok(match cmd {
        Commands::Find { filter } => prog_cli::Command::Find { filter_json: filter },
        Commands::Sort { field, direction, filter } => prog_cli::Command::Sort {
            filter_json: filter,
            field,
            direction: direction.parse::<Direction>()?,
        },
        Commands::DeleteMany { filter, show_remaining } => {
            prog_cli::Command::DeleteMany { filter_json: filter, show_remaining }
        }
        Commands::DeleteOne { filter, show_remaining } => {
            prog_cli::Command::DeleteOne { filter_json: filter, show_remaining }
        }
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = AppConfig {
        host: cli.host,
        port: cli.port,
        database: cli.database,
        collection: cli.collection,
        uri: cli.uri,
        log_config: None,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
        format: cli.format,
    };
    let cfg = AppConfig::load(overrides, cli.config.as_deref())?;

    match &cfg.log_config {
        Some(path) => queryrunner::logger::init_path(path)?,
        None => queryrunner::logger::configure_logging(cfg.log_dir.as_deref(), cfg.log_level.as_deref()),
    }

    let mode = match cfg.format.as_deref() {
        Some(f) => f.parse::<OutputMode>()?,
        None => OutputMode::Human,
    };
    let command = to_prog(cli.command)?;

    let target = cfg.target();
    let handle: CollectionHandle = match &cli.fixture {
        Some(path) => runner::connect_with(MemoryStore::open_ndjson(target.collection.clone(), path)?),
        None => runner::connect(&target)?,
    };
    log::debug!("running {} against {}", command.operation().name(), handle.describe());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    prog_cli::run_with_format(&handle, &command, mode, &mut out)?;
    Ok(())
}
