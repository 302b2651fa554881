//! # Key Archive CLI
//!
//! Runs one archive command against the local SQLite stores.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CLI Startup                                    │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr            │
//! │     • Default: INFO, can be overridden with RUST_LOG                    │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • archive.toml (or --config), then ARCHIVE_* env overrides         │
//! │     • --db overrides the database path                                 │
//! │                                                                         │
//! │  3. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode                                              │
//! │     • Run pending migrations                                            │
//! │                                                                         │
//! │  4. Spawn Engine ─────────────────────────────────────────────────────► │
//! │     • Active + Deleted stores, detached device channel                 │
//! │     • Explicit load before the command runs                            │
//! │                                                                         │
//! │  5. Execute Command, Shut Down ───────────────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod commands;
mod error;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use archive_store::{Database, DbConfig};
use archive_sync::{Archive, ArchiveConfig, EngineSettings, LocalSyncChannel};

use cli::{Cli, Command};
use commands::Format;
use error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(?e, "Command failed");
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = ArchiveConfig::load_or_default(cli.config.clone());
    if let Some(db) = cli.db {
        config.storage.database_path = db;
    }
    config.validate()?;

    let format = if cli.json { Format::Json } else { Format::Text };
    let mut stdout = std::io::stdout().lock();

    if let Command::Config { save } = cli.command {
        if save {
            config.save(cli.config)?;
            info!("Configuration saved");
        }
        write!(stdout, "{}", toml::to_string_pretty(&config)?)?;
        return Ok(());
    }

    let db_path = config.database_path().clone();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path).max_connections(config.storage.max_connections))
        .await?;

    // Load explicitly so `sync` never races the initial load.
    let settings = EngineSettings {
        load_on_start: false,
        ..config.engine.clone()
    };
    let archive = Archive::spawn(
        Arc::new(db.active_store()),
        Arc::new(db.deleted_store()),
        Arc::new(LocalSyncChannel::detached()),
        &settings,
    );
    archive.load().await?;

    let result = commands::execute(cli.command, &archive, format, &mut stdout).await;

    archive.shutdown().await?;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=archive_sync=trace` - Show trace for the engine only
/// - Default: INFO level, debug for archive crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,archive=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
