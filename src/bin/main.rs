//! modelsync CLI - reconcile declared models against a Hasura database
//!
//! Usage:
//!   modelsync serve [--host <host>] [--port <port>]
//!   modelsync sync [model]
//!   modelsync validate <table>
//!   modelsync structure <table>
//!   modelsync models
//!   modelsync ddl <model>
//!   modelsync track <table>
//!
//! Examples:
//!   modelsync sync products
//!   modelsync validate examples
//!   modelsync ddl categories

use clap::{Parser, Subcommand};
use modelsync::config::Settings;
use modelsync::metadata::{HasuraClient, MetadataService};
use modelsync::model::ModelRegistry;
use modelsync::sql::create_table_sql;
use modelsync::sync::{Reconciler, ReportStatus};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modelsync")]
#[command(about = "modelsync - Declarative schema reconciliation for Hasura-backed Postgres")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $MODELSYNC_CONFIG, ./modelsync.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the boundary API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Sync one registered model, or all of them
    Sync {
        /// Model name (syncs every registered model if not specified)
        model: Option<String>,
    },

    /// Add missing standard fields to a table
    Validate {
        /// Table name
        table: String,
    },

    /// Print the live structure of a table
    Structure {
        /// Table name
        table: String,
    },

    /// List registered models and whether their tables exist
    Models,

    /// Print the CREATE TABLE statement of a registered model without connecting
    Ddl {
        /// Model name
        model: String,
    },

    /// Track a table and create relationships for its foreign keys
    Track {
        /// Table name
        table: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Ddl { model } = &cli.command {
        return cmd_ddl(model);
    }

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(settings, host, port).await,
        command => {
            let reconciler = match build_reconciler(&settings) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            run_command(&reconciler, command).await
        }
    }
}

/// Log filter from `MODELSYNC_LOG` (default `info`); JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MODELSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_settings(path: Option<&std::path::Path>) -> Result<Settings, modelsync::config::SettingsError> {
    match path {
        Some(path) => {
            let mut settings = Settings::from_file(path)?;
            settings.apply_env_overrides(|key| std::env::var(key).ok());
            settings.validate()?;
            Ok(settings)
        }
        None => Settings::load(),
    }
}

fn build_reconciler(settings: &Settings) -> Result<Reconciler, modelsync::metadata::MetadataError> {
    let client = HasuraClient::new(settings.metadata.clone())?;
    let service: Arc<dyn MetadataService> = Arc::new(client);
    Ok(Reconciler::new(
        service,
        Arc::new(ModelRegistry::with_builtin_models()),
        &settings.sync,
        settings.metadata.schema.clone(),
    ))
}

#[cfg(feature = "server")]
async fn cmd_serve(mut settings: Settings, host: Option<String>, port: Option<u16>) -> ExitCode {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    match modelsync::web::serve(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "server"))]
async fn cmd_serve(_settings: Settings, _host: Option<String>, _port: Option<u16>) -> ExitCode {
    eprintln!("modelsync was built without the `server` feature");
    ExitCode::FAILURE
}

async fn run_command(reconciler: &Reconciler, command: Commands) -> ExitCode {
    match command {
        Commands::Sync { model: Some(name) } => {
            report(reconciler.sync_model(&name).await, |r| r.status)
        }
        Commands::Sync { model: None } => report(reconciler.sync_all_models().await, |reports| {
            if reports.iter().all(|r| r.is_complete()) {
                ReportStatus::Complete
            } else {
                ReportStatus::Partial
            }
        }),
        Commands::Validate { table } => report(reconciler.validate_structure(&table).await, |r| {
            if r.is_partial() {
                ReportStatus::Partial
            } else {
                ReportStatus::Complete
            }
        }),
        Commands::Structure { table } => {
            report(reconciler.get_table_structure(&table).await, |_| ReportStatus::Complete)
        }
        Commands::Models => report(reconciler.model_statuses().await, |_| ReportStatus::Complete),
        Commands::Track { table } => report(reconciler.track_table(&table).await, |r| r.status),
        Commands::Serve { .. } | Commands::Ddl { .. } => ExitCode::FAILURE,
    }
}

/// Print a result as pretty JSON. Anything short of complete exits non-zero.
fn report<T: Serialize>(
    result: modelsync::SyncResult<T>,
    status: impl FnOnce(&T) -> ReportStatus,
) -> ExitCode {
    match result {
        Ok(value) => {
            let complete = status(&value) == ReportStatus::Complete;
            match serde_json::to_string_pretty(&value) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing output: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            if complete {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_ddl(model: &str) -> ExitCode {
    let registry = ModelRegistry::with_builtin_models();
    let Some(definition) = registry.get_model(model) else {
        eprintln!("Unknown model '{}'. Registered models:", model);
        for name in registry.model_names() {
            eprintln!("  - {}", name);
        }
        return ExitCode::FAILURE;
    };

    match create_table_sql(definition) {
        Ok(sql) => {
            println!("{};", sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("DDL error: {}", e);
            ExitCode::FAILURE
        }
    }
}
