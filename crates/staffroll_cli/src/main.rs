//! Console entry point.
//!
//! # Responsibility
//! - Resolve configuration from file, environment and flags.
//! - Run the interactive menu over stdin/stdout.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use staffroll_cli::Console;
use staffroll_core::{
    init_logging, init_stderr_logging, open_repository, AppConfig, EmployeeService, FailurePolicy,
};

/// Manage employee records from the terminal.
#[derive(Debug, Parser)]
#[command(name = "staffroll", version)]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "STAFFROLL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides STAFFROLL_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Read failure policy: surface|fallback
    #[arg(long)]
    on_store_error: Option<FailurePolicy>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig, Box<dyn Error + Send + Sync>> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(db) = self.db {
            config.store.path = Some(db);
        }
        if let Some(policy) = self.on_store_error {
            config.clients.on_store_error = policy;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(dir) = self.log_dir {
            config.logging.dir = Some(dir);
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Args::parse().into_config()?;

    // stderr shares the terminal with the menu; keep it to warnings there.
    match &config.logging.dir {
        Some(dir) => init_logging(&config.logging.level, &dir.to_string_lossy())?,
        None => init_stderr_logging("warn")?,
    }

    let repo = open_repository(&config)?;
    let service = EmployeeService::with_policy(repo, config.clients.on_store_error);

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout().lock(), service);
    console.run()?;
    Ok(())
}
