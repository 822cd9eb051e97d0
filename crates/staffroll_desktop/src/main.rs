//! Desktop entry point.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use staffroll_core::{init_logging, open_repository, AppConfig, EmployeeService, FailurePolicy};
use staffroll_desktop::{terminal, App};

/// Browse and edit employee records in a terminal window.
#[derive(Debug, Parser)]
#[command(name = "staffroll-desktop", version)]
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

    // The alternate screen owns stderr; only file logging is possible here.
    if let Some(dir) = &config.logging.dir {
        init_logging(&config.logging.level, &dir.to_string_lossy())?;
    }

    let repo = open_repository(&config)?;
    let mut app = App::new(EmployeeService::with_policy(
        repo,
        config.clients.on_store_error,
    ));
    terminal::run(&mut app)?;
    Ok(())
}
