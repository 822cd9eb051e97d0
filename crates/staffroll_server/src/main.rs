//! Employee API server entry point.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::info;
use staffroll_core::{init_logging, init_stderr_logging, open_repository, AppConfig};
use staffroll_server::HttpServer;

/// Serve the employee records API over HTTP.
#[derive(Debug, Parser)]
#[command(name = "staffroll-server", version)]
struct Args {
    /// JSON configuration file
    #[arg(long, env = "STAFFROLL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides STAFFROLL_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Listen host
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(long)]
    port: Option<u16>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig, Box<dyn Error + Send + Sync>> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        if let Some(db) = self.db {
            config.store.path = Some(db);
        }
        if let Some(host) = self.host {
            config.http.host = host;
        }
        if let Some(port) = self.port {
            config.http.port = port;
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Args::parse().into_config()?;

    match &config.logging.dir {
        Some(dir) => init_logging(&config.logging.level, &dir.to_string_lossy())?,
        None => init_stderr_logging(&config.logging.level)?,
    }

    let repo = open_repository(&config)?;
    info!(
        "event=server_start module=server status=ok db={}",
        repo.store().path().display()
    );

    HttpServer::new(config.http.clone(), Arc::new(repo))
        .start()
        .await?;
    Ok(())
}
