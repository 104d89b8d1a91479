//! dingle-web entry point.
//!
//! Loads the config, picks the repository host and serves the JSON API.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dingle_core::config::{ConfigStore, DEFAULT_CONFIG_PATH};
use dingle_core::remote::{SshExecutor, SshTarget};
use dingle_web::config::DEFAULT_BIND;
use dingle_web::{AppState, HttpServer, HttpServerConfig};

#[derive(Parser)]
#[command(name = "dingle-web")]
#[command(about = "DE Drop Automation HTTP API", long_about = None)]
struct Cli {
    /// Path to the dingle configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: HttpServerConfig,

    /// Host to connect to ([user@]hostname[:port]); defaults to yum_repo_host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dingle_web=debug,dingle_core=info,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let store = ConfigStore::from_path(&cli.config);
    let config = store
        .load()
        .with_context(|| format!("--config setting '{}' is not usable", store.config_path().display()))?;

    let host = cli.host.as_deref().unwrap_or(&config.yum_repo_host);
    let target: SshTarget = host
        .parse()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("invalid --host '{}'", host))?;
    let executor = SshExecutor::new(target);
    info!("using repository host {}", executor.target());
    let executor = Arc::new(executor);

    let state = Arc::new(AppState::new(config, executor));
    HttpServer::new(cli.bind, state)
        .start()
        .await
        .context("server crashed")?;

    Ok(())
}
