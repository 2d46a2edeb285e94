use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use sharenote_core::{init_logging, open_db, SharedSettings};
use sharenote_server::{build_router, AppState, ServerConfig};
use std::path::PathBuf;

/// HTTP server for shared notes.
#[derive(Debug, Parser)]
#[command(name = "sharenote-server", version)]
struct Args {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Overrides `bind` from the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    init_logging(config.log_level(), config.log_target())?;

    let conn = open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.database_path.display()
        )
    })?;
    let state = AppState::new(conn, SharedSettings::new(config.settings.clone()));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        "event=server_start module=server status=ok bind={} db_path={}",
        config.bind,
        config.database_path.display()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_stop module=server status=error error={err}");
    }
}
