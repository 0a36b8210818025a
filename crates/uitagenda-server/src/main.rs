//! uitagenda server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, starts the reconciliation scheduler and serves the query API under
//! `/api`.
//!
//! ```text
//! cargo run -p uitagenda-server -- --seed
//! cargo run -p uitagenda-server -- --once
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uitagenda_api::AppState;
use uitagenda_store_sqlite::SqliteStore;
use uitagenda_sync::{Reconciler, Scheduler};

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Free events in Amsterdam, harvested and served over HTTP")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run one reconciliation pass, print its report as JSON and exit.
  #[arg(long)]
  once: bool,

  /// Insert the sample events before starting.
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let store_path = cfg.resolved_store_path();
  if let Some(dir) = store_path.parent().filter(|d| !d.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(dir)
      .await
      .with_context(|| format!("failed to create {dir:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  let client =
    uitagenda_sources::http::client(cfg.fetch_timeout()).context("failed to build HTTP client")?;
  let reconciler = Reconciler::new(
    store,
    uitagenda_sources::default_sources(client),
    cfg.reconciler(),
  );
  let scheduler = Scheduler::new(Arc::new(reconciler), cfg.scheduler());

  if cli.seed {
    let count = scheduler.seed().await.context("failed to seed sample data")?;
    tracing::info!(count, "seeded sample events");
  }

  if cli.once {
    let report = scheduler
      .run_now()
      .await
      .context("reconciliation pass panicked")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  if cfg.start_scheduler {
    scheduler.start().await;
  }

  let app = Router::new()
    .nest("/api", uitagenda_api::api_router(AppState::new(scheduler.clone())))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  scheduler.shutdown().await;
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => tracing::info!("shutting down"),
    Err(e) => {
      tracing::error!(error = %e, "cannot listen for ctrl-c, running until killed");
      std::future::pending::<()>().await;
    }
  }
}
