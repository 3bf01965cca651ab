//! `metasync` — keeps an asset registry in step with a database catalog.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `METASYNC_*` environment variables, then runs the synchronizer until
//! interrupted.
//!
//! ```
//! metasync --config /etc/metasync/config.toml
//! metasync --once --dry-run
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use metasync_connector::{CatalogBackend, Settings, Startup};
use metasync_core::{cursor::Cursor, pass::ExtractionPass, synchronizer::Synchronizer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Catalog metadata synchronizer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run a single pass and exit.
  #[arg(long)]
  once: bool,

  /// Print assets to stdout instead of pushing them; state stays in memory.
  #[arg(long)]
  dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config).context("failed to read configuration")?;
  let connector = match settings.startup().context("invalid configuration")? {
    Startup::Enabled(connector) => connector,
    Startup::Disabled => {
      tracing::info!("asset synchronization is disabled (assets.enabled = false)");
      return Ok(());
    }
  };

  let (state, sink) = settings.backends(cli.dry_run).await?;

  let connection = &connector.connection;
  let catalog = CatalogBackend::from_connection(connection);
  let cursor = Cursor::new(state, connector.assets.connector_id.as_str());
  let pass =
    ExtractionPass::new(catalog, cursor, &connection.database, &connection.host);
  let sync = Arc::new(Synchronizer::from_config(pass, sink, &connector.assets));

  if cli.once {
    let report = sync.run_once().await.context("synchronization pass failed")?;
    if !report.is_clean() {
      tracing::warn!(failures = report.failures.len(), "pass skipped some objects");
    }
    return Ok(());
  }

  tracing::info!(
    connector_id = %connector.assets.connector_id,
    driver = ?connection.driver,
    database = %connection.database,
    "starting connector"
  );
  let handle = sync.clone().spawn();

  tokio::signal::ctrl_c()
    .await
    .context("failed to listen for shutdown signal")?;
  sync.stop();

  handle.await.context("synchronizer task failed")??;
  Ok(())
}
