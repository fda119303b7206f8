//! plat server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API. The `ingest-*`
//! subcommands run an ETL pass against the same store and exit.

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use plat_api::{api_router, AppState, ServerConfig};
use plat_campaign::send::PreviewTransport;
use plat_etl::{
  adapter::SourceDescriptor,
  csv_file::CsvFileAdapter,
  feature_service::FeatureServiceAdapter,
  runner::{run, EtlOptions},
};
use plat_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "plat parcel outreach server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: std::path::PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Page the Kent County, MI feature service into the store.
  IngestKent {
    #[arg(long, default_value_t = 2000)]
    page_size:    usize,
    #[arg(long, default_value_t = 999)]
    max_pages:    usize,
    #[arg(long, default_value_t = 0)]
    start_offset: usize,
  },
  /// Import an Ottawa County, MI "Parcel Data Export" file into the store.
  IngestOttawa {
    /// Path to the export file.
    #[arg(long)]
    path: std::path::PathBuf,
  },
  /// Import an assessor CSV export into the store.
  IngestCsv {
    /// Path to the CSV file.
    #[arg(long)]
    path:   std::path::PathBuf,
    #[arg(long)]
    county: String,
    #[arg(long, default_value = "MI")]
    state:  String,
    /// Provenance string stored on each row.
    #[arg(long)]
    source: String,
  },
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PLAT"))
    .build()
    .context("failed to read config file")?;
  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(server_cfg, store).await,
    Command::IngestKent {
      page_size,
      max_pages,
      start_offset,
    } => {
      let adapter = FeatureServiceAdapter::kent_mi();
      let options = EtlOptions {
        page_size,
        max_pages,
        start_offset,
        page_delay: Duration::from_millis(500),
      };
      let summary = run(&store, &adapter, &options)
        .await
        .context("kent ingest failed")?;
      println!(
        "ingest complete: {} pages, {} rows ({} created, {} updated, {} skipped)",
        summary.pages,
        summary.rows_seen,
        summary.outcome.created,
        summary.outcome.updated,
        summary.rows_skipped,
      );
      Ok(())
    }
    Command::IngestOttawa { path } => {
      let adapter = CsvFileAdapter::ottawa_mi(&path)
        .with_context(|| format!("failed to open {path:?}"))?;
      ingest_csv(&store, &adapter).await
    }
    Command::IngestCsv {
      path,
      county,
      state,
      source,
    } => {
      let adapter = CsvFileAdapter::open(&path, SourceDescriptor {
        source_id: source,
        county,
        state,
        label: path.display().to_string(),
      })
      .with_context(|| format!("failed to open {path:?}"))?;
      ingest_csv(&store, &adapter).await
    }
  }
}

async fn ingest_csv(store: &SqliteStore, adapter: &CsvFileAdapter) -> anyhow::Result<()> {
  let summary = run(store, adapter, &EtlOptions::default())
    .await
    .context("csv ingest failed")?;
  println!(
    "ingest complete: {} rows ({} created, {} updated, {} skipped)",
    summary.rows_seen,
    summary.outcome.created,
    summary.outcome.updated,
    summary.rows_skipped,
  );
  Ok(())
}

async fn serve(server_cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let state = AppState {
    store:     Arc::new(store),
    transport: Arc::new(PreviewTransport),
    outbox:    Arc::new(server_cfg.outbox()),
  };

  let app = api_router(state)
    .layer(tower_http::trace::TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
