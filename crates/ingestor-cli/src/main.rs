//! Batch job that republishes a deduplicated sample of academic paper metadata.
//!
//! The job takes no arguments. Configuration is read from `paper-ingestor.toml` in the working
//! directory when that file exists; otherwise built-in defaults are used.

use clap::Parser;
use errors::IngestorCliError;
use ingestor::{config::Config, pipeline::Pipeline, store::Store};
use tracing::{error, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

pub mod errors;

/// File the configuration is read from, relative to the working directory.
const CONFIG_FILE: &str = "paper-ingestor.toml";

#[derive(Parser)]
#[command(
  author,
  version,
  about = "Fetch, normalize, deduplicate, and republish a sample of paper metadata",
  long_about = None
)]
struct Cli {}

/// Setup logging at the configured level, letting `RUST_LOG` take precedence
fn setup_logging(level: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), IngestorCliError> {
  Cli::parse();

  let config_path = std::env::current_dir()?.join(CONFIG_FILE);
  let config = match Config::load(&config_path) {
    Ok(config) => config,
    Err(e) => {
      setup_logging(&Config::default().log_level);
      error!("Could not load configuration from {}: {e}", config_path.display());
      return Err(e.into());
    },
  };
  setup_logging(&config.log_level);

  let span = info_span!("app", name = %config.app_name);
  run(config).instrument(span).await
}

/// Runs the ingestion pipeline once with the given configuration
async fn run(config: Config) -> Result<(), IngestorCliError> {
  info!("Starting with configuration: {config:?}");
  let store = Store::connect(&config.store).await;

  match Pipeline::new(config, store).run().await {
    Ok(summary) => {
      info!(
        "Published {} papers ({} duplicates dropped out of {})",
        summary.published, summary.duplicates, summary.loaded
      );
      Ok(())
    },
    Err(e) => {
      error!("Ingestion failed: {e}");
      Err(e.into())
    },
  }
}
