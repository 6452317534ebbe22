//! A batch ingestor for academic paper metadata.
//!
//! The crate pulls a sample of raw paper records from an object store, normalizes each record
//! into a canonical [`Paper`], removes duplicates by identifier, and republishes the result as a
//! gzip-compressed JSON-lines dataset.
//!
//! The whole job is a straight line:
//! fetch → parse → normalize → deduplicate → serialize → publish
//!
//! # Example
//! ```rust,no_run
//! use ingestor::{config::Config, pipeline::Pipeline, store::Store};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!   let config = Config::default();
//!   let store = Store::connect(&config.store).await;
//!
//!   let summary = Pipeline::new(config, store).run().await?;
//!   println!("Published {} papers", summary.published);
//!
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::{
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod config;
pub mod dataset;
pub mod dedup;
pub mod errors;
pub mod paper;
pub mod pipeline;
pub mod record;
pub mod sources;
pub mod store;
#[cfg(test)] mod tests;

use config::{Config, StoreConfig};
use errors::IngestorError;
use paper::{Paper, PaperId};
use record::RawRecord;
use sources::{Mode, Normalizer, Source};
use store::ObjectStore;
