//! Static configuration for an ingestion run.
//!
//! A [`Config`] is built once when the process starts and handed to the
//! [`Pipeline`](crate::pipeline::Pipeline). Every field has a default, so an empty or partial
//! TOML file is a valid configuration.
//!
//! ```toml
//! app_name = "elicit-paper-ingestor"
//! log_level = "info"
//!
//! [source]
//! bucket = "paper-sources"
//!
//! [source.s2ag]
//! samples_key = "s2ag/samples/papers/papers-sample.jsonl.gz"
//! samples_local_path = "data/s2ag/samples/papers/papers-sample.jsonl.gz"
//!
//! [output]
//! bucket = "paper-datasets"
//! key = "s2ag/samples/papers/papers-dedup.jsonl.gz"
//! local_path = "data/s2ag/output/papers-dedup.jsonl.gz"
//!
//! [store]
//! kind = "s3"
//! region = "us-east-1"
//! ```

use super::*;

/// Complete configuration of the ingestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Application name, used to prefix log lines
  pub app_name:  String,
  /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`) or any `EnvFilter` directive
  pub log_level: String,
  /// Where raw source records are read from
  pub source:    SourceConfig,
  /// Where the deduplicated dataset is written to
  pub output:    OutputConfig,
  /// Which object store backend to talk to
  pub store:     StoreConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      app_name:  "elicit-paper-ingestor".to_owned(),
      log_level: "info".to_owned(),
      source:    SourceConfig::default(),
      output:    OutputConfig::default(),
      store:     StoreConfig::default(),
    }
  }
}

impl Config {
  /// Parses a configuration from TOML text.
  ///
  /// # Errors
  ///
  /// Returns [`IngestorError::Config`] if the text is not valid TOML or a field has the wrong
  /// type.
  pub fn from_toml_str(text: &str) -> Result<Self, IngestorError> { Ok(toml::from_str(text)?) }

  /// Reads a configuration file, falling back to [`Config::default`] if it does not exist.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, IngestorError> {
    let path = path.as_ref();
    if !path.exists() {
      debug!("No configuration at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    debug!("Loading configuration from {}", path.display());
    let text =
      std::fs::read_to_string(path).map_err(IngestorError::file("reading configuration", path))?;
    Self::from_toml_str(&text)
  }
}

/// Location of the raw source samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
  /// Bucket holding every source feed
  pub bucket: String,
  /// Locations specific to the S2AG feed
  pub s2ag:   S2agConfig,
}

impl Default for SourceConfig {
  fn default() -> Self { Self { bucket: "paper-sources".to_owned(), s2ag: S2agConfig::default() } }
}

/// Locations of the S2AG sample file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct S2agConfig {
  /// Key of the sample inside [`SourceConfig::bucket`]
  pub samples_key:        String,
  /// Local cache path for the sample
  pub samples_local_path: PathBuf,
}

impl Default for S2agConfig {
  fn default() -> Self {
    Self {
      samples_key:        "s2ag/samples/papers/papers-sample.jsonl.gz".to_owned(),
      samples_local_path: PathBuf::from("data/s2ag/samples/papers/papers-sample.jsonl.gz"),
    }
  }
}

/// Destination of the deduplicated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  /// Bucket to publish into
  pub bucket:     String,
  /// Key to publish under
  pub key:        String,
  /// Where the dataset is written before publishing
  pub local_path: PathBuf,
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      bucket:     "paper-datasets".to_owned(),
      key:        "s2ag/samples/papers/papers-dedup.jsonl.gz".to_owned(),
      local_path: PathBuf::from("data/s2ag/output/papers-dedup.jsonl.gz"),
    }
  }
}

/// Object store backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
  /// Amazon S3 or an S3-compatible service
  S3 {
    /// Region override; the AWS default provider chain is used when unset
    #[serde(default)]
    region:       Option<String>,
    /// Endpoint override for S3-compatible services
    #[serde(default)]
    endpoint_url: Option<String>,
  },
  /// A local directory where each bucket is a sub-directory
  Local {
    /// Directory containing the buckets
    root: PathBuf,
  },
}

impl Default for StoreConfig {
  fn default() -> Self { StoreConfig::S3 { region: None, endpoint_url: None } }
}
