//! Object store gateway.
//!
//! The ingestor only needs two operations from remote storage: copy a blob to a local file and
//! copy a local file to a blob. [`ObjectStore`] captures that contract, with two backends:
//!
//! - [`S3Store`] talks to Amazon S3 (or any S3-compatible endpoint) through `aws-sdk-s3`
//! - [`LocalStore`] maps buckets onto sub-directories of a local root, for offline runs
//!
//! [`Store`] picks one of them from the [`StoreConfig`]. Transfers are neither retried nor
//! resumed; any failure is reported as [`IngestorError::Transfer`]. Downloads land in a
//! `<path>.part` sibling first and are renamed once complete, so an interrupted fetch never
//! leaves a truncated file at the cache path.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ingestor::store::{LocalStore, ObjectStore};
//!
//! # async fn example() -> Result<(), ingestor::errors::IngestorError> {
//! let store = LocalStore::new("/srv/buckets");
//! store.fetch("paper-sources", "s2ag/sample.jsonl.gz", Path::new("data/sample.jsonl.gz")).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use aws_sdk_s3::{config::Region, error::DisplayErrorContext, primitives::ByteStream, Client};
use tokio::io::AsyncWriteExt;

use super::*;
use crate::dataset::create_parent_dirs;

/// Blob-to-file and file-to-blob copies against a bucketed store.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
  /// Copies `bucket/key` to `local_path`, creating parent directories as needed.
  async fn fetch(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), IngestorError>;

  /// Copies `local_path` to `bucket/key`, replacing any existing object.
  async fn publish(&self, bucket: &str, local_path: &Path, key: &str)
    -> Result<(), IngestorError>;
}

/// Sibling path used while a download is in flight.
fn partial_path(local_path: &Path) -> PathBuf {
  let mut name = local_path.file_name().unwrap_or_default().to_os_string();
  name.push(".part");
  local_path.with_file_name(name)
}

/// Runs `download` against the part file of `local_path`, then moves the part file into place.
///
/// The part file is removed if any step fails.
async fn download_via_part<F, Fut>(
  bucket: &str,
  key: &str,
  local_path: &Path,
  download: F,
) -> Result<(), IngestorError>
where
  F: FnOnce(PathBuf) -> Fut,
  Fut: Future<Output = Result<(), IngestorError>>,
{
  create_parent_dirs(local_path).map_err(|e| {
    let message = format!("creating parent of {}: {e}", local_path.display());
    IngestorError::transfer(bucket, key, message)
  })?;

  let partial = partial_path(local_path);
  let result = match download(partial.clone()).await {
    Ok(()) => tokio::fs::rename(&partial, local_path).await.map_err(|e| {
      IngestorError::transfer(bucket, key, format!("moving into {}: {e}", local_path.display()))
    }),
    Err(e) => Err(e),
  };

  if result.is_err() && partial.exists() {
    debug!("Removing partial download {}", partial.display());
    if let Err(e) = tokio::fs::remove_file(&partial).await {
      warn!("Could not remove partial download {}: {e}", partial.display());
    }
  }
  result
}

/// Object store backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3Store {
  /// The S3 client used for every request
  client: Client,
}

impl S3Store {
  /// Creates a client from the AWS default provider chain.
  ///
  /// `region` and `endpoint_url` override what the environment provides. Setting an endpoint
  /// also switches to path-style addressing, which most S3-compatible services require.
  pub async fn new(region: Option<String>, endpoint_url: Option<String>) -> Self {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
      loader = loader.region(Region::new(region));
    }
    let sdk_config = loader.load().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint_url) = endpoint_url {
      debug!("Using S3 endpoint {endpoint_url}");
      builder = builder.endpoint_url(endpoint_url).force_path_style(true);
    }
    Self { client: Client::from_conf(builder.build()) }
  }

  /// Wraps an already configured client.
  pub fn with_client(client: Client) -> Self { Self { client } }
}

impl ObjectStore for S3Store {
  async fn fetch(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), IngestorError> {
    info!("Downloading {key} from {bucket} bucket in S3 to {}", local_path.display());
    let object = self
      .client
      .get_object()
      .bucket(bucket)
      .key(key)
      .send()
      .await
      .map_err(|e| IngestorError::transfer(bucket, key, DisplayErrorContext(&e)))?;

    let mut body = object.body;
    download_via_part(bucket, key, local_path, |partial| async move {
      let failed = |e: std::io::Error| {
        IngestorError::transfer(bucket, key, format!("writing {}: {e}", partial.display()))
      };
      let mut file = tokio::fs::File::create(&partial).await.map_err(&failed)?;
      while let Some(chunk) =
        body.try_next().await.map_err(|e| IngestorError::transfer(bucket, key, e))?
      {
        file.write_all(&chunk).await.map_err(&failed)?;
      }
      file.flush().await.map_err(&failed)
    })
    .await
  }

  async fn publish(
    &self,
    bucket: &str,
    local_path: &Path,
    key: &str,
  ) -> Result<(), IngestorError> {
    info!("Uploading {} to {key} in {bucket} bucket in S3", local_path.display());
    let body = ByteStream::from_path(local_path)
      .await
      .map_err(|e| IngestorError::transfer(bucket, key, e))?;

    self
      .client
      .put_object()
      .bucket(bucket)
      .key(key)
      .body(body)
      .send()
      .await
      .map_err(|e| IngestorError::transfer(bucket, key, DisplayErrorContext(&e)))?;
    Ok(())
  }
}

/// Object store backed by a local directory.
///
/// The object `bucket/key` lives at `root/bucket/key`.
#[derive(Debug, Clone)]
pub struct LocalStore {
  /// Directory containing one sub-directory per bucket
  root: PathBuf,
}

impl LocalStore {
  /// Creates a store rooted at `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Path of the object `bucket/key` on disk.
  pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
    self.root.join(bucket).join(key)
  }
}

impl ObjectStore for LocalStore {
  async fn fetch(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), IngestorError> {
    let object = self.object_path(bucket, key);
    info!("Copying {} to {}", object.display(), local_path.display());
    if !object.is_file() {
      return Err(IngestorError::transfer(bucket, key, "object not found"));
    }
    download_via_part(bucket, key, local_path, |partial| async move {
      tokio::fs::copy(&object, &partial)
        .await
        .map(drop)
        .map_err(|e| IngestorError::transfer(bucket, key, e))
    })
    .await
  }

  async fn publish(
    &self,
    bucket: &str,
    local_path: &Path,
    key: &str,
  ) -> Result<(), IngestorError> {
    let object = self.object_path(bucket, key);
    info!("Copying {} to {}", local_path.display(), object.display());
    create_parent_dirs(&object).map_err(|e| IngestorError::transfer(bucket, key, e))?;
    tokio::fs::copy(local_path, &object)
      .await
      .map_err(|e| IngestorError::transfer(bucket, key, e))?;
    Ok(())
  }
}

/// The object store selected by configuration.
#[derive(Debug, Clone)]
pub enum Store {
  /// Amazon S3 or an S3-compatible service
  S3(S3Store),
  /// A local directory
  Local(LocalStore),
}

impl Store {
  /// Builds the backend described by `config`.
  pub async fn connect(config: &StoreConfig) -> Self {
    match config {
      StoreConfig::S3 { region, endpoint_url } =>
        Store::S3(S3Store::new(region.clone(), endpoint_url.clone()).await),
      StoreConfig::Local { root } => Store::Local(LocalStore::new(root)),
    }
  }
}

impl ObjectStore for Store {
  async fn fetch(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), IngestorError> {
    match self {
      Store::S3(store) => store.fetch(bucket, key, local_path).await,
      Store::Local(store) => store.fetch(bucket, key, local_path).await,
    }
  }

  async fn publish(
    &self,
    bucket: &str,
    local_path: &Path,
    key: &str,
  ) -> Result<(), IngestorError> {
    match self {
      Store::S3(store) => store.publish(bucket, local_path, key).await,
      Store::Local(store) => store.publish(bucket, local_path, key).await,
    }
  }
}
