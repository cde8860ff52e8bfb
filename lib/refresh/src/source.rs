//! Where adverts come from.

use advertx_core::RawAdvert;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::DataSourceError;

pub type Result<T> = std::result::Result<T, DataSourceError>;

/// The external store holding the adverts.
///
/// Each call returns the full current batch or fails; how the connection is
/// set up and torn down is up to the implementation.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

fn decode_batch(data: &[u8]) -> Result<Vec<RawAdvert>> {
    serde_json::from_slice(data).map_err(|e| DataSourceError::Malformed(e.to_string()))
}

/// Reads a JSON array of advert rows from a file, e.g. a periodic table dump.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            DataSourceError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        decode_batch(&data)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Fetches a JSON array of advert rows with an HTTP GET.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_all(&self) -> Result<Vec<RawAdvert>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| DataSourceError::Unavailable(format!("Failed to fetch adverts: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DataSourceError::Unavailable(format!("Failed to read adverts: {}", e)))?;

        decode_batch(&bytes)
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}
