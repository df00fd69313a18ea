use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use viewstream_common::BasicAuth;

use crate::error::{IngestError, Result};

const KAGGLE_API_URL: &str = "https://www.kaggle.com";

/// Columns the mapper reads. Anything else in the file is ignored.
const REQUIRED_COLUMNS: [&str; 7] = [
    "user_id",
    "datetime",
    "movie_id",
    "duration",
    "title",
    "genres",
    "release_date",
];

/// One raw row of the clickstream CSV, kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetRow {
    pub user_id: String,
    pub datetime: String,
    pub movie_id: String,
    pub duration: String,
    pub title: String,
    pub genres: String,
    pub release_date: String,
}

/// Something that can materialize the dataset into a directory.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    async fn fetch(&self, dest_dir: &Path) -> Result<()>;
}

pub struct DatasetLoader {
    path: PathBuf,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Download the dataset if the file isn't on disk yet.
    pub async fn ensure_present(&self, fetcher: Option<&dyn DatasetFetcher>) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        let Some(fetcher) = fetcher else {
            return Err(IngestError::Dataset(format!(
                "{} not found and downloading is disabled",
                self.path.display()
            )));
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        tracing::info!(dest = %dir.display(), "Downloading dataset");
        fetcher.fetch(&dir).await?;

        if !self.path.exists() {
            return Err(IngestError::Dataset(format!(
                "download finished but {} is still missing",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Read every row. Fails up front if a required column is absent.
    pub fn load(&self) -> Result<Vec<DatasetRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(IngestError::MissingColumn(column.to_string()));
            }
        }

        let rows = reader
            .deserialize::<DatasetRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::info!(path = %self.path.display(), rows = rows.len(), "Dataset loaded");
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Kaggle
// ---------------------------------------------------------------------------

/// Contents of `~/.kaggle/kaggle.json`.
#[derive(Debug, Deserialize)]
struct KaggleJson {
    username: String,
    key: String,
}

/// Read Kaggle credentials from a `kaggle.json` file.
pub fn kaggle_credentials_from_file(path: &Path) -> Result<BasicAuth> {
    let text = std::fs::read_to_string(path)?;
    let parsed: KaggleJson = serde_json::from_str(&text)
        .map_err(|e| IngestError::Dataset(format!("{}: {e}", path.display())))?;
    Ok(BasicAuth::new(parsed.username, parsed.key))
}

/// Downloads a dataset archive from the Kaggle API and unpacks it.
pub struct KaggleFetcher {
    client: reqwest::Client,
    base_url: String,
    dataset: String,
    credentials: BasicAuth,
}

impl KaggleFetcher {
    /// `dataset` is `owner/slug`.
    pub fn new(dataset: &str, credentials: BasicAuth) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self {
            client,
            base_url: KAGGLE_API_URL.to_string(),
            dataset: dataset.trim_matches('/').to_string(),
            credentials,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl DatasetFetcher for KaggleFetcher {
    async fn fetch(&self, dest_dir: &Path) -> Result<()> {
        let url = format!("{}/api/v1/datasets/download/{}", self.base_url, self.dataset);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(IngestError::Download {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        tracing::info!(dataset = %self.dataset, bytes = bytes.len(), "Dataset archive downloaded");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        archive.extract(dest_dir)?;
        tracing::info!(files = archive.len(), dest = %dest_dir.display(), "Dataset archive unpacked");
        Ok(())
    }
}
