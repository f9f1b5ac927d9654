//! Asset provisioning for the voice directory
//!
//! Guarantees the model weights, model metadata, and inference helper
//! exist under the voice directory, fetching any missing file over HTTPS.
//! Files already present are never touched and never re-validated; a
//! failed fetch leaves nothing behind.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::{Error, Result};

/// A single asset identified by its filename under the voice directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    /// Filename, also the path suffix on the download endpoint
    pub filename: String,
}

impl AssetSpec {
    /// Create a spec for the given filename
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// Download URL for this asset under the given base
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.filename)
    }
}

/// Ensures the fixed asset set exists under the voice directory
#[derive(Debug, Clone)]
pub struct AssetProvisioner {
    voice_dir: PathBuf,
    base_url: String,
    assets: Vec<AssetSpec>,
    client: reqwest::Client,
}

impl AssetProvisioner {
    /// Create a provisioner over an explicit directory, base URL, and file set
    #[must_use]
    pub fn new(
        voice_dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
        files: &[String],
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("voicerig/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            voice_dir: voice_dir.into(),
            base_url: base_url.into(),
            assets: files.iter().map(AssetSpec::new).collect(),
            client,
        }
    }

    /// Create a provisioner from the loaded configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.voice_dir.clone(),
            config.assets.base_url.clone(),
            &config.assets.files,
        )
    }

    /// The assets this provisioner manages
    #[must_use]
    pub fn assets(&self) -> &[AssetSpec] {
        &self.assets
    }

    /// Ensure every asset exists, downloading the missing ones
    ///
    /// Directory creation is idempotent. Per-asset download failures are
    /// logged and skipped; provisioning always moves on to the next file.
    /// Returns the number of files actually downloaded.
    ///
    /// # Errors
    ///
    /// Returns error only if the voice directory cannot be created.
    pub async fn ensure_all(&self) -> Result<usize> {
        tokio::fs::create_dir_all(&self.voice_dir)
            .await
            .map_err(|e| {
                Error::Provision(format!(
                    "failed to create voice directory {}: {e}",
                    self.voice_dir.display()
                ))
            })?;

        let mut fetched = 0;
        for asset in &self.assets {
            let dest = self.voice_dir.join(&asset.filename);
            if dest.is_file() {
                tracing::debug!(file = %asset.filename, "asset already present");
                continue;
            }

            match self.fetch(asset, &dest).await {
                Ok(()) => {
                    tracing::info!(file = %asset.filename, "asset downloaded");
                    fetched += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        file = %asset.filename,
                        error = %e,
                        "asset download failed, continuing"
                    );
                }
            }
        }

        Ok(fetched)
    }

    /// Stream one asset to disk
    ///
    /// Downloads into a `.part` file and renames on completion so a failed
    /// transfer never leaves a destination file behind.
    async fn fetch(&self, asset: &AssetSpec, dest: &Path) -> Result<()> {
        let url = asset.url(&self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Provision(format!(
                "{url} returned HTTP {}",
                response.status()
            )));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = dest.with_file_name(format!("{}.part", asset.filename));
        let result = stream_to_file(response, &part).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&part).await;
            return result;
        }

        tokio::fs::rename(&part, dest).await?;
        Ok(())
    }
}

/// Write a response body to disk chunk by chunk
async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(())
}
