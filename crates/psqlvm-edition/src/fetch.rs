//! Source archive download.

use async_trait::async_trait;
use futures_util::StreamExt;
use psqlvm_config::{SourceConfig, archive_url};
use psqlvm_core::{EditionId, Error, Fix, Result};
use psqlvm_ui::Output;
use reqwest::{Client, StatusCode};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::fsutil::remove_file_if_exists;

/// Retrieves source archives.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Download the archive for `edition` to `dest`.
    ///
    /// On failure nothing may be left at `dest`.
    async fn fetch(&self, edition: &EditionId, dest: &Path) -> Result<()>;
}

/// Fetches archives over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    output: Output,
}

impl HttpFetcher {
    /// Create a fetcher for a mirror base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("psqlvm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            output: Output::default(),
        })
    }

    /// Create a fetcher from the `[source]` settings.
    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        Self::new(source.base_url.clone(), source.timeout)
    }

    /// Report progress through `output`.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Archive URL for an edition.
    pub fn url_for(&self, edition: &EditionId) -> String {
        archive_url(&self.base_url, edition)
    }

    async fn download(&self, url: &str, edition: &EditionId, part: &Path) -> Result<u64> {
        let transport = |e: reqwest::Error| Error::Transport {
            url: url.to_string(),
            source: Box::new(e),
        };

        let spinner = self.output.spinner(format!("Connecting for {}...", edition));
        debug!("Downloading from {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                spinner.finish_error(format!("Failed to reach {}", url));
                return Err(transport(e));
            }
        };

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            spinner.finish_error(format!("Download of {} failed", edition));
            return Err(Error::Download {
                url: url.to_string(),
                status,
                fixes: vec![Fix::new(format!(
                    "Check that PostgreSQL {} is published at {}",
                    edition, self.base_url
                ))],
            });
        }
        spinner.finish_clear();

        let total_size = response.content_length().unwrap_or(0);
        let progress = (total_size > 0)
            .then(|| self.output.progress(total_size, format!("Downloading {}", edition)));

        let mut file =
            File::create(part).map_err(|e| Error::io("failed to create download file", part, e))?;

        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport)?;
            file.write_all(&chunk)
                .map_err(|e| Error::io("failed to write download data", part, e))?;
            downloaded += chunk.len() as u64;
            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }
        file.flush()
            .map_err(|e| Error::io("failed to write download data", part, e))?;

        if let Some(pb) = progress {
            pb.finish(format!(
                "Downloaded {} ({:.1} MB)",
                edition,
                downloaded as f64 / 1_000_000.0
            ));
        }
        Ok(downloaded)
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, edition: &EditionId, dest: &Path) -> Result<()> {
        let url = self.url_for(edition);
        let part = part_path(dest);

        match self.download(&url, edition, &part).await {
            Ok(bytes) => {
                fs::rename(&part, dest)
                    .map_err(|e| Error::io("failed to finalize download", dest, e))?;
                debug!(bytes, path = %dest.display(), "archive saved");
                Ok(())
            }
            Err(err) => {
                for leftover in [part.as_path(), dest] {
                    if let Err(e) = remove_file_if_exists(leftover) {
                        warn!("could not clean up {}: {}", leftover.display(), e);
                    }
                }
                Err(err)
            }
        }
    }
}

/// Temporary path an archive is streamed to before it is complete.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
