//! List downloads with local fallback copies

use std::path::{Path, PathBuf};
use std::time::Duration;

use blockgate_common::resilience::RetryConfig;
use blockgate_domain::{Result, SyncError};
use tracing::{info, instrument, warn};
use url::Url;

use crate::api::ApiError;
use crate::http::{HttpClient, HttpRequest, Retrying, Transport};

const USER_AGENT: &str = "Mozilla/5.0";

/// Fallback copy for the `index`-th URL of a list: `base`, `base.1`, `base.2`, ...
pub fn fallback_path(base: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Downloads list files through its own retrying transport.
pub struct Downloader {
    transport: Retrying<HttpClient>,
}

impl Downloader {
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the HTTP client cannot be created.
    pub fn new(timeout: Duration, retry: RetryConfig) -> std::result::Result<Self, ApiError> {
        let client = HttpClient::builder().timeout(timeout).user_agent(USER_AGENT).build()?;
        Ok(Self { transport: Retrying::new(client, retry) })
    }

    /// Body of `url` as text.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|err| SyncError::Source(format!("invalid list url {url:?}: {err}")))?;
        let response = self.transport.send(&HttpRequest::get(parsed)).await?;
        let body = response.text();
        info!(bytes = body.len(), "downloaded list");
        Ok(body)
    }

    /// Download `url`, refreshing the copy at `fallback`; on failure read the copy instead.
    ///
    /// # Errors
    /// Returns `SyncError::Source` when the download fails and no copy exists.
    pub async fn fetch_with_fallback(&self, url: &str, fallback: &Path) -> Result<String> {
        match self.fetch(url).await {
            Ok(body) => {
                if let Err(err) = write_copy(fallback, &body).await {
                    warn!(path = %fallback.display(), error = %err, "failed to refresh fallback copy");
                }
                Ok(body)
            }
            Err(download_err) => match tokio::fs::read_to_string(fallback).await {
                Ok(body) => {
                    warn!(
                        %url,
                        path = %fallback.display(),
                        error = %download_err,
                        "download failed, using fallback copy"
                    );
                    Ok(body)
                }
                Err(_) => Err(SyncError::Source(format!(
                    "download of {url} failed and no fallback copy exists at {}: {download_err}",
                    fallback.display()
                ))),
            },
        }
    }
}

async fn write_copy(path: &Path, body: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await
}
