use std::path::Path;

use async_trait::async_trait;
use blockgate_core::DomainSource;
use blockgate_domain::{DomainSet, Result, SourcesConfig, SyncError};
use tracing::{debug, info};

use super::converter;
use super::downloader::{fallback_path, Downloader};
use super::url_list::read_url_file;

/// Block and allow lists as configured in [`SourcesConfig`].
pub struct ListSources {
    config: SourcesConfig,
    downloader: Downloader,
}

impl ListSources {
    pub fn new(config: SourcesConfig, downloader: Downloader) -> Self {
        Self { config, downloader }
    }

    async fn collect(
        &self,
        url_file: &Path,
        extra_urls: &[String],
        fallback_base: &Path,
        inline: Option<&str>,
        dynamic_file: &Path,
    ) -> Result<String> {
        let mut urls = read_url_file(url_file).await?;
        urls.extend(extra_urls.iter().cloned());

        let mut parts = Vec::with_capacity(urls.len() + 1);
        for (index, url) in urls.iter().enumerate() {
            parts.push(self.downloader.fetch_with_fallback(url, &fallback_path(fallback_base, index)).await?);
        }
        parts.push(match inline {
            Some(content) => content.to_owned(),
            None => read_optional(dynamic_file).await?,
        });
        Ok(parts.join("\n"))
    }
}

async fn read_optional(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no dynamic list file");
            Ok(String::new())
        }
        Err(err) => Err(SyncError::Source(format!("failed to read {}: {err}", path.display()))),
    }
}

#[async_trait]
impl DomainSource for ListSources {
    async fn desired_domains(&self) -> Result<DomainSet> {
        let config = &self.config;
        let block = self
            .collect(
                &config.adlist_file,
                &config.adlist_urls,
                &config.adlist_fallback,
                config.dynamic_blacklist.as_deref(),
                &config.dynamic_blacklist_file,
            )
            .await?;
        let allow = self
            .collect(
                &config.whitelist_file,
                &config.whitelist_urls,
                &config.whitelist_fallback,
                config.dynamic_whitelist.as_deref(),
                &config.dynamic_whitelist_file,
            )
            .await?;

        let domains = converter::convert(&block, &allow);
        info!(domains = domains.len(), "desired domain set built");
        Ok(domains)
    }
}
