use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blockgate_core::CacheStore;
use blockgate_domain::{CacheSnapshot, Result, SyncError};
use tracing::{debug, warn};

/// Cache snapshot stored as one pretty-printed JSON file.
///
/// Saves go through a sibling temp file and a rename, so a crash never
/// leaves a half-written cache behind.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "cache.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> SyncError {
        SyncError::CacheIo(format!("failed to {action} {}: {err}", self.path.display()))
    }
}

#[async_trait]
impl CacheStore for JsonFileCache {
    async fn load(&self) -> CacheSnapshot {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache file, starting empty");
                return CacheSnapshot::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cache file unreadable, starting empty");
                return CacheSnapshot::default();
            }
        };

        match serde_json::from_slice::<CacheSnapshot>(&contents) {
            Ok(snapshot) => {
                debug!(
                    path = %self.path.display(),
                    lists = snapshot.lists.len(),
                    rules = snapshot.rules.len(),
                    "loaded cache"
                );
                snapshot
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cache file corrupt, starting empty");
                CacheSnapshot::default()
            }
        }
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let body = serde_json::to_vec_pretty(snapshot)
            .map_err(|err| SyncError::CacheIo(format!("failed to encode cache: {err}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|err| self.io_error("create directory for", err))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body).await.map_err(|err| self.io_error("write", err))?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|err| self.io_error("replace", err))?;
        debug!(path = %self.path.display(), bytes = body.len(), "saved cache");
        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "cache file removed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error("remove", err)),
        }
    }
}
