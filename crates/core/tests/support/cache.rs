//! In-memory `CacheStore`

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use blockgate_core::CacheStore;
use blockgate_domain::{CacheSnapshot, Result as DomainResult, SyncError};
use parking_lot::Mutex;

/// Keeps the last saved snapshot and counts saves.
#[derive(Default)]
pub struct MemoryCache {
    stored: Mutex<Option<CacheSnapshot>>,
    saves: AtomicUsize,
    invalidations: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryCache {
    pub fn with_snapshot(snapshot: CacheSnapshot) -> Self {
        Self { stored: Mutex::new(Some(snapshot)), ..Self::default() }
    }

    pub fn stored(&self) -> Option<CacheSnapshot> {
        self.stored.lock().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }

    /// Forget the stored snapshot without counting an invalidation.
    pub fn clear(&self) {
        *self.stored.lock() = None;
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn load(&self) -> CacheSnapshot {
        self.stored.lock().clone().unwrap_or_default()
    }

    async fn save(&self, snapshot: &CacheSnapshot) -> DomainResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SyncError::CacheIo("disk full".into()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock() = Some(snapshot.clone());
        Ok(())
    }

    async fn invalidate(&self) -> DomainResult<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock() = None;
        Ok(())
    }
}
