//! In-memory cache mirror threaded through a pass
//!
//! The engine records a change here only after the remote call that caused it
//! returned successfully. Every recorded mutation is persisted right away;
//! persistence failures are logged and never abort the pass.

use std::collections::BTreeSet;
use std::sync::Arc;

use blockgate_domain::{CacheSnapshot, Domain, ResourceList, Rule};
use tracing::{debug, warn};

use super::ports::CacheStore;

pub struct SyncContext {
    snapshot: CacheSnapshot,
    store: Arc<dyn CacheStore>,
    failed_saves: usize,
}

impl SyncContext {
    /// Load the stored snapshot into a new context.
    pub async fn load(store: Arc<dyn CacheStore>) -> Self {
        let snapshot = store.load().await;
        debug!(lists = snapshot.lists.len(), mapped = snapshot.mapping.len(), "cache loaded");
        Self::new(store, snapshot)
    }

    pub fn new(store: Arc<dyn CacheStore>, snapshot: CacheSnapshot) -> Self {
        Self { snapshot, store, failed_saves: 0 }
    }

    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }

    pub fn cached_items(&self, list_id: &str) -> Option<&[Domain]> {
        self.snapshot.items(list_id)
    }

    /// Number of saves that failed during this context's lifetime.
    pub fn failed_saves(&self) -> usize {
        self.failed_saves
    }

    /// Replace the list and rule mirror with a fresh remote inventory.
    ///
    /// Item mappings of lists that no longer exist are dropped. Nothing is
    /// persisted until the next recorded mutation or [`Self::flush`].
    pub fn refresh_inventory(&mut self, lists: &[ResourceList], rules: &[Rule]) {
        let live: BTreeSet<&str> = lists.iter().map(|list| list.id.as_str()).collect();
        self.snapshot.mapping.retain(|id, _| live.contains(id.as_str()));
        self.snapshot.lists = lists.to_vec();
        self.snapshot.rules = rules.to_vec();
    }

    /// Remember items read from the remote without persisting.
    pub fn observe_items(&mut self, list_id: &str, items: Vec<Domain>) {
        self.snapshot.set_items(list_id, items);
    }

    /// A list was created or updated remotely with `items` as its contents.
    pub async fn record_list(&mut self, list: ResourceList, items: Vec<Domain>) {
        self.snapshot.set_items(&list.id, items);
        self.snapshot.upsert_list(list);
        self.flush().await;
    }

    /// A list was deleted remotely.
    pub async fn forget_list(&mut self, list_id: &str) {
        self.snapshot.remove_list(list_id);
        self.flush().await;
    }

    /// A rule was created or updated remotely.
    pub async fn record_rule(&mut self, rule: Rule) {
        self.snapshot.upsert_rule(rule);
        self.flush().await;
    }

    /// A rule was deleted remotely.
    pub async fn forget_rule(&mut self, rule_id: &str) {
        self.snapshot.remove_rule(rule_id);
        self.flush().await;
    }

    /// Persist the current snapshot.
    pub async fn flush(&mut self) {
        if let Err(err) = self.store.save(&self.snapshot).await {
            self.failed_saves += 1;
            warn!(error = %err, "failed to persist cache, continuing without it");
        }
    }

    /// Drop the stored snapshot, keeping the in-memory mirror.
    pub async fn discard(&mut self) {
        if let Err(err) = self.store.invalidate().await {
            warn!(error = %err, "failed to invalidate cache");
        }
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("lists", &self.snapshot.lists.len())
            .field("rules", &self.snapshot.rules.len())
            .field("mapped", &self.snapshot.mapping.len())
            .field("failed_saves", &self.failed_saves)
            .finish()
    }
}
