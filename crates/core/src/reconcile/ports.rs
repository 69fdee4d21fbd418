//! Port interfaces for reconciliation

use async_trait::async_trait;
use blockgate_domain::{CacheSnapshot, Domain, DomainSet, ListItems, ListPatch, ResourceList, Result, Rule};

/// Typed operations against the remote gateway
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// All lists whose name starts with `prefix`
    async fn list_all(&self, prefix: &str) -> Result<Vec<ResourceList>>;

    /// Current items of a list, read from the remote
    async fn list_items(&self, list_id: &str) -> Result<ListItems>;

    async fn create_list(&self, name: &str, items: &[Domain]) -> Result<ResourceList>;

    /// Remove and append items in one patch
    async fn update_list(&self, list_id: &str, patch: &ListPatch) -> Result<ResourceList>;

    async fn delete_list(&self, list_id: &str) -> Result<()>;

    /// All rules whose name starts with `prefix`
    async fn list_rules(&self, prefix: &str) -> Result<Vec<Rule>>;

    async fn create_rule(&self, name: &str, list_ids: &[String]) -> Result<Rule>;

    async fn update_rule(&self, rule_id: &str, name: &str, list_ids: &[String]) -> Result<Rule>;

    async fn delete_rule(&self, rule_id: &str) -> Result<()>;
}

/// Durable storage for the local cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the snapshot; absent or unreadable storage yields an empty one
    async fn load(&self) -> CacheSnapshot;

    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;

    /// Remove the stored snapshot entirely
    async fn invalidate(&self) -> Result<()>;
}

/// Producer of the desired domain set
#[async_trait]
pub trait DomainSource: Send + Sync {
    async fn desired_domains(&self) -> Result<DomainSet>;
}
