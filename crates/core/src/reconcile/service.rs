//! Reconciliation service - converge and teardown passes

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use blockgate_domain::{
    CapacityError, Domain, DomainSet, ListItems, ManagedNames, ResourceList, Result, Rule,
};
use tracing::{debug, info, instrument, warn};

pub use super::planner::Limits;
use super::context::SyncContext;
use super::planner::{self, IndexedLists, Placement};
use super::ports::GatewayPort;
use super::report::{ConvergeReport, DeletionFailure, ResourceKind, RuleChange, TeardownReport};

/// Reconciliation service
pub struct ReconcileService {
    gateway: Arc<dyn GatewayPort>,
    names: ManagedNames,
    limits: Limits,
}

impl ReconcileService {
    /// Create a service owning the resources named after `prefix`
    pub fn new(gateway: Arc<dyn GatewayPort>, prefix: &str) -> Self {
        Self { gateway, names: ManagedNames::new(prefix), limits: Limits::default() }
    }

    /// Override the capacity bounds (tests use small ones)
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn names(&self) -> &ManagedNames {
        &self.names
    }

    /// Converge remote lists and the managed rule toward `desired`.
    ///
    /// Fails with [`CapacityError`] before any mutation when the desired set
    /// cannot fit, and fails fast on any remote error except orphan deletion.
    #[instrument(skip_all, fields(desired = desired.len(), prefix = %self.names.list_prefix()))]
    pub async fn converge(&self, desired: &DomainSet, ctx: &mut SyncContext) -> Result<ConvergeReport> {
        let limits = self.limits;
        if desired.len() > limits.max_domains() {
            return Err(CapacityError::DomainCeiling { requested: desired.len(), max: limits.max_domains() }.into());
        }

        let mut report = ConvergeReport::new(desired.len());
        let prefix = self.names.list_prefix();
        let lists = self.gateway.list_all(prefix).await?;
        let rules = self.gateway.list_rules(prefix).await?;
        ctx.refresh_inventory(&lists, &rules);
        debug!(lists = lists.len(), rules = rules.len(), "fetched remote inventory");

        let rule = rules.into_iter().find(|rule| rule.name == self.names.rule_name());
        let lists = self.reclaim_orphans(lists, rule.as_ref(), ctx, &mut report).await;

        if lists.len() >= limits.max_lists {
            return Err(CapacityError::ListCeiling { current: lists.len(), max: limits.max_lists }.into());
        }

        let mut active = lists.len();
        let IndexedLists { by_index, unmanaged } = planner::index_lists(&self.names, lists, limits.max_lists);
        for list in &unmanaged {
            warn!(list = %list.name, id = %list.id, "ignoring list with unusable or duplicate index");
        }

        let (hints, mut fresh) = self.collect_hints(&by_index, ctx).await?;
        let mut placement = Placement::from_hints(desired, hints.values().flatten());
        let max_index = limits.max_index(by_index.keys().next_back().copied(), desired.len());
        let mut in_use = Vec::new();

        for index in 1..=limits.max_lists {
            if index > max_index && placement.remaining.is_empty() {
                break;
            }
            if let Some(list) = by_index.get(&index) {
                let hinted = hints.get(&list.id).map(Vec::as_slice);
                let current = fresh.remove(&list.id);
                self.reconcile_existing(list, hinted, current, desired, &mut placement, ctx, &mut report).await?;
                in_use.push(list.id.clone());
            } else if !placement.remaining.is_empty() {
                if active >= limits.max_lists {
                    return Err(unassigned(&placement, active, limits));
                }
                let created = self.create_at(index, &mut placement, ctx).await?;
                report.lists_created += 1;
                active += 1;
                in_use.push(created.id);
            }
        }

        if !placement.remaining.is_empty() {
            return Err(unassigned(&placement, active, limits));
        }

        report.rule = self.converge_rule(rule, &in_use, ctx).await?;
        report.lists_in_use = in_use.len();
        ctx.flush().await;

        info!(
            created = report.lists_created,
            updated = report.lists_updated,
            unchanged = report.lists_unchanged,
            orphans = report.orphans_deleted,
            rule = ?report.rule,
            "converge complete"
        );
        Ok(report)
    }

    /// Delete every managed rule, then every managed list in index order.
    ///
    /// Individual deletion failures are logged and reported, never fatal.
    #[instrument(skip_all, fields(prefix = %self.names.list_prefix()))]
    pub async fn teardown(&self, ctx: &mut SyncContext) -> Result<TeardownReport> {
        let prefix = self.names.list_prefix();
        let mut report = TeardownReport::default();

        for rule in self.gateway.list_rules(prefix).await? {
            match self.gateway.delete_rule(&rule.id).await {
                Ok(()) => {
                    info!(rule = %rule.name, "deleted rule");
                    ctx.forget_rule(&rule.id).await;
                    report.rules_deleted += 1;
                }
                Err(err) => {
                    warn!(rule = %rule.name, error = %err, "failed to delete rule");
                    report.failures.push(failure(ResourceKind::Rule, &rule.id, &rule.name, &err));
                }
            }
        }

        let mut lists = self.gateway.list_all(prefix).await?;
        lists.sort_by_key(|list| {
            let index = self.names.parse_list_name(&list.name).map(|name| name.index());
            (Reverse(index.is_some()), index, list.name.clone())
        });

        for list in lists {
            match self.gateway.delete_list(&list.id).await {
                Ok(()) => {
                    info!(list = %list.name, "deleted list");
                    ctx.forget_list(&list.id).await;
                    report.lists_deleted += 1;
                }
                Err(err) => {
                    warn!(list = %list.name, error = %err, "failed to delete list");
                    report.failures.push(failure(ResourceKind::List, &list.id, &list.name, &err));
                }
            }
        }

        ctx.flush().await;
        info!(rules = report.rules_deleted, lists = report.lists_deleted, failed = report.failures.len(), "teardown complete");
        Ok(report)
    }

    /// Delete lists the managed rule does not reference; returns the rest.
    async fn reclaim_orphans(
        &self,
        lists: Vec<ResourceList>,
        rule: Option<&Rule>,
        ctx: &mut SyncContext,
        report: &mut ConvergeReport,
    ) -> Vec<ResourceList> {
        let orphans: BTreeSet<String> = planner::find_orphans(&lists, rule)
            .into_iter()
            .take(self.limits.max_lists)
            .map(|list| list.id.clone())
            .collect();
        if orphans.is_empty() {
            return lists;
        }
        info!(count = orphans.len(), "deleting orphaned lists");

        let mut kept = Vec::with_capacity(lists.len());
        for list in lists {
            if !orphans.contains(&list.id) {
                kept.push(list);
                continue;
            }
            match self.gateway.delete_list(&list.id).await {
                Ok(()) => {
                    info!(list = %list.name, "deleted orphaned list");
                    ctx.forget_list(&list.id).await;
                    report.orphans_deleted += 1;
                }
                Err(err) => {
                    warn!(list = %list.name, error = %err, "failed to delete orphaned list");
                    report.orphan_failures.push(failure(ResourceKind::List, &list.id, &list.name, &err));
                    kept.push(list);
                }
            }
        }
        kept
    }

    /// Item hints per walked list: cached contents, or a remote read when the
    /// cache has none. Remote reads are also returned whole as `fresh`.
    async fn collect_hints(
        &self,
        by_index: &BTreeMap<usize, ResourceList>,
        ctx: &mut SyncContext,
    ) -> Result<(BTreeMap<String, Vec<Domain>>, BTreeMap<String, ListItems>)> {
        let mut hints = BTreeMap::new();
        let mut fresh = BTreeMap::new();
        for list in by_index.values() {
            let items = match ctx.cached_items(&list.id) {
                Some(items) => items.to_vec(),
                None => {
                    let items = self.gateway.list_items(&list.id).await?;
                    ctx.observe_items(&list.id, items.domains.clone());
                    let domains = items.domains.clone();
                    fresh.insert(list.id.clone(), items);
                    domains
                }
            };
            hints.insert(list.id.clone(), items);
        }
        Ok((hints, fresh))
    }

    #[allow(clippy::too_many_arguments)]
    async fn reconcile_existing(
        &self,
        list: &ResourceList,
        hinted: Option<&[Domain]>,
        fresh: Option<ListItems>,
        desired: &DomainSet,
        placement: &mut Placement,
        ctx: &mut SyncContext,
        report: &mut ConvergeReport,
    ) -> Result<()> {
        // Items read during this pass are already authoritative.
        let (current, hinted) = match fresh {
            Some(items) => (items, None),
            None => (self.gateway.list_items(&list.id).await?, hinted),
        };
        if !current.invalid.is_empty() {
            warn!(list = %list.name, count = current.invalid.len(), "removing invalid items from list");
        }

        let update = planner::plan_existing(&current, hinted, desired, placement, self.limits.max_items);
        if update.is_noop() {
            debug!(list = %list.name, total = update.contents.len(), "list unchanged, skipping update");
            ctx.observe_items(&list.id, update.contents);
            report.lists_unchanged += 1;
            return Ok(());
        }

        let updated = self.gateway.update_list(&list.id, &update.patch).await?;
        info!(
            list = %list.name,
            added = update.patch.append.len(),
            removed = update.patch.remove.len() + update.patch.remove_invalid.len(),
            total = update.contents.len(),
            "updated list"
        );
        let count = update.contents.len();
        ctx.record_list(ResourceList { name: list.name.clone(), count, ..updated }, update.contents).await;
        report.lists_updated += 1;
        Ok(())
    }

    async fn create_at(&self, index: usize, placement: &mut Placement, ctx: &mut SyncContext) -> Result<ResourceList> {
        let name = self.names.list_name(index).to_string();
        let items = placement.take(self.limits.max_items);
        let created = self.gateway.create_list(&name, &items).await?;
        info!(list = %created.name, domains = items.len(), "created list");

        let created = ResourceList { count: items.len(), ..created };
        ctx.record_list(created.clone(), items).await;
        Ok(created)
    }

    async fn converge_rule(&self, rule: Option<Rule>, in_use: &[String], ctx: &mut SyncContext) -> Result<RuleChange> {
        if in_use.is_empty() {
            warn!("no lists in use, leaving rule untouched");
            return Ok(RuleChange::Skipped);
        }

        let rule_name = self.names.rule_name();
        match rule {
            Some(rule) => {
                let wanted: BTreeSet<&str> = in_use.iter().map(String::as_str).collect();
                if wanted == rule.list_id_set() {
                    debug!(rule = %rule.name, "rule references unchanged, skipping update");
                    return Ok(RuleChange::Unchanged);
                }
                let updated = self.gateway.update_rule(&rule.id, rule_name, in_use).await?;
                info!(rule = %updated.name, lists = in_use.len(), "updated rule");
                ctx.record_rule(with_references(updated, in_use)).await;
                Ok(RuleChange::Updated)
            }
            None => {
                let created = self.gateway.create_rule(rule_name, in_use).await?;
                info!(rule = %created.name, lists = in_use.len(), "created rule");
                ctx.record_rule(with_references(created, in_use)).await;
                Ok(RuleChange::Created)
            }
        }
    }
}

fn unassigned(placement: &Placement, lists: usize, limits: Limits) -> blockgate_domain::SyncError {
    CapacityError::Unassigned { unassigned: placement.remaining.len(), lists, max: limits.max_lists }.into()
}

fn failure(kind: ResourceKind, id: &str, name: &str, err: &impl std::fmt::Display) -> DeletionFailure {
    DeletionFailure { kind, id: id.to_owned(), name: name.to_owned(), message: err.to_string() }
}

// The remote echo is trusted for id and name; references are what we sent.
fn with_references(rule: Rule, in_use: &[String]) -> Rule {
    Rule { list_ids: in_use.to_vec(), ..rule }
}
