//! Pure planning helpers for a reconciliation pass
//!
//! Nothing here talks to the gateway; the service feeds remote reads in and
//! issues whatever these functions decide.

use std::collections::BTreeMap;

use blockgate_domain::constants::{MAX_LISTS, MAX_LIST_ITEMS};
use blockgate_domain::{Domain, DomainSet, ListItems, ListPatch, ManagedNames, ResourceList, Rule};

/// Capacity bounds a pass plans against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_lists: usize,
    pub max_items: usize,
}

impl Limits {
    /// Largest desired set that can be placed at all.
    pub fn max_domains(&self) -> usize {
        self.max_lists.saturating_mul(self.max_items)
    }

    pub fn lists_needed(&self, domains: usize) -> usize {
        domains.div_ceil(self.max_items.max(1))
    }

    /// Upper end of the index range walked unconditionally.
    ///
    /// Covers every existing index and enough lists to hold `desired` items,
    /// capped at `max_lists`.
    pub fn max_index(&self, highest_existing: Option<usize>, desired: usize) -> usize {
        highest_existing.unwrap_or(0).max(self.lists_needed(desired)).min(self.max_lists)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_lists: MAX_LISTS, max_items: MAX_LIST_ITEMS }
    }
}

/// Lists not referenced by the managed rule.
///
/// Without a rule every list under the prefix is an orphan.
pub fn find_orphans<'a>(lists: &'a [ResourceList], rule: Option<&Rule>) -> Vec<&'a ResourceList> {
    lists.iter().filter(|list| !rule.is_some_and(|rule| rule.references(&list.id))).collect()
}

/// Managed lists keyed by the index in their name.
#[derive(Debug, Default)]
pub struct IndexedLists {
    pub by_index: BTreeMap<usize, ResourceList>,
    /// Lists under the prefix that cannot be walked: unparsable names,
    /// duplicate indices or indices beyond `max_lists`
    pub unmanaged: Vec<ResourceList>,
}

pub fn index_lists(names: &ManagedNames, lists: Vec<ResourceList>, max_lists: usize) -> IndexedLists {
    let mut indexed = IndexedLists::default();
    for list in lists {
        match names.parse_list_name(&list.name) {
            Some(name) if name.index() <= max_lists && !indexed.by_index.contains_key(&name.index()) => {
                indexed.by_index.insert(name.index(), list);
            }
            _ => indexed.unmanaged.push(list),
        }
    }
    indexed
}

/// Domains still to place plus those already placed during this pass.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    pub remaining: DomainSet,
    pub placed: DomainSet,
}

impl Placement {
    /// `desired` minus everything the hints claim is already stored.
    pub fn from_hints<'a>(desired: &DomainSet, hinted: impl IntoIterator<Item = &'a Domain>) -> Self {
        let mut remaining = desired.clone();
        for domain in hinted {
            remaining.remove(domain);
        }
        Self { remaining, placed: DomainSet::new() }
    }

    /// Move up to `count` domains from `remaining` to `placed`, lexical order.
    pub fn take(&mut self, count: usize) -> Vec<Domain> {
        let mut taken = Vec::with_capacity(count.min(self.remaining.len()));
        while taken.len() < count {
            let Some(domain) = self.remaining.pop_first() else { break };
            self.placed.insert(domain.clone());
            taken.push(domain);
        }
        taken
    }
}

/// Patch to apply to an existing list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListUpdate {
    pub patch: ListPatch,
    /// Contents after the patch
    pub contents: Vec<Domain>,
}

impl ListUpdate {
    pub fn is_noop(&self) -> bool {
        self.patch.is_empty()
    }
}

/// Plan the patch for a list whose authoritative items are `current`.
///
/// Items that are no longer desired, or were already placed in an earlier
/// list this pass, are removed, and so is every value that is not a valid
/// domain. Domains `hinted` for this list but absent from `current` go back
/// to `remaining`. Free room is topped up from `remaining`.
pub fn plan_existing(
    current: &ListItems,
    hinted: Option<&[Domain]>,
    desired: &DomainSet,
    placement: &mut Placement,
    max_items: usize,
) -> ListUpdate {
    let stored: DomainSet = current.domains.iter().cloned().collect();

    for domain in hinted.unwrap_or_default() {
        if !stored.contains(domain) && desired.contains(domain) && !placement.placed.contains(domain) {
            placement.remaining.insert(domain.clone());
        }
    }

    let mut remove = Vec::new();
    let mut kept = DomainSet::new();
    for domain in stored {
        if desired.contains(&domain) && !placement.placed.contains(&domain) {
            kept.insert(domain);
        } else {
            remove.push(domain);
        }
    }
    for domain in &kept {
        placement.remaining.remove(domain);
        placement.placed.insert(domain.clone());
    }

    let append = placement.take(max_items.saturating_sub(kept.len()));
    kept.extend(append.iter().cloned());

    let patch = ListPatch { remove, remove_invalid: current.invalid.clone(), append };
    ListUpdate { patch, contents: kept.into_iter().collect() }
}
