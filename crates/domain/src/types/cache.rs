//! Local mirror of remote state
//!
//! The snapshot is a hint: it tells the engine which lists probably exist and
//! what they recently contained. Remote reads always win for a list about to
//! be mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Domain, ResourceList, Rule};

/// Persisted cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSnapshot {
    pub lists: Vec<ResourceList>,
    pub rules: Vec<Rule>,
    pub mapping: BTreeMap<String, Vec<Domain>>,
}

impl CacheSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.rules.is_empty() && self.mapping.is_empty()
    }

    pub fn items(&self, list_id: &str) -> Option<&[Domain]> {
        self.mapping.get(list_id).map(Vec::as_slice)
    }

    /// Insert or replace list metadata by id.
    pub fn upsert_list(&mut self, list: ResourceList) {
        match self.lists.iter_mut().find(|existing| existing.id == list.id) {
            Some(existing) => *existing = list,
            None => self.lists.push(list),
        }
    }

    pub fn set_items(&mut self, list_id: &str, items: Vec<Domain>) {
        self.mapping.insert(list_id.to_owned(), items);
    }

    /// Drop a list and its item mapping.
    pub fn remove_list(&mut self, list_id: &str) {
        self.lists.retain(|list| list.id != list_id);
        self.mapping.remove(list_id);
    }

    /// Insert or replace a rule by id.
    pub fn upsert_rule(&mut self, rule: Rule) {
        match self.rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn remove_rule(&mut self, rule_id: &str) {
        self.rules.retain(|rule| rule.id != rule_id);
    }
}
