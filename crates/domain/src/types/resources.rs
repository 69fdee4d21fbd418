//! Remote gateway resources

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::domain_name::Domain;

static LIST_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z0-9_-]+)").expect("LIST_REFERENCE should compile - this is a bug")
});

/// Metadata of a remote domain list.
///
/// Item contents travel separately (see `CacheSnapshot::mapping`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: usize,
}

/// Contents of a remote list as read back from the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItems {
    pub domains: Vec<Domain>,
    /// Stored values that do not parse as a domain; they still take up room
    pub invalid: Vec<String>,
}

impl ListItems {
    pub fn len(&self) -> usize {
        self.domains.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.invalid.is_empty()
    }
}

impl From<Vec<Domain>> for ListItems {
    fn from(domains: Vec<Domain>) -> Self {
        Self { domains, invalid: Vec::new() }
    }
}

/// One remove-and-append patch of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPatch {
    pub remove: Vec<Domain>,
    /// Raw values dropped alongside `remove`
    pub remove_invalid: Vec<String>,
    pub append: Vec<Domain>,
}

impl ListPatch {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.remove_invalid.is_empty() && self.append.is_empty()
    }

    /// Values the gateway is asked to remove, in request order.
    pub fn removed_values(&self) -> impl Iterator<Item = &str> {
        self.remove.iter().map(Domain::as_str).chain(self.remove_invalid.iter().map(String::as_str))
    }
}

/// A block rule referencing lists by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub list_ids: Vec<String>,
}

impl Rule {
    /// Build a rule from its remote traffic expression.
    pub fn from_expression(id: impl Into<String>, name: impl Into<String>, expression: &str) -> Self {
        Self { id: id.into(), name: name.into(), list_ids: list_ids_in(expression) }
    }

    /// The gateway expression matching any referenced list.
    pub fn expression(&self) -> String {
        traffic_expression(&self.list_ids)
    }

    pub fn list_id_set(&self) -> BTreeSet<&str> {
        self.list_ids.iter().map(String::as_str).collect()
    }

    pub fn references(&self, list_id: &str) -> bool {
        self.list_ids.iter().any(|id| id == list_id)
    }
}

/// `any(dns.domains[*] in $<id>)` for every id, joined with `or`.
pub fn traffic_expression<S: AsRef<str>>(list_ids: &[S]) -> String {
    list_ids
        .iter()
        .map(|id| format!("any(dns.domains[*] in ${})", id.as_ref()))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Extract the `$<id>` references of an expression, first occurrence order.
pub fn list_ids_in(expression: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    LIST_REFERENCE
        .captures_iter(expression)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
