//! Wire types of the gateway API

use blockgate_domain::constants::{LIST_DESCRIPTION, RULE_DESCRIPTION};
use blockgate_domain::{traffic_expression, Domain, ListPatch, ResourceList, Rule};
use serde::{Deserialize, Serialize};

/// Response envelope wrapping every result.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Absent means success; only an explicit `false` fails the call
    #[serde(default = "succeeded")]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<EnvelopeError>,
    pub result: Option<T>,
}

fn succeeded() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Envelope errors as one line, `code: message; ...`.
pub fn describe_errors(errors: &[EnvelopeError]) -> String {
    errors.iter().map(|e| format!("{}: {}", e.code, e.message)).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Deserialize)]
pub struct ListRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: Option<usize>,
}

impl From<ListRecord> for ResourceList {
    fn from(record: ListRecord) -> Self {
        ResourceList { id: record.id, name: record.name, count: record.count.unwrap_or_default() }
    }
}

#[derive(Debug, Deserialize)]
pub struct RuleRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub traffic: String,
}

impl From<RuleRecord> for Rule {
    fn from(record: RuleRecord) -> Self {
        Rule::from_expression(record.id, record.name, &record.traffic)
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemRecord {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ItemValue<'a> {
    pub value: &'a str,
}

fn values(domains: &[Domain]) -> Vec<ItemValue<'_>> {
    domains.iter().map(|d| ItemValue { value: d.as_str() }).collect()
}

#[derive(Debug, Serialize)]
pub struct CreateListBody<'a> {
    pub name: &'a str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub items: Vec<ItemValue<'a>>,
}

impl<'a> CreateListBody<'a> {
    pub fn new(name: &'a str, items: &'a [Domain]) -> Self {
        Self { name, description: LIST_DESCRIPTION, kind: "DOMAIN", items: values(items) }
    }
}

#[derive(Debug, Serialize)]
pub struct PatchListBody<'a> {
    pub remove: Vec<&'a str>,
    pub append: Vec<ItemValue<'a>>,
}

impl<'a> PatchListBody<'a> {
    pub fn new(patch: &'a ListPatch) -> Self {
        Self { remove: patch.removed_values().collect(), append: values(&patch.append) }
    }
}

#[derive(Debug, Serialize)]
pub struct RuleBody<'a> {
    pub name: &'a str,
    pub description: &'static str,
    pub action: &'static str,
    pub traffic: String,
    pub enabled: bool,
}

impl<'a> RuleBody<'a> {
    pub fn new(name: &'a str, list_ids: &[String]) -> Self {
        Self {
            name,
            description: RULE_DESCRIPTION,
            action: "block",
            traffic: traffic_expression(list_ids),
            enabled: true,
        }
    }
}
