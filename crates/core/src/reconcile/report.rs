//! Outcome summaries of converge and teardown passes

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    List,
    Rule,
}

/// A best-effort deletion that failed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub kind: ResourceKind,
    pub id: String,
    pub name: String,
    pub message: String,
}

/// What happened to the managed rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleChange {
    Created,
    Updated,
    #[default]
    Unchanged,
    /// No list was in use, so there was nothing to reference
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvergeReport {
    pub desired: usize,
    pub lists_created: usize,
    pub lists_updated: usize,
    pub lists_unchanged: usize,
    pub orphans_deleted: usize,
    pub orphan_failures: Vec<DeletionFailure>,
    pub lists_in_use: usize,
    pub rule: RuleChange,
}

impl ConvergeReport {
    pub fn new(desired: usize) -> Self {
        Self { desired, ..Self::default() }
    }

    /// Number of mutating remote calls the pass issued successfully.
    pub fn mutations(&self) -> usize {
        let rule = usize::from(matches!(self.rule, RuleChange::Created | RuleChange::Updated));
        self.lists_created + self.lists_updated + self.orphans_deleted + rule
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub rules_deleted: usize,
    pub lists_deleted: usize,
    pub failures: Vec<DeletionFailure>,
}

impl TeardownReport {
    /// Every deletion succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
