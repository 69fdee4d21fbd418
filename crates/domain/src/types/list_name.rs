//! Managed resource naming
//!
//! Lists owned by blockgate are named `"[<prefix>] - 001"`, `"[<prefix>] -
//! 002"`, ... and the rule referencing them `"[<prefix>] Block Ads"`. The index
//! encoded in a list name is how lists are found and reused across passes, so
//! parsing and formatting live in one total value type.

use std::fmt;

use crate::constants::RULE_NAME_SUFFIX;

const INDEX_SEPARATOR: &str = " - ";

/// Names derived from the operator-chosen prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedNames {
    list_prefix: String,
    rule_name: String,
}

impl ManagedNames {
    pub fn new(prefix: &str) -> Self {
        let list_prefix = format!("[{prefix}]");
        let rule_name = format!("{list_prefix} {RULE_NAME_SUFFIX}");
        Self { list_prefix, rule_name }
    }

    /// Prefix every managed list (and the rule) name starts with.
    pub fn list_prefix(&self) -> &str {
        &self.list_prefix
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    pub fn list_name(&self, index: usize) -> ListName {
        ListName::new(&self.list_prefix, index)
    }

    /// Parse a remote list name belonging to this prefix.
    pub fn parse_list_name(&self, name: &str) -> Option<ListName> {
        ListName::parse(&self.list_prefix, name)
    }
}

/// A list name split into its prefix and 1-based index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListName {
    prefix: String,
    index: usize,
}

impl ListName {
    pub fn new(prefix: &str, index: usize) -> Self {
        Self { prefix: prefix.to_owned(), index }
    }

    /// Parse `name` as `"<prefix> - <digits>"`. Index 0 is rejected.
    pub fn parse(prefix: &str, name: &str) -> Option<Self> {
        let digits = name.strip_prefix(prefix)?.strip_prefix(INDEX_SEPARATOR)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index: usize = digits.parse().ok()?;
        (index >= 1).then(|| Self::new(prefix, index))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{INDEX_SEPARATOR}{:03}", self.prefix, self.index)
    }
}
