//! Normalized host names

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A lowercase host name without scheme, path, port or trailing dot.
///
/// Wildcard labels (`*.example.com`) are kept as-is; the gateway matches them
/// natively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

/// The set of domains one pass converges toward.
pub type DomainSet = BTreeSet<Domain>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid domain: {0:?}")]
pub struct InvalidDomain(pub String);

impl Domain {
    /// Normalize `raw` into a domain, or `None` when it is not a usable name.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let mut value = lowered.as_str();

        for scheme in ["https://", "http://"] {
            if let Some(rest) = value.strip_prefix(scheme) {
                value = rest;
                break;
            }
        }
        if let Some(end) = value.find(['/', '?', '#', ':']) {
            value = &value[..end];
        }
        let value = value.strip_suffix('.').unwrap_or(value);

        if value.is_empty() || value.split('.').any(str::is_empty) {
            return None;
        }
        if !value.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b"-_.*".contains(&b)) {
            return None;
        }

        Some(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Domain {
    type Err = InvalidDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidDomain(s.to_owned()))
    }
}

impl TryFrom<String> for Domain {
    type Error = InvalidDomain;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}
