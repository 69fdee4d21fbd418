//! Block-list text to domains
//!
//! Accepted line formats:
//! - hosts files: `0.0.0.0 ads.example`, `127.0.0.1 a.example b.example`, `:: ads.example`
//! - adblock network filters: `||ads.example^` with optional `$options`
//! - bare domains, one per line
//!
//! Comments (`#` anywhere, `!` at line start), `[Adblock]` headers and `@@`
//! exception filters are skipped.

use std::net::IpAddr;

use blockgate_domain::{Domain, DomainSet};

/// Host names that must never be blocked.
const RESERVED: [&str; 9] = [
    "localhost",
    "localhost.localdomain",
    "local",
    "broadcasthost",
    "ip6-localhost",
    "ip6-loopback",
    "ip6-localnet",
    "ip6-allnodes",
    "ip6-allrouters",
];

/// Domains blocked by `block` and not allowed by `allow`.
pub fn convert(block: &str, allow: &str) -> DomainSet {
    let allowed = extract(allow);
    let mut blocked = extract(block);
    blocked.retain(|domain| !allowed.contains(domain));
    blocked
}

/// Every valid domain mentioned in list text.
pub fn extract(text: &str) -> DomainSet {
    text.lines().flat_map(line_domains).collect()
}

fn line_domains(line: &str) -> Vec<Domain> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('!') || line.starts_with('[') || line.starts_with("@@") {
        return Vec::new();
    }
    let line = match line.find('#') {
        Some(at) => line[..at].trim(),
        None => line,
    };

    if let Some(rule) = line.strip_prefix("||") {
        let host = rule.split(['^', '$', '/']).next().unwrap_or_default();
        return accept(host).into_iter().collect();
    }

    let mut tokens = line.split_whitespace();
    let Some(first) = tokens.next() else {
        return Vec::new();
    };
    if first.parse::<IpAddr>().is_ok() {
        return tokens.filter_map(accept).collect();
    }
    accept(first).into_iter().collect()
}

fn accept(raw: &str) -> Option<Domain> {
    if raw.parse::<IpAddr>().is_ok() {
        return None;
    }
    let domain = Domain::parse(raw)?;
    let name = domain.as_str();
    // Single-label names are local hosts, not blockable domains.
    if RESERVED.contains(&name) || !name.contains('.') {
        return None;
    }
    Some(domain)
}
