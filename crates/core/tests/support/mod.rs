//! Shared test helpers for `blockgate-core` integration tests.
//!
//! In-memory fakes of the gateway and cache ports so reconciliation tests can
//! focus on behaviour instead of transport details.

#![allow(dead_code)]

pub mod cache;
pub mod gateway;

use blockgate_domain::{Domain, DomainSet};

/// Parse a fixed list of domains.
pub fn domains(values: &[&str]) -> DomainSet {
    values.iter().map(|value| Domain::parse(value).unwrap()).collect()
}

/// `count` distinct generated domains, optionally offset.
pub fn generated(count: usize, offset: usize) -> DomainSet {
    (offset..offset + count).map(|n| Domain::parse(&format!("host{n:06}.example")).unwrap()).collect()
}
