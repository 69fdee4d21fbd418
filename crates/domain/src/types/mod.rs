//! Domain types and models

pub mod cache;
pub mod domain_name;
pub mod list_name;
pub mod resources;

pub use cache::CacheSnapshot;
pub use domain_name::{Domain, DomainSet, InvalidDomain};
pub use list_name::{ListName, ManagedNames};
pub use resources::{list_ids_in, traffic_expression, ListItems, ListPatch, ResourceList, Rule};
