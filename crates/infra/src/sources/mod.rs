//! Desired domain set from downloadable block and allow lists
//!
//! [`ListSources`] gathers list URLs, downloads each with a local fallback
//! copy, appends the dynamic lists and converts the combined text into a
//! [`DomainSet`](blockgate_domain::DomainSet).

pub mod converter;
pub mod downloader;
pub mod lists;
pub mod url_list;

pub use downloader::{fallback_path, Downloader};
pub use lists::ListSources;
