//! Manual redirect following
//!
//! The reqwest client is built with redirects disabled; these helpers decide
//! how the next hop is issued.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use url::Url;

use super::request::HttpRequest;
use crate::api::ApiError;

/// Statuses that carry a `Location` to follow.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Resolve `location` against the URL that produced it.
///
/// Absolute locations replace the URL; relative ones keep scheme and host.
/// Path, query and fragment of the location are preserved as given.
pub fn resolve_location(current: &Url, location: &str) -> Result<Url, ApiError> {
    current
        .join(location)
        .map_err(|err| ApiError::Network(format!("invalid redirect location {location:?} from {current}: {err}")))
}

/// Build the request for the next hop.
///
/// A 303 becomes a bodiless GET; other codes keep method and body. The
/// authorization header is dropped when the redirect leaves the origin.
pub fn follow(mut request: HttpRequest, status: StatusCode, next: Url) -> HttpRequest {
    if status == StatusCode::SEE_OTHER {
        request.method = Method::GET;
        request.body = None;
        request.headers.remove(CONTENT_TYPE);
    }
    if request.url.origin() != next.origin() {
        request.headers.remove(AUTHORIZATION);
    }
    request.url = next;
    request
}
