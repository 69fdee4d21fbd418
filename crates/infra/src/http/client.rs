use std::time::Duration;

use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::debug;

use super::redirect;
use super::request::{HttpRequest, HttpResponse};
use crate::api::ApiError;
use blockgate_domain::constants::MAX_REDIRECTS;

/// Base HTTP transport with manual redirect handling and status classification.
///
/// Each [`send`](Self::send) is a single logical request: redirect hops are
/// followed in place, and any final status outside 2xx becomes an
/// [`ApiError`]. Retrying is left to the [`Retrying`](super::Retrying) layer.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_redirects: usize,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    /// Execute `request`, following up to the configured number of redirects.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut current = request.clone();
        let mut hops = 0usize;

        loop {
            let response = self.execute_once(&current).await?;
            let status = response.status;

            if !redirect::is_redirect(status) {
                return classify(response);
            }

            if hops >= self.max_redirects {
                return Err(ApiError::TooManyRedirects { limit: self.max_redirects, url: current.url.to_string() });
            }

            let location = response
                .headers
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or_else(|| ApiError::Client {
                    status: status.as_u16(),
                    message: format!("redirect from {} without a Location header", current.url),
                })?;

            let next = redirect::resolve_location(&current.url, location)?;
            debug!(%status, from = %current.url, to = %next, hop = hops + 1, "following redirect");
            current = redirect::follow(current, status, next);
            hops += 1;
        }
    }

    async fn execute_once(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder =
            self.client.request(request.method.clone(), request.url.clone()).headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending HTTP request");
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        debug!(method = %request.method, %url, %status, bytes = body.len(), "received HTTP response");

        Ok(HttpResponse { status, url, headers, body })
    }
}

fn classify(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    let status = response.status;
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text();
    let code = status.as_u16();
    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => {
            ApiError::RateLimit { message, retry_after: retry_after(&response.headers) }
        }
        s if s.is_server_error() => ApiError::Server { status: code, message },
        s if s.is_client_error() => ApiError::Client { status: code, message },
        _ => ApiError::Network(format!("unexpected HTTP status {code} from {}", response.url)),
    })
}

/// `Retry-After` in delta-seconds form; HTTP dates are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_redirects: usize,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), max_redirects: MAX_REDIRECTS, user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build()?;

        Ok(HttpClient { client, max_redirects: self.max_redirects })
    }
}
