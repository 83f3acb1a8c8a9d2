//! Shared HTTP client for all Artifactory queries.
//!
//! One pooled `reqwest::Client` is shared across every resolver so that a
//! batch of entities reuses connections to the backend proxy. Bearer tokens
//! are a property of the client handle, never of the resolver contracts.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use crate::auth::redact_token;
use crate::error::Result;

const USER_AGENT: &str = concat!("artifactory-libver/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_shared_client() -> anyhow::Result<Arc<Client>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(DEFAULT_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;

    Ok(Arc::new(client))
}

/// Handle on the Artifactory backend proxy.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ManagerClient {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_deref().map(redact_token))
            .finish()
    }
}

impl ManagerClient {
    /// Build a handle rooted at `base_url` (the proxy URL, with or without a
    /// trailing slash).
    pub fn with_client(client: Arc<Client>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> Arc<Client> {
        Arc::clone(&self.client)
    }

    /// Absolute URL for an API path relative to the proxy root
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        self.authorize(self.client.get(url))
    }

    /// GET with URL-encoded query parameters
    pub fn get_with_query(&self, path: &str, params: &[(&str, &str)]) -> Result<RequestBuilder> {
        let url = Url::parse_with_params(&self.url(path), params)?;
        tracing::debug!("GET {}", url);
        Ok(self.authorize(self.client.get(url)))
    }

    /// GET `path/<segment>`, with `segment` percent-encoded as one path segment
    pub fn get_segment(&self, path: &str, segment: &str) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.url(path))?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(segment);
        tracing::debug!("GET {}", url);
        Ok(self.authorize(self.client.get(url)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        self.authorize(self.client.post(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self
            .token
            .as_deref()
            .and_then(|t| HeaderValue::from_str(&format!("Bearer {t}")).ok())
        {
            Some(mut value) => {
                value.set_sensitive(true);
                request.header(AUTHORIZATION, value)
            }
            None => request,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorList {
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(rename = "status")]
    _status: Option<u16>,
    message: String,
}

/// Extract the first message of an Artifactory `{"errors":[...]}` body,
/// falling back to the raw body text.
pub async fn error_message(response: Response) -> String {
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return e.to_string(),
    };
    parse_error_message(&body)
}

pub(crate) fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorList>(body)
        .ok()
        .and_then(|list| list.errors.into_iter().next())
        .map(|entry| entry.message)
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_segment_encodes_one_segment() {
        let client = ManagerClient::with_client(
            create_shared_client().expect("Failed to create client"),
            "http://localhost:7007/api/proxy/artifactory-proxy/",
        );
        let request = client
            .get_segment("artifactory/api/repositories", "libs#1/x y")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:7007/api/proxy/artifactory-proxy/artifactory/api/repositories/libs%231%2Fx%20y"
        );
    }

    #[test]
    fn test_create_shared_client() {
        let client = create_shared_client().expect("Failed to create client");
        assert!(Arc::strong_count(&client) == 1);
    }

    #[test]
    fn test_clients_share_pool() {
        let shared = create_shared_client().expect("Failed to create client");
        let a = ManagerClient::with_client(Arc::clone(&shared), "http://localhost/api/proxy/");
        let b = a.clone().with_token("secret-token");
        assert_eq!(Arc::as_ptr(&a.http_client()), Arc::as_ptr(&shared));
        assert_eq!(Arc::as_ptr(&b.http_client()), Arc::as_ptr(&shared));
    }

    #[test]
    fn test_url_joining() {
        let shared = create_shared_client().expect("Failed to create client");
        let client = ManagerClient::with_client(shared, "http://localhost:7007/api/proxy/artifactory-proxy");
        assert_eq!(
            client.url("artifactory/api/repositories/libs"),
            "http://localhost:7007/api/proxy/artifactory-proxy/artifactory/api/repositories/libs"
        );
        assert_eq!(
            client.url("/metadata/api/v1/query"),
            "http://localhost:7007/api/proxy/artifactory-proxy/metadata/api/v1/query"
        );
    }

    #[test]
    fn test_get_with_query_encodes_params() {
        let shared = create_shared_client().expect("Failed to create client");
        let client = ManagerClient::with_client(shared, "http://localhost/proxy/");
        let request = client
            .get_with_query("artifactory/api/search/prop", &[("pypi.name", "my pkg"), ("repos", "pypi")])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost/proxy/artifactory/api/search/prop?pypi.name=my+pkg&repos=pypi"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let shared = create_shared_client().expect("Failed to create client");
        let client = ManagerClient::with_client(shared, "http://localhost/").with_token("abcdefgh");
        let debug = format!("{client:?}");
        assert!(debug.contains("abcd..."));
        assert!(!debug.contains("abcdefgh"));
    }

    #[test]
    fn test_parse_error_message() {
        let body = r#"{"errors":[{"status":401,"message":"Bad credentials"},{"status":500,"message":"x"}]}"#;
        assert_eq!(parse_error_message(body), "Bad credentials");
        assert_eq!(parse_error_message("gateway timeout"), "gateway timeout");
        assert_eq!(parse_error_message(r#"{"errors":[]}"#), r#"{"errors":[]}"#);
    }
}
