use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{ProviderError, ProviderResult};

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_RETRIES: usize = 3;
const REQUEST_RETRY_BACKOFF: Duration = Duration::from_millis(750);
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
/// Base URL and credentials of an OpenAI-compatible API.
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn build_client(&self) -> HttpClient {
        HttpClient::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|_| HttpClient::new())
    }
}

/// POSTs `body` as JSON and decodes the reply, retrying transient failures.
pub(crate) async fn post_json_with_retries<B, R>(
    http: &HttpClient,
    endpoint: &ProviderEndpoint,
    path: &str,
    body: &B,
) -> ProviderResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let url = endpoint.url(path);
    let mut attempt = 0usize;

    loop {
        attempt += 1;

        match post_json_once(http, endpoint, &url, body).await {
            Ok(response) => return Ok(response),
            Err(err) if err.is_retryable() && attempt < REQUEST_RETRIES => {
                warn!(url = %url, attempt, error = %err, "Provider request failed, retrying");
                tokio::time::sleep(REQUEST_RETRY_BACKOFF).await;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn post_json_once<B, R>(
    http: &HttpClient,
    endpoint: &ProviderEndpoint,
    url: &str,
    body: &B,
) -> ProviderResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut request = http.post(url).json(body);
    if let Some(key) = &endpoint.api_key {
        request = request.bearer_auth(key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::RequestFailed {
            endpoint: url.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::RequestFailed {
            endpoint: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            endpoint: url.to_string(),
            status: status.as_u16(),
            body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    debug!(url = %url, bytes = text.len(), "Provider response received");

    serde_json::from_str(&text).map_err(|e| ProviderError::MalformedResponse {
        reason: format!("unexpected response from {}: {}", url, e),
    })
}
