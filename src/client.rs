//! Microsoft Graph client for the shares API, with throttle-aware retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde_json::Value;

use crate::auth::Authenticator;
use crate::error::{GraphError, Result};
use crate::models::{ApiErrorResponse, ApiResult};

/// Base URL for Microsoft Graph v1.0.
const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Retry limits and backoff intervals for [`GraphClient::execute`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed per request, throttle and transport
    /// recoveries included.
    pub max_attempts: u32,
    /// Fixed wait before retrying after a transport-level failure.
    pub transport_backoff: Duration,
    /// Wait applied when a 429 carries no usable Retry-After header.
    pub default_retry_after: Duration,
    /// Upper bound on server-requested Retry-After waits.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            transport_backoff: Duration::from_secs(10),
            default_retry_after: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(300),
        }
    }
}

/// Suspension point used by the retry loop.
///
/// Injectable so tests can observe backoff without waiting in real time.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry loop states. The terminal exits (success, terminal status error,
/// exhaustion) are the returns out of [`GraphClient::execute`].
#[derive(Clone, Copy)]
enum RetryState {
    Attempt,
    ThrottleWait(Duration),
    TransportWait(Duration),
}

/// Client for Graph shares endpoints.
///
/// Requests are executed through a bounded retry loop that absorbs 429
/// throttling (honoring `Retry-After`) and transport-level failure; any
/// other non-2xx response is terminal.
pub struct GraphClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl GraphClient {
    /// Create a client against the production Graph endpoint.
    pub fn new(auth: Authenticator) -> Self {
        Self::with_base_url(auth, GRAPH_API_BASE)
    }

    /// Create a client against a specific API base URL.
    pub fn with_base_url(auth: Authenticator, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            auth,
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the sleeper used during backoff.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The API base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch metadata for a shared resource.
    pub async fn get_share(&self, share_id: &str) -> Result<ApiResult> {
        let url = format!("{}/shares/{}", self.base_url, share_id);
        self.execute(Method::GET, &url, None).await
    }

    /// Fetch an item sub-resource (`driveItem` or `listItem`) of a share.
    pub async fn get_share_item(&self, share_id: &str, segment: &str) -> Result<ApiResult> {
        let url = format!("{}/shares/{}/{}", self.base_url, share_id, segment);
        self.execute(Method::GET, &url, None).await
    }

    /// Execute a request against the API.
    ///
    /// Only GET, POST and PUT are supported; anything else fails
    /// immediately with [`GraphError::UnsupportedMethod`]. A 429 response
    /// is never surfaced: the loop waits out the server's `Retry-After`
    /// (integer seconds; 1s when absent or unparseable, capped by the
    /// policy) and retries. Transport failures retry after the fixed
    /// transport backoff. Any other non-success status returns
    /// [`GraphError::ApiError`] without retrying. Once the policy's attempt
    /// bound is reached the pending backoff is abandoned and
    /// [`GraphError::RetriesExhausted`] is returned. Dropping the returned
    /// future cancels the request; the HTTP exchange and both backoff waits
    /// are all await points.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<ApiResult> {
        if method != Method::GET && method != Method::POST && method != Method::PUT {
            return Err(GraphError::UnsupportedMethod(method));
        }

        let mut attempts: u32 = 0;
        let mut last_error = String::new();
        let mut state = RetryState::Attempt;

        loop {
            match state {
                RetryState::Attempt => {
                    attempts += 1;
                    // Token acquisition is outside the retry protocol; its
                    // failures are authentication errors, not transport ones.
                    let token = self.auth.get_access_token().await?;
                    match self.send(method.clone(), url, body, &token).await {
                        Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                            let delay = self.retry_after(&response);
                            tracing::warn!(
                                url,
                                delay_secs = delay.as_secs(),
                                "throttled by the API; backing off"
                            );
                            last_error = format!("throttled (Retry-After {}s)", delay.as_secs());
                            state = RetryState::ThrottleWait(delay);
                        }
                        Ok(response) if response.status().is_success() => {
                            match read_result(response).await {
                                Ok(result) => return Ok(result),
                                Err(e) => {
                                    // The exchange did not complete; treat a
                                    // failed body read like any transport failure.
                                    tracing::warn!(url, error = %e, "failed reading response body; retrying");
                                    last_error = e.to_string();
                                    state = RetryState::TransportWait(self.policy.transport_backoff);
                                }
                            }
                        }
                        Ok(response) => return Err(status_error(response).await),
                        Err(e) => {
                            tracing::warn!(
                                url,
                                error = %e,
                                backoff_secs = self.policy.transport_backoff.as_secs(),
                                "request failed; retrying"
                            );
                            last_error = e.to_string();
                            state = RetryState::TransportWait(self.policy.transport_backoff);
                        }
                    }
                }
                RetryState::ThrottleWait(delay) | RetryState::TransportWait(delay) => {
                    if attempts >= self.policy.max_attempts {
                        return Err(GraphError::RetriesExhausted {
                            attempts,
                            last_error,
                        });
                    }
                    self.sleeper.sleep(delay).await;
                    state = RetryState::Attempt;
                }
            }
        }
    }

    /// Perform one HTTP exchange with the required shares-API headers.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: &str,
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .header("Prefer", "redeemSharingLinkIfNecessary");

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await
    }

    /// Delay requested by a 429 response, defaulted and capped per policy.
    fn retry_after(&self, response: &Response) -> Duration {
        response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.policy.default_retry_after)
            .min(self.policy.max_retry_after)
    }
}

/// Read a successful response into an [`ApiResult`].
async fn read_result(response: Response) -> std::result::Result<ApiResult, reqwest::Error> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(ApiResult::from_body(status, body))
}

/// Build the terminal error for a non-2xx, non-429 response, preferring the
/// structured Graph error body over the raw text.
async fn status_error(response: Response) -> GraphError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return GraphError::ApiError {
            status,
            message: format!("{}: {}", api_error.error.code, api_error.error.message),
        };
    }
    GraphError::ApiError {
        status,
        message: body,
    }
}
