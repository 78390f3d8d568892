// src/github/client.rs
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::query::SearchQuery;
use super::SearchBackend;
use crate::error::SearchError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!(
    "ai-assistant-activity/",
    env!("CARGO_PKG_VERSION"),
    " (+github search statistics)"
);

/// API token. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, SearchError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(SearchError::MissingCredential);
        }
        Ok(Self(token))
    }

    /// Reads `GITHUB_TOKEN` (call `dotenvy::dotenv()` first to honour `.env`).
    pub fn from_env() -> Result<Self, SearchError> {
        let raw = std::env::var(ENV_GITHUB_TOKEN).map_err(|_| SearchError::MissingCredential)?;
        Self::new(raw)
    }

    fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.len())
    }
}

/// Bounded retry for rate limits (403/429) and search indexing (202).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Backoff for attempt n is `backoff_base * 2^(n-1)` when no reset header is sent.
    pub backoff_base: Duration,
    /// Lower bound on the wait derived from `x-ratelimit-reset`.
    pub min_reset_wait: Duration,
    /// Added to the reset timestamp.
    pub reset_buffer: Duration,
    pub indexing_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(30),
            min_reset_wait: Duration::from_secs(30),
            reset_buffer: Duration::from_secs(10),
            indexing_wait: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no waiting. Used by tests and dry runs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base: Duration::ZERO,
            min_reset_wait: Duration::ZERO,
            reset_buffer: Duration::ZERO,
            indexing_wait: Duration::ZERO,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << shift)
    }

    /// Wait until `reset_epoch` (unix seconds) plus buffer, never less than `min_reset_wait`.
    fn reset_wait(&self, reset_epoch: i64, now_epoch: i64) -> Duration {
        let secs = reset_epoch.saturating_sub(now_epoch).max(0) as u64;
        (Duration::from_secs(secs) + self.reset_buffer).max(self.min_reset_wait)
    }

    fn rate_limit_wait(&self, headers: &HeaderMap, attempt: u32) -> Duration {
        match header_i64(headers, "x-ratelimit-reset") {
            Some(reset) => self.reset_wait(reset, chrono::Utc::now().timestamp()),
            None => self.backoff(attempt),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    search: RateLimitBucket,
}

#[derive(Debug, Deserialize)]
struct RateLimitBucket {
    limit: u64,
    remaining: u64,
}

pub struct GithubClient {
    http: Client,
    base_url: String,
    credential: Credential,
    retry: RetryPolicy,
}

impl GithubClient {
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Result<Self, SearchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, path: &str, params: &[(&str, &str)]) -> Result<Response, SearchError> {
        let t0 = std::time::Instant::now();
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(self.credential.secret())
            .header(ACCEPT, ACCEPT_V3)
            .query(params)
            .send()
            .await;
        histogram!("github_request_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        let status_label = match &resp {
            Ok(r) => r.status().as_u16().to_string(),
            Err(_) => "error".to_string(),
        };
        counter!("github_requests_total", "status" => status_label).increment(1);
        Ok(resp?)
    }

    async fn search(&self, query: &SearchQuery) -> Result<u64, SearchError> {
        let path = query.endpoint.path();
        let params = [("q", query.q.as_str()), ("per_page", "1")];

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let resp = self.send(path, &params).await?;
            let status = resp.status();
            let headers = resp.headers().clone();

            match status {
                StatusCode::OK => {
                    let body: SearchResponse = resp
                        .json()
                        .await
                        .map_err(|e| SearchError::Malformed(e.to_string()))?;
                    if body.incomplete_results {
                        warn!(q = %query.q, total = body.total_count, "search returned incomplete results");
                    }
                    debug!(q = %query.q, total = body.total_count, attempt, "search ok");
                    return Ok(body.total_count);
                }
                StatusCode::ACCEPTED => {
                    if attempt < self.retry.max_attempts {
                        warn!(q = %query.q, attempt, "search indexing in progress, retrying");
                        pause(self.retry.indexing_wait).await;
                        continue;
                    }
                    return Err(SearchError::Status {
                        status: status.as_u16(),
                        url: self.url(path),
                    });
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(SearchError::Unauthorized {
                        status: status.as_u16(),
                    });
                }
                StatusCode::UNPROCESSABLE_ENTITY => {
                    let text = resp.text().await.unwrap_or_default();
                    return Err(SearchError::Rejected {
                        query: query.q.clone(),
                        message: api_message(&text),
                    });
                }
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                    let text = resp.text().await.unwrap_or_default();
                    if !is_rate_limited(status, &headers, &text) {
                        return Err(SearchError::Status {
                            status: status.as_u16(),
                            url: self.url(path),
                        });
                    }
                    if attempt >= self.retry.max_attempts {
                        return Err(SearchError::RateLimited { attempts: attempt });
                    }
                    let wait = self.retry.rate_limit_wait(&headers, attempt);
                    counter!("github_rate_limit_waits_total").increment(1);
                    warn!(
                        q = %query.q,
                        attempt,
                        wait_secs = wait.as_secs(),
                        "rate limit hit, waiting before retry"
                    );
                    pause(wait).await;
                }
                other => {
                    return Err(SearchError::Status {
                        status: other.as_u16(),
                        url: self.url(path),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl SearchBackend for GithubClient {
    async fn verify_credential(&self) -> Result<(), SearchError> {
        let resp = self.send("rate_limit", &[]).await?;
        let status = resp.status();
        match status {
            StatusCode::OK => {
                match resp.json::<RateLimitResponse>().await {
                    Ok(rl) => tracing::info!(
                        limit = rl.resources.search.limit,
                        remaining = rl.resources.search.remaining,
                        "credential accepted"
                    ),
                    Err(e) => debug!(error = %e, "credential accepted, rate limit body unreadable"),
                }
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SearchError::Unauthorized {
                status: status.as_u16(),
            }),
            other => Err(SearchError::Status {
                status: other.as_u16(),
                url: self.url("rate_limit"),
            }),
        }
    }

    async fn count(&self, query: &SearchQuery) -> Result<u64, SearchError> {
        self.search(query).await
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || header_i64(headers, "x-ratelimit-remaining") == Some(0)
        || body.to_ascii_lowercase().contains("rate limit")
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())
}

fn api_message(body: &str) -> String {
    match serde_json::from_str::<ApiMessage>(body) {
        Ok(m) if !m.message.is_empty() => m.message,
        _ => body.chars().take(200).collect(),
    }
}

async fn pause(d: Duration) {
    if !d.is_zero() {
        tokio::time::sleep(d).await;
    }
}
