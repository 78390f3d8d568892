// src/github/mod.rs
pub mod client;
pub mod query;

pub use client::{Credential, GithubClient, RetryPolicy, DEFAULT_API_URL};
pub use query::{SearchEndpoint, SearchQuery};

use crate::error::SearchError;

/// Source of search counts. `GithubClient` talks to the real API; tests plug in mocks.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fails with an auth error when the credential is missing or rejected.
    async fn verify_credential(&self) -> Result<(), SearchError>;

    /// Number of matches for one query (`total_count` of the first page).
    async fn count(&self, query: &SearchQuery) -> Result<u64, SearchError>;

    fn name(&self) -> &'static str;
}
