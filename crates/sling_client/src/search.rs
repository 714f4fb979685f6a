//! Search over the `/var/search` endpoints.
//!
//! The fixture builds a [`SearchManager`] for test bodies but never calls it
//! itself.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{Error, SlingClient};

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;

const SEARCH_PATH: &str = "var/search";

/// Issues search queries as the client's current identity.
#[derive(Debug, Clone)]
pub struct SearchManager {
    client: SlingClient,
}

impl SearchManager {
    /// Bind a search manager to `client`.
    pub fn new(client: SlingClient) -> Self {
        Self { client }
    }

    /// Full-text search over content nodes.
    pub async fn search_content(&self, query: &str) -> Result<Option<Value>, Error> {
        self.search("content", query).await
    }

    /// Search for users by name.
    pub async fn search_users(&self, query: &str) -> Result<Option<Value>, Error> {
        self.search("users", query).await
    }

    /// Search for sites.
    pub async fn search_sites(&self, query: &str) -> Result<Option<Value>, Error> {
        self.search("sites", query).await
    }

    /// Returns `Ok(None)` when the server does not answer 200.
    #[instrument(skip(self))]
    async fn search(&self, kind: &str, query: &str) -> Result<Option<Value>, Error> {
        let response = self
            .client
            .get(&format!("{SEARCH_PATH}/{kind}.json"), &[("q", query)])
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            warn!(kind = kind, status = status, "Search failed");
            return Ok(None);
        }

        let body = response.text().await?;
        let results: Value = serde_json::from_str(&body)?;
        debug!(kind = kind, "Search succeeded");
        Ok(Some(results))
    }
}
