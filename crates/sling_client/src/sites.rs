//! Site management.
//!
//! Sites are created by posting to the `createsite` selector of a site
//! container node, naming the new site with `:sitepath`. A site is deleted
//! like any other node.

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::{ContentRepository, Error, SlingClient};

#[cfg(test)]
#[path = "sites_tests.rs"]
mod tests;

/// A site created under a site container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Path of the container the site was created in
    pub container: String,
    /// Site identifier relative to the container
    pub id: String,
    /// Display title
    pub title: String,
}

impl Site {
    /// The site's full repository path: container and id concatenated.
    ///
    /// No separator is inserted; ids conventionally start with `/`.
    pub fn path(&self) -> String {
        format!("{}{}", self.container, self.id)
    }
}

/// Site lifecycle operations.
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    /// Create site `id` titled `title` inside the container at `path`.
    async fn create_site(&self, path: &str, title: &str, id: &str)
        -> Result<Option<Site>, Error>;

    /// Delete the site whose full path is `key`.
    async fn delete_site(&self, key: &str) -> Result<bool, Error>;
}

/// [`SiteDirectory`] backed by the `createsite` servlet.
#[derive(Debug, Clone)]
pub struct SiteManager {
    client: SlingClient,
}

impl SiteManager {
    /// Bind a site manager to `client`.
    pub fn new(client: SlingClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SiteDirectory for SiteManager {
    #[instrument(skip(self))]
    async fn create_site(
        &self,
        path: &str,
        title: &str,
        id: &str,
    ) -> Result<Option<Site>, Error> {
        let response = self
            .client
            .post_form(
                &format!("{path}.createsite.json"),
                &[(":sitepath", id), ("sakai:title", title)],
            )
            .await?;

        let status = response.status().as_u16();
        if status == 200 {
            info!(container = path, site_id = id, "Created site");
            Ok(Some(Site {
                container: path.to_string(),
                id: id.to_string(),
                title: title.to_string(),
            }))
        } else {
            warn!(container = path, site_id = id, status = status, "Site creation refused");
            Ok(None)
        }
    }

    async fn delete_site(&self, key: &str) -> Result<bool, Error> {
        self.client.delete_node(key).await
    }
}
