//! The per-test fixture.
//!
//! A [`SlingTest`] owns the collaborator handles a test talks to and records
//! every resource the test creates through it. [`SlingTest::teardown`]
//! deletes those resources again as the administrative identity: nodes
//! newest first (children before parents), then users, groups and sites in
//! creation order.

use futures_util::FutureExt;
use sling_client::{
    ContentRepository, FileUpload, Group, NodeResponse, Properties, SearchManager, Site,
    SiteDirectory, SiteManager, SlingClient, User, UserDirectory, UserManager,
};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::TestConfig;
use crate::errors::{DeletionFailure, DeletionFailureReason, FixtureError, ResourceKind};

#[cfg(test)]
#[path = "fixture_tests.rs"]
mod tests;

/// Per-test collaborator handles and cleanup bookkeeping.
///
/// Construct one per test with [`SlingTest::setup`] and finish it with
/// [`SlingTest::teardown`], or let [`SlingTest::run`] do both around a test
/// body. A fixture dropped with resources still tracked logs a warning; it
/// cannot delete them because drop is synchronous.
///
/// # Examples
///
/// ```no_run
/// use sling_test::{SlingTest, TestConfig};
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// SlingTest::run(&TestConfig::from_env()?, async |t: &mut SlingTest| -> anyhow::Result<()> {
///     t.create_empty_node("/content/parent").await?;
///     t.create_empty_node("/content/parent/child").await?;
///     let user = t.create_user("alice").await?;
///     assert_eq!(user.name, "alice");
///     Ok(())
/// })
/// .await
/// # }
/// ```
pub struct SlingTest {
    repository: Arc<dyn ContentRepository>,
    users: Arc<dyn UserDirectory>,
    sites: Arc<dyn SiteDirectory>,
    search: SearchManager,
    admin: User,
    created_nodes: Vec<String>,
    created_users: Vec<User>,
    created_groups: Vec<String>,
    created_sites: Vec<String>,
}

impl SlingTest {
    /// Create a fixture talking to the server named in `config`.
    ///
    /// The repository client, user manager, site manager and search manager
    /// share one connection and start out acting as `config.admin`.
    pub fn setup(config: &TestConfig) -> Result<Self, FixtureError> {
        let client = SlingClient::new(&config.server_url, config.admin.clone())?;
        info!(server = config.server_url, "Setting up Sling test fixture");

        Ok(Self::from_parts(
            Arc::new(client.clone()),
            Arc::new(UserManager::new(client.clone())),
            Arc::new(SiteManager::new(client.clone())),
            SearchManager::new(client),
            config.admin.clone(),
        ))
    }

    /// Create a fixture from explicit collaborators.
    ///
    /// `admin` is the identity teardown switches to before deleting anything.
    pub fn from_parts(
        repository: Arc<dyn ContentRepository>,
        users: Arc<dyn UserDirectory>,
        sites: Arc<dyn SiteDirectory>,
        search: SearchManager,
        admin: User,
    ) -> Self {
        Self {
            repository,
            users,
            sites,
            search,
            admin,
            created_nodes: Vec::new(),
            created_users: Vec::new(),
            created_groups: Vec::new(),
            created_sites: Vec::new(),
        }
    }

    /// Set up a fixture, run `body` against it, then always tear it down.
    ///
    /// Teardown runs whether the body succeeds, fails or panics. A panic is
    /// resumed after teardown. When both the body and teardown fail, the
    /// body's error is returned and the teardown error is logged.
    pub async fn run<F>(config: &TestConfig, body: F) -> anyhow::Result<()>
    where
        F: AsyncFnOnce(&mut SlingTest) -> anyhow::Result<()>,
    {
        Self::setup(config)?.run_test(body).await
    }

    /// Run `body` against this fixture, then always tear it down.
    ///
    /// See [`SlingTest::run`].
    pub async fn run_test<F>(mut self, body: F) -> anyhow::Result<()>
    where
        F: AsyncFnOnce(&mut SlingTest) -> anyhow::Result<()>,
    {
        let outcome = AssertUnwindSafe(body(&mut self)).catch_unwind().await;
        let teardown = self.teardown().await;

        match outcome {
            Err(panic) => {
                if let Err(e) = &teardown {
                    error!(error = %e, "Teardown after panicking test body failed");
                }
                std::panic::resume_unwind(panic)
            }
            Ok(Err(body_error)) => {
                if let Err(e) = &teardown {
                    error!(error = %e, "Teardown after failing test body failed");
                }
                Err(body_error)
            }
            Ok(Ok(())) => Ok(teardown?),
        }
    }

    /// Delete every tracked resource as the administrative identity.
    ///
    /// Switches identity once, then deletes nodes in reverse creation order,
    /// followed by users, groups and sites in creation order. Every deletion
    /// is attempted; all failures are returned together.
    pub async fn teardown(mut self) -> Result<(), FixtureError> {
        info!(
            nodes = self.created_nodes.len(),
            users = self.created_users.len(),
            groups = self.created_groups.len(),
            sites = self.created_sites.len(),
            "Tearing down Sling test fixture"
        );
        self.repository.switch_user(&self.admin);

        let mut failures = Vec::new();

        let nodes = std::mem::take(&mut self.created_nodes);
        for path in nodes.iter().rev() {
            let result = self.repository.delete_node(path).await;
            record_deletion(&mut failures, ResourceKind::Node, path, result);
        }

        for user in std::mem::take(&mut self.created_users) {
            let result = self.users.delete_user(&user.name).await;
            record_deletion(&mut failures, ResourceKind::User, &user.name, result);
        }

        for group in std::mem::take(&mut self.created_groups) {
            let result = self.users.delete_group(&group).await;
            record_deletion(&mut failures, ResourceKind::Group, &group, result);
        }

        for key in std::mem::take(&mut self.created_sites) {
            let result = self.sites.delete_site(&key).await;
            record_deletion(&mut failures, ResourceKind::Site, &key, result);
        }

        if failures.is_empty() {
            info!("Teardown completed");
            Ok(())
        } else {
            Err(FixtureError::Teardown(failures))
        }
    }

    /// Create a node and track it for deletion.
    ///
    /// Fails if the server answers `500`; any other status is accepted.
    /// Returns `path`.
    pub async fn create_node(
        &mut self,
        path: &str,
        properties: &Properties,
    ) -> Result<String, FixtureError> {
        debug!(path = path, "Creating node");
        let response = self.repository.create_node(path, properties).await?;
        if response.is_internal_server_error() {
            return Err(FixtureError::CreationFailed {
                kind: ResourceKind::Node,
                id: path.to_string(),
            });
        }

        self.created_nodes.push(path.to_string());
        Ok(path.to_string())
    }

    /// Create a node without properties and track it for deletion.
    pub async fn create_empty_node(&mut self, path: &str) -> Result<String, FixtureError> {
        self.create_node(path, &Properties::new()).await
    }

    /// Upload a file into the node at `path` and track the node.
    ///
    /// The path is tracked at most once however many files are uploaded to
    /// it. The response is returned unchecked.
    pub async fn create_file_node(
        &mut self,
        path: &str,
        upload: &FileUpload,
    ) -> Result<NodeResponse, FixtureError> {
        let response = self.repository.create_file_node(path, upload).await?;

        if !self.created_nodes.iter().any(|tracked| tracked == path) {
            self.created_nodes.push(path.to_string());
        }
        Ok(response)
    }

    /// Create a user and track it for deletion.
    pub async fn create_user(&mut self, username: &str) -> Result<User, FixtureError> {
        let user = self
            .users
            .create_user(username)
            .await?
            .ok_or_else(|| FixtureError::CreationFailed {
                kind: ResourceKind::User,
                id: username.to_string(),
            })?;

        self.created_users.push(user.clone());
        Ok(user)
    }

    /// Create a group and track its name for deletion.
    pub async fn create_group(&mut self, groupname: &str) -> Result<Group, FixtureError> {
        let group = self
            .users
            .create_group(groupname)
            .await?
            .ok_or_else(|| FixtureError::CreationFailed {
                kind: ResourceKind::Group,
                id: groupname.to_string(),
            })?;

        self.created_groups.push(groupname.to_string());
        Ok(group)
    }

    /// Create site `id` in the container at `path` and track it for deletion.
    ///
    /// The site is tracked as `path` and `id` concatenated without a
    /// separator, the key the site manager deletes by.
    pub async fn create_site(
        &mut self,
        path: &str,
        title: &str,
        id: &str,
    ) -> Result<Site, FixtureError> {
        let site = self
            .sites
            .create_site(path, title, id)
            .await?
            .ok_or_else(|| FixtureError::CreationFailed {
                kind: ResourceKind::Site,
                id: path.to_string(),
            })?;

        self.created_sites.push(format!("{path}{id}"));
        Ok(site)
    }

    /// Repository client the fixture creates and deletes nodes through.
    pub fn repository(&self) -> &dyn ContentRepository {
        self.repository.as_ref()
    }

    /// User and group manager bound to the repository client.
    pub fn users(&self) -> &dyn UserDirectory {
        self.users.as_ref()
    }

    /// Site manager bound to the repository client.
    pub fn sites(&self) -> &dyn SiteDirectory {
        self.sites.as_ref()
    }

    /// Search manager for test bodies; the fixture never calls it.
    pub fn search(&self) -> &SearchManager {
        &self.search
    }

    /// Node paths awaiting deletion, in creation order.
    pub fn created_nodes(&self) -> &[String] {
        &self.created_nodes
    }

    /// Users awaiting deletion, in creation order.
    pub fn created_users(&self) -> &[User] {
        &self.created_users
    }

    /// Group names awaiting deletion, in creation order.
    pub fn created_groups(&self) -> &[String] {
        &self.created_groups
    }

    /// Site keys (`path` + `id`) awaiting deletion.
    pub fn created_sites(&self) -> &[String] {
        &self.created_sites
    }

    fn has_tracked_resources(&self) -> bool {
        !(self.created_nodes.is_empty()
            && self.created_users.is_empty()
            && self.created_groups.is_empty()
            && self.created_sites.is_empty())
    }
}

impl Drop for SlingTest {
    fn drop(&mut self) {
        if self.has_tracked_resources() {
            let users: Vec<&str> = self.created_users.iter().map(|u| u.name.as_str()).collect();
            warn!(
                nodes = ?self.created_nodes,
                users = ?users,
                groups = ?self.created_groups,
                sites = ?self.created_sites,
                "Sling test fixture dropped without teardown; tracked resources were not deleted"
            );
        }
    }
}

fn record_deletion(
    failures: &mut Vec<DeletionFailure>,
    kind: ResourceKind,
    id: &str,
    result: Result<bool, sling_client::Error>,
) {
    let reason = match result {
        Ok(true) => {
            debug!(kind = %kind, id = id, "Deleted tracked resource");
            return;
        }
        Ok(false) => DeletionFailureReason::Refused,
        Err(e) => DeletionFailureReason::Client(e),
    };

    error!(kind = %kind, id = id, reason = %reason, "Failed to delete tracked resource");
    failures.push(DeletionFailure {
        kind,
        id: id.to_string(),
        reason,
    });
}
