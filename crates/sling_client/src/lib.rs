//! Crate for interacting with the Sling REST API.
//!
//! This crate provides a client for making authenticated requests to a
//! Sling content repository, plus thin managers for users, groups, sites and
//! search that share the client's connection and active identity.
//!
//! The fixture-facing operations are expressed as traits
//! ([`ContentRepository`], [`UserDirectory`], [`SiteDirectory`]) so test
//! harnesses can substitute their own implementations.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::{FileUpload, NodeResponse, Properties, DEFAULT_CONTENT_TYPE};

pub mod search;
pub use search::SearchManager;

pub mod sites;
pub use sites::{Site, SiteDirectory, SiteManager};

pub mod users;
pub use users::{Group, User, UserDirectory, UserManager};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Default endpoint of a locally running Sling server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/";

/// Node-level operations against a content repository.
///
/// # Implementation Requirements
///
/// - `create_node` and `create_file_node` must return the server's answer
///   as-is, without interpreting the status.
/// - `delete_node` returns `Ok(false)` when the server refuses the delete and
///   reserves `Err` for transport failures.
/// - `switch_user` changes the identity used by every subsequent request,
///   including requests made by managers bound to the same client.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Create (or update) the node at `path` with the given properties.
    async fn create_node(&self, path: &str, properties: &Properties)
        -> Result<NodeResponse, Error>;

    /// Upload a file into the node at `path`.
    async fn create_file_node(&self, path: &str, upload: &FileUpload)
        -> Result<NodeResponse, Error>;

    /// Delete the node at `path`. Returns whether the server confirmed it.
    async fn delete_node(&self, path: &str) -> Result<bool, Error>;

    /// Make `user` the identity for subsequent requests.
    fn switch_user(&self, user: &User);
}

/// A client for a Sling server, authenticated with HTTP basic auth.
///
/// Cloning is cheap and clones share the active identity, so a manager
/// built from a clone sees identity switches made through the original.
#[derive(Debug, Clone)]
pub struct SlingClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    identity: RwLock<User>,
}

impl SlingClient {
    /// Create a client for the server at `server_url`, acting as `user`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `server_url` is not an absolute URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sling_client::{SlingClient, User, DEFAULT_SERVER_URL};
    ///
    /// let client = SlingClient::new(DEFAULT_SERVER_URL, User::admin()).unwrap();
    /// assert_eq!(client.current_user(), "admin");
    /// ```
    pub fn new(server_url: &str, user: User) -> Result<Self, Error> {
        let mut base_url = Url::parse(server_url)?;

        // Repository paths are appended directly to the base path.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                base_url,
                identity: RwLock::new(user),
            }),
        })
    }

    /// The server URL that paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Name of the identity currently used for requests.
    pub fn current_user(&self) -> String {
        self.inner
            .identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .name
            .clone()
    }

    /// Resolve a repository path (e.g. `/content/foo`) to a server URL.
    ///
    /// The path is appended to the base path verbatim, so segments such as
    /// `jcr:system` are never read as a URL scheme.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        let mut url = self.inner.base_url.clone();
        let full_path = format!("{}{}", url.path(), path.trim_start_matches('/'));
        url.set_path(&full_path);
        Ok(url)
    }

    /// Resolve `parent` and append `segment` as a single, escaped path segment.
    pub(crate) fn url_with_segment(&self, parent: &str, segment: &str) -> Result<Url, Error> {
        let mut url = self.url_for(parent)?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    /// POST a form-encoded body to `path` as the current identity.
    pub(crate) async fn post_form<T>(&self, path: &str, form: &T) -> Result<Response, Error>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        self.post_form_to(url, form).await
    }

    /// POST a form-encoded body to an already resolved URL.
    pub(crate) async fn post_form_to<T>(&self, url: Url, form: &T) -> Result<Response, Error>
    where
        T: Serialize + ?Sized,
    {
        debug!(url = %url, "POST form");
        let request = self.authorize(self.inner.http.post(url)).form(form);
        Ok(request.send().await?)
    }

    /// GET `path` with query parameters as the current identity.
    pub(crate) async fn get<T>(&self, path: &str, query: &T) -> Result<Response, Error>
    where
        T: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        debug!(url = %url, "GET");
        let request = self.authorize(self.inner.http.get(url)).query(query);
        Ok(request.send().await?)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let identity = self
            .inner
            .identity
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        builder.basic_auth(&identity.name, Some(identity.password.expose_secret()))
    }
}

#[async_trait]
impl ContentRepository for SlingClient {
    #[instrument(skip(self, properties), fields(path = %path))]
    async fn create_node(
        &self,
        path: &str,
        properties: &Properties,
    ) -> Result<NodeResponse, Error> {
        let response = self.post_form(path, properties).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        info!(path = path, status = status, "Created node");
        Ok(NodeResponse::new(status, body))
    }

    #[instrument(skip(self, upload), fields(path = %path, file_name = %upload.file_name))]
    async fn create_file_node(
        &self,
        path: &str,
        upload: &FileUpload,
    ) -> Result<NodeResponse, Error> {
        let part = Part::bytes(upload.data.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| Error::InvalidUpload(upload.file_name.clone(), e.to_string()))?;
        let form = Form::new().part(upload.field_name.clone(), part);

        let url = self.url_for(path)?;
        let response = self
            .authorize(self.inner.http.post(url))
            .multipart(form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        info!(
            path = path,
            file_name = upload.file_name,
            status = status,
            "Uploaded file node"
        );
        Ok(NodeResponse::new(status, body))
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete_node(&self, path: &str) -> Result<bool, Error> {
        let response = self.post_form(path, &[(":operation", "delete")]).await?;
        let status = response.status();

        if status.as_u16() == 200 {
            info!(path = path, "Deleted node");
            Ok(true)
        } else {
            warn!(path = path, status = status.as_u16(), "Node delete refused");
            Ok(false)
        }
    }

    fn switch_user(&self, user: &User) {
        let mut identity = self
            .inner
            .identity
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!(from = identity.name, to = user.name, "Switching user");
        *identity = user.clone();
    }
}
