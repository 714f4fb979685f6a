//! User and group management.
//!
//! Sling exposes authorizables under `/system/userManager`. Creation and
//! deletion are form POSTs to selector URLs; a `200` means the server did
//! what was asked, anything else is treated as a refusal.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use tracing::{info, instrument, warn};

use crate::{Error, SlingClient};

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;

/// Password given to users created through [`UserManager::create_user`].
pub const DEFAULT_USER_PASSWORD: &str = "testuser";

const USER_MANAGER_PATH: &str = "system/userManager";

/// A Sling user identity: a login name and its password.
///
/// # Examples
///
/// ```rust
/// use sling_client::User;
///
/// let admin = User::admin();
/// assert_eq!(admin.name, "admin");
///
/// let alice = User::new("alice", "secret");
/// assert_eq!(alice.to_string(), "alice");
/// ```
#[derive(Debug)]
pub struct User {
    /// The login name of the user
    pub name: String,
    /// The user's password
    pub password: SecretString,
}

impl User {
    /// Create a user handle from a name and password.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The well-known administrative identity of a stock Sling install.
    pub fn admin() -> Self {
        Self::new("admin", "admin")
    }
}

impl Clone for User {
    fn clone(&self) -> Self {
        Self::new(self.name.clone(), self.password.expose_secret().to_owned())
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A Sling group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// The group's principal name
    pub name: String,
}

impl Group {
    /// Create a group handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// User and group lifecycle operations.
///
/// Creation returns `Ok(None)` when the server refuses, `Ok(Some(_))` with a
/// handle on success. Deletion returns whether the server confirmed it.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user with the default password.
    async fn create_user(&self, name: &str) -> Result<Option<User>, Error>;

    /// Delete the user called `name`.
    async fn delete_user(&self, name: &str) -> Result<bool, Error>;

    /// Create a group.
    async fn create_group(&self, name: &str) -> Result<Option<Group>, Error>;

    /// Delete the group called `name`.
    async fn delete_group(&self, name: &str) -> Result<bool, Error>;
}

/// [`UserDirectory`] backed by the Sling user manager servlets.
#[derive(Debug, Clone)]
pub struct UserManager {
    client: SlingClient,
}

impl UserManager {
    /// Bind a user manager to `client`.
    pub fn new(client: SlingClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectory for UserManager {
    #[instrument(skip(self))]
    async fn create_user(&self, name: &str) -> Result<Option<User>, Error> {
        let response = self
            .client
            .post_form(
                &format!("{USER_MANAGER_PATH}/user.create.html"),
                &[
                    (":name", name),
                    ("pwd", DEFAULT_USER_PASSWORD),
                    ("pwdConfirm", DEFAULT_USER_PASSWORD),
                ],
            )
            .await?;

        let status = response.status().as_u16();
        if status == 200 {
            info!(user = name, "Created user");
            Ok(Some(User::new(name, DEFAULT_USER_PASSWORD)))
        } else {
            warn!(user = name, status = status, "User creation refused");
            Ok(None)
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, name: &str) -> Result<bool, Error> {
        let url = self.client.url_with_segment(
            &format!("{USER_MANAGER_PATH}/user"),
            &format!("{name}.delete.html"),
        )?;
        let response = self.client.post_form_to(url, &[("go", "1")]).await?;

        let deleted = response.status().as_u16() == 200;
        if deleted {
            info!(user = name, "Deleted user");
        } else {
            warn!(user = name, status = response.status().as_u16(), "User delete refused");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn create_group(&self, name: &str) -> Result<Option<Group>, Error> {
        let response = self
            .client
            .post_form(&format!("{USER_MANAGER_PATH}/group.create.html"), &[(":name", name)])
            .await?;

        let status = response.status().as_u16();
        if status == 200 {
            info!(group = name, "Created group");
            Ok(Some(Group::new(name)))
        } else {
            warn!(group = name, status = status, "Group creation refused");
            Ok(None)
        }
    }

    #[instrument(skip(self))]
    async fn delete_group(&self, name: &str) -> Result<bool, Error> {
        let url = self.client.url_with_segment(
            &format!("{USER_MANAGER_PATH}/group"),
            &format!("{name}.delete.html"),
        )?;
        let response = self.client.post_form_to(url, &[("go", "1")]).await?;

        let deleted = response.status().as_u16() == 200;
        if deleted {
            info!(group = name, "Deleted group");
        } else {
            warn!(group = name, status = response.status().as_u16(), "Group delete refused");
        }
        Ok(deleted)
    }
}
