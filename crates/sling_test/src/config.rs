//! Configuration for Sling integration tests.

use anyhow::{Context, Result};
use sling_client::{DEFAULT_SERVER_URL, User};
use std::env;
use url::Url;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Configuration for Sling integration tests loaded from environment variables.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Endpoint of the Sling server under test
    pub server_url: String,
    /// Identity used to create resources and to delete them during teardown
    pub admin: User,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            admin: User::admin(),
        }
    }
}

impl TestConfig {
    /// Create a configuration pointing at `server_url` with the stock admin identity.
    pub fn for_server(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// Load test configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `SLING_URL`: server endpoint (default `http://localhost:8080/`)
    /// - `SLING_ADMIN_USER`: administrative user name (default `admin`)
    /// - `SLING_ADMIN_PASSWORD`: administrative password (default `admin`)
    pub fn from_env() -> Result<Self> {
        let server_url = env::var("SLING_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Url::parse(&server_url)
            .with_context(|| format!("SLING_URL must be an absolute URL, got '{server_url}'"))?;

        let admin_name = env::var("SLING_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        if admin_name.is_empty() {
            anyhow::bail!("SLING_ADMIN_USER must not be empty");
        }
        let admin_password =
            env::var("SLING_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

        Ok(Self {
            server_url,
            admin: User::new(admin_name, admin_password),
        })
    }
}
