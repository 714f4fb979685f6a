//! Test fixture for Sling integration tests.
//!
//! This crate provides [`SlingTest`], a per-test fixture that hands out
//! repository, user, site and search handles and deletes everything a test
//! created once the test is over. It also provides configuration loading,
//! unique naming for test resources, and logging setup.

use chrono::Utc;
use std::sync::Once;
use uuid::Uuid;

pub mod config;
pub mod errors;
pub mod fixture;

pub use config::TestConfig;
pub use errors::{DeletionFailure, DeletionFailureReason, FixtureError, ResourceKind};
pub use fixture::SlingTest;

// Re-export the client types test bodies work with
pub use sling_client::{self, FileUpload, Group, NodeResponse, Properties, Site, User};

/// Generate a name for a test resource that will not collide with other runs.
///
/// Format: `{prefix}-{timestamp}-{random}`
///
/// # Examples
///
/// ```
/// use sling_test::unique_name;
///
/// let name = unique_name("user");
/// // Result: user-20240108120000-a1b2c3
/// assert!(name.starts_with("user-"));
/// ```
pub fn unique_name(prefix: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let random_suffix = Uuid::new_v4().simple().to_string()[..6].to_lowercase();
    format!("{}-{}-{}", prefix, timestamp, random_suffix)
}

/// Initialize logging for integration tests.
///
/// Safe to call from every test; only the first call installs the subscriber.
/// The level comes from `RUST_LOG` and defaults to `info`.
pub fn init_logging() {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
