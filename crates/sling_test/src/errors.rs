//! Error types for fixture operations.
//!
//! Creation helpers fail with [`FixtureError::CreationFailed`] where a test
//! framework would raise an assertion failure; teardown collects every
//! failed deletion into a single [`FixtureError::Teardown`].

use std::fmt;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// The kind of resource a fixture tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Node,
    User,
    Group,
    Site,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Node => "node",
            ResourceKind::User => "user",
            ResourceKind::Group => "group",
            ResourceKind::Site => "site",
        };
        f.write_str(name)
    }
}

/// Why a tracked resource could not be deleted.
#[derive(Debug)]
pub enum DeletionFailureReason {
    /// The server answered, but did not confirm the delete.
    Refused,
    /// The delete request itself failed.
    Client(sling_client::Error),
}

impl fmt::Display for DeletionFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionFailureReason::Refused => f.write_str("server refused the delete"),
            DeletionFailureReason::Client(e) => write!(f, "{e}"),
        }
    }
}

/// A tracked resource whose teardown deletion failed.
#[derive(Debug)]
pub struct DeletionFailure {
    /// Kind of the resource
    pub kind: ResourceKind,
    /// Identifier the delete was issued with
    pub id: String,
    /// What went wrong
    pub reason: DeletionFailureReason,
}

impl fmt::Display for DeletionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {} delete to succeed: {} ({})",
            self.kind, self.id, self.reason
        )
    }
}

/// Errors that can occur while a fixture creates or cleans up resources.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The server refused to create a resource.
    ///
    /// For nodes this means a `500` answer; for users, groups and sites the
    /// collaborator returned no handle.
    #[error("Expected {kind} to be created: {id}")]
    CreationFailed { kind: ResourceKind, id: String },

    /// A request failed before the server could answer.
    #[error("Sling client error: {0}")]
    Client(#[from] sling_client::Error),

    /// One or more teardown deletions failed. Every tracked resource was
    /// still attempted.
    #[error("Teardown failed for {} resource(s): {}", .0.len(), join_failures(.0))]
    Teardown(Vec<DeletionFailure>),
}

fn join_failures(failures: &[DeletionFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
