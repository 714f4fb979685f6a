//! Error types for Sling client operations.
//!
//! This module defines the errors that can occur when talking to a Sling
//! server through the sling_client crate. Server refusals (a non-200 status
//! on a create or delete) are not errors: they are reported in the returned
//! value so callers can decide how strict to be.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during Sling client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use sling_client::Error;
///
/// match client.delete_node("/content/test").await {
///     Ok(true) => println!("deleted"),
///     Ok(false) => eprintln!("server refused the delete"),
///     Err(Error::Http(e)) => eprintln!("request failed: {}", e),
///     Err(err) => eprintln!("other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be sent or its response could not be read.
    ///
    /// This covers connection failures, timeouts and broken response bodies.
    /// A response with an error status is not an `Http` error.
    #[error("HTTP request to Sling failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A server URL or resource path could not be turned into a valid URL.
    #[error("Invalid Sling URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Error deserializing a JSON response from Sling.
    #[error("Failed to deserialize Sling response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A file upload was rejected before sending, e.g. because of a malformed
    /// content type.
    ///
    /// Parameters: (file name, reason)
    #[error("Invalid upload for file '{0}': {1}")]
    InvalidUpload(String, String),
}
