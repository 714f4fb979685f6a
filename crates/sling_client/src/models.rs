//! Request and response types shared by the content repository operations.

use std::collections::BTreeMap;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Property name to value mapping posted when creating a node.
pub type Properties = BTreeMap<String, String>;

/// Content type used for uploads when the caller does not name one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// The raw outcome of a node creation or file upload.
///
/// Sling answers most writes with an HTML status page, so the client keeps
/// the status and body and leaves the judgement to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeResponse {
    /// HTTP status code returned by the server
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl NodeResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the server answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the server answered with exactly `500 Internal Server Error`.
    pub fn is_internal_server_error(&self) -> bool {
        self.status == 500
    }
}

/// A file to upload into a node as a multipart form field.
///
/// # Examples
///
/// ```rust
/// use sling_client::FileUpload;
///
/// let upload = FileUpload::new("file", "notes.txt", b"hello".to_vec());
/// assert_eq!(upload.content_type, "text/plain");
///
/// let upload = upload.with_content_type("application/json");
/// assert_eq!(upload.content_type, "application/json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Name of the multipart form field carrying the file
    pub field_name: String,
    /// File name reported to the server
    pub file_name: String,
    /// Raw file content
    pub data: Vec<u8>,
    /// MIME type of the content
    pub content_type: String,
}

impl FileUpload {
    /// Create an upload with the default `text/plain` content type.
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            data: data.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Replace the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}
