//! Transport abstraction for talking to a Firestorm server.
//!
//! This module defines the seam between the request/response contract implemented by
//! [`Collection`](crate::collection::Collection) and whatever actually moves bytes. The
//! core only needs "send a request, get a status and a body back"; it never looks at
//! headers, connection state or timeouts.
//!
//! # Traits
//!
//! - [`Transport`]: the async request interface
//! - [`TransportBuilder`]: factory trait for creating transport instances
//!
//! # Examples
//!
//! ```ignore
//! use firestorm::transport::Transport;
//! use serde_json::json;
//!
//! let response = transport
//!     .get("http://localhost/get.php", &json!({ "collection": "users", "command": "sha1" }))
//!     .await?;
//! assert_eq!(response.status, 200);
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};

use crate::error::FirestormResult;

/// A decoded response from the server.
///
/// `body` holds the parsed JSON when the server sent JSON, and the raw text wrapped
/// in [`Value::String`] otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A raw binary response, used for file downloads.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryResponse {
    pub status: u16,
    pub bytes: Vec<u8>,
}

impl BinaryResponse {
    pub fn new(status: u16, bytes: Vec<u8>) -> Self {
        Self { status, bytes }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The file part of a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Name of the multipart field carrying the file.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Abstract interface for moving requests to a Firestorm server.
///
/// Implementations must return the HTTP status and the parsed-or-raw body for every
/// request that reached the server, whatever the status. Mapping non-success statuses
/// to errors is done by the caller. Failures that produce no status at all (DNS, TLS,
/// refused connections) should be reported as
/// [`FirestormError::Connection`](crate::error::FirestormError::Connection).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single transport is shared by every
/// collection created from the same client.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends a GET request carrying `body` as JSON.
    ///
    /// The Firestorm read endpoint expects the command envelope in the request body
    /// even though the method is GET.
    async fn get(&self, url: &str, body: &Value) -> FirestormResult<Response>;

    /// Sends a POST request carrying `body` as JSON.
    async fn post_json(&self, url: &str, body: &Value) -> FirestormResult<Response>;

    /// Sends a `multipart/form-data` POST with text `fields` and one file part.
    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> FirestormResult<Response>;

    /// Sends a DELETE request carrying `body` as JSON.
    async fn delete(&self, url: &str, body: &Value) -> FirestormResult<Response>;

    /// Sends a GET request with `query` parameters and returns the raw body.
    async fn get_binary(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> FirestormResult<BinaryResponse>;
}

#[async_trait]
impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    async fn get(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).get(url, body).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).post_json(url, body).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> FirestormResult<Response> {
        (**self)
            .post_multipart(url, fields, file)
            .await
    }

    async fn delete(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).delete(url, body).await
    }

    async fn get_binary(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> FirestormResult<BinaryResponse> {
        (**self).get_binary(url, query).await
    }
}

#[async_trait]
impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    async fn get(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).get(url, body).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).post_json(url, body).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> FirestormResult<Response> {
        (**self)
            .post_multipart(url, fields, file)
            .await
    }

    async fn delete(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).delete(url, body).await
    }

    async fn get_binary(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> FirestormResult<BinaryResponse> {
        (**self).get_binary(url, query).await
    }
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn get(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).get(url, body).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).post_json(url, body).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> FirestormResult<Response> {
        (**self)
            .post_multipart(url, fields, file)
            .await
    }

    async fn delete(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        (**self).delete(url, body).await
    }

    async fn get_binary(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> FirestormResult<BinaryResponse> {
        (**self).get_binary(url, query).await
    }
}

#[async_trait]
pub trait TransportBuilder {
    type Transport: Transport;

    async fn build(self) -> FirestormResult<Self::Transport>;
}
