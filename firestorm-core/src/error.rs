//! Error types and result types for Firestorm client operations.
//!
//! Every fallible operation in this crate returns [`FirestormResult<T>`]. Errors are
//! raised to the caller of the operation that triggered them; nothing is retried.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a Firestorm server.
#[derive(Error, Debug)]
pub enum FirestormError {
    /// The server address or write token was read before being configured.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A caller-supplied argument violates a documented constraint.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The server answered with a non-success HTTP status.
    /// The body is carried as detail.
    #[error("Transport error (status {status}): {body}")]
    Transport {
        /// HTTP status code returned by the server.
        status: u16,
        /// Response body, rendered as text.
        body: String,
    },
    /// The request never produced a response (connection, TLS, timeout).
    #[error("Connection error: {0}")]
    Connection(String),
    /// The server answered with a success status but the body does not have
    /// the shape the operation expects.
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),
    /// Serialization/deserialization error when converting to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for Firestorm operations.
pub type FirestormResult<T> = Result<T, FirestormError>;

impl From<SerdeJsonError> for FirestormError {
    fn from(err: SerdeJsonError) -> Self {
        FirestormError::Serialization(err.to_string())
    }
}

impl FirestormError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FirestormError::InvalidArgument(message.into())
    }

    pub(crate) fn shape(body: &serde_json::Value) -> Self {
        FirestormError::UnexpectedResponseShape(match body {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
