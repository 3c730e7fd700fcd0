//! Core of a typed async client for the Firestorm JSON document store.
//!
//! This crate implements the request/response contract of a Firestorm server and
//! provides:
//!
//! - **Configuration** ([`config`]) - Server address and write token storage
//! - **Transport abstraction** ([`transport`]) - The seam to whatever carries HTTP requests
//! - **Documents and keys** ([`document`]) - JSON documents and their storage keys
//! - **Options** ([`options`]) - Search predicates, projections and field edits
//! - **Request shaping** ([`request`]) - Read and write envelopes
//! - **Response normalization** ([`response`]) - Status checks and id injection
//! - **Decorators** ([`decorator`]) - User transforms applied to read results
//! - **Collections** ([`collection`]) - High-level API for one collection
//! - **Files** ([`files`]) - The file storage endpoint
//! - **Client** ([`client`]) - Ties a transport to a configuration
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use firestorm::prelude::*;
//! use serde_json::json;
//!
//! # async fn example(transport: impl Transport) -> FirestormResult<()> {
//! Config::global().set_address("https://example.com/firestorm");
//! Config::global().set_token("write-token");
//!
//! let client = Firestorm::new(transport);
//! let users = client.collection("users");
//!
//! users.set("alice", &json!({ "name": "Alice", "age": 30 })).await?;
//! let adults = users.search(&[SearchOption::gte("age", 18)], false).await?;
//! # Ok(()) }
//! ```

pub mod client;
pub mod collection;
pub mod config;
pub mod decorator;
pub mod document;
pub mod error;
pub mod files;
pub mod options;
pub mod request;
pub mod response;
pub mod transport;
