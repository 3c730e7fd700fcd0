//! Typed async client for the Firestorm JSON document store.
//!
//! This crate is the primary entry point for users of firestorm. It re-exports the
//! core types from the sub-crates and gives access to the available transports.
//!
//! A Firestorm server stores named collections of JSON documents, each under a string
//! key, and exposes them through a read endpoint, a write endpoint protected by a token,
//! and a file endpoint. The client keeps no local state besides its configuration:
//! every operation is one request.
//!
//! # Features
//!
//! - **Collections** - Reads, searches, random sampling and writes on documents by key
//! - **Typed documents** - Deserialize documents into your own Serde types
//! - **Decorators** - Post-process every document returned by a read
//! - **Files** - Upload, download and delete files stored by the server
//! - **Pluggable transports** - HTTP for real servers, in-memory for tests
//!
//! # Quick Start
//!
//! ```ignore
//! use firestorm::{prelude::*, memory::InMemoryServer};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(default, skip_serializing)]
//!     pub id: String,
//!     pub name: String,
//!     pub age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> FirestormResult<()> {
//!     let config = Config::builder()
//!         .address("http://firestorm.test")
//!         .token("secret")
//!         .build();
//!     let client = Firestorm::with_config(InMemoryServer::new("secret"), Arc::new(config));
//!
//!     let users = client.typed_collection::<User>("users");
//!     users.set("alice", &User { id: String::new(), name: "Alice".into(), age: 30 }).await?;
//!
//!     let adults = users.search(&[SearchOption::gte("age", 18)], false).await?;
//!     assert_eq!(adults[0].id, "alice");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Clients created with [`Firestorm::new`] read the process-wide [`Config::global`],
//! which can be filled from code or from the `FIRESTORM_ADDRESS` and `FIRESTORM_TOKEN`
//! environment variables through [`Config::from_env`]. Use [`Firestorm::with_config`]
//! to give a client its own configuration.
//!
//! # Transports
//!
//! - [`memory`] - In-process server for tests and offline development
//! - [`http`] - HTTP transport for real servers (requires `http` feature)

pub mod prelude;

pub use firestorm_core::{
    client, collection, config, decorator, document, error, files, options, request, response,
    transport,
};

pub use firestorm_core::{client::Firestorm, config::Config};

// Re-exported for implementors of `Transport`
pub use async_trait::async_trait;
pub use serde_json;

/// In-process server answering requests without a network.
pub mod memory {
    pub use firestorm_memory::{InMemoryServer, InMemoryServerBuilder, Method, RecordedRequest};
}

/// HTTP transport for real Firestorm servers.
///
/// This module is only available when the `http` feature is enabled.
#[cfg(feature = "http")]
pub mod http {
    pub use firestorm_http::{HttpTransport, HttpTransportBuilder};
}
