//! In-process Firestorm server for firestorm.
//!
//! This crate provides [`InMemoryServer`], a [`Transport`](firestorm_core::transport::Transport)
//! that answers requests itself instead of sending them over HTTP. It is meant for tests
//! and offline development: the client code under test runs unchanged while the server
//! state stays inspectable.
//!
//! # Features
//!
//! - **All read and write commands** - Including search criteria, seeded random sampling and field edits
//! - **File storage** - Uploads, downloads and deletes through the file endpoint
//! - **Token checks** - Writes signed with the wrong token are rejected with a 403
//! - **Request log** - Every received request is recorded for assertions
//! - **Scripted replies** - Canned responses per command to exercise error handling
//!
//! # Quick Start
//!
//! ```ignore
//! use firestorm::{Config, Firestorm, memory::InMemoryServer};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = InMemoryServer::new("secret");
//!     let config = Config::builder()
//!         .address("http://firestorm.test")
//!         .token("secret")
//!         .build();
//!     let client = Firestorm::with_config(server.clone(), Arc::new(config));
//!
//!     let users = client.collection("users");
//!     let id = users.add(&json!({ "name": "Alice" })).await?;
//!     assert_eq!(users.get(id.as_str()).await?["name"], json!("Alice"));
//!
//!     Ok(())
//! }
//! ```

mod evaluator;
pub mod server;

pub use server::{InMemoryServer, InMemoryServerBuilder, Method, RecordedRequest};
