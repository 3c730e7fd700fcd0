//! HTTP transport for firestorm.
//!
//! This crate provides [`HttpTransport`], the [`Transport`](firestorm_core::transport::Transport)
//! used to talk to a real Firestorm server. It is built on `reqwest` with rustls.
//!
//! To use this transport, include the `http` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! firestorm = { version = "x.y.z", features = ["http"] }
//! ```
//!
//! Only the status and the body of responses are surfaced: bodies that parse as JSON
//! are returned parsed, anything else as a JSON string holding the raw text. Requests
//! that never got a status back fail with
//! [`FirestormError::Connection`](firestorm_core::error::FirestormError::Connection).
//!
//! # Example
//!
//! ```ignore
//! use firestorm::{Config, Firestorm, http::HttpTransport, transport::TransportBuilder};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     Config::global().set_address("https://example.com/firestorm");
//!
//!     let transport = HttpTransport::builder()
//!         .timeout(Duration::from_secs(10))
//!         .build()
//!         .await?;
//!     let client = Firestorm::new(transport);
//!
//!     println!("{}", client.collection("users").sha1().await?);
//!     Ok(())
//! }
//! ```

pub mod transport;

pub use transport::{HttpTransport, HttpTransportBuilder};
