//! Entry point tying a transport to a configuration.
//!
//! # Example
//!
//! ```ignore
//! use firestorm::{prelude::*, memory::InMemoryServer};
//!
//! let config = Arc::new(Config::builder().address("http://localhost/").token("secret").build());
//! let client = Firestorm::with_config(InMemoryServer::new("secret"), config);
//! let users = client.collection("users");
//! ```

use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::{
    collection::{Collection, TypedCollection},
    config::Config,
    files::FileHandle,
    transport::Transport,
};

/// A Firestorm client bound to a transport.
///
/// # Type Parameters
///
/// * `T` - The transport implementation type
#[derive(Debug)]
pub struct Firestorm<T: Transport> {
    transport: T,
    config: Arc<Config>,
}

impl<T: Transport> Firestorm<T> {
    /// Creates a client reading the process-wide [`Config::global`].
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::global())
    }

    /// Creates a client reading its own configuration.
    pub fn with_config(transport: T, config: Arc<Config>) -> Self {
        Self { transport, config }
    }

    /// Gets an untyped collection with the given name.
    pub fn collection(&self, name: &str) -> Collection<'_, T> {
        Collection::new(name.to_string(), &self.transport, &self.config)
    }

    /// Gets a collection whose documents deserialize into `D`.
    pub fn typed_collection<D>(&self, name: &str) -> TypedCollection<'_, T, D>
    where
        D: Serialize + DeserializeOwned,
    {
        self.collection(name).typed()
    }

    /// Gets a handle on the file storage endpoint.
    pub fn files(&self) -> FileHandle<'_, T> {
        FileHandle::new(&self.transport, &self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the client and returns its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
