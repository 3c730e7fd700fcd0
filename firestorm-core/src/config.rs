//! Server address and write token storage.
//!
//! A [`Config`] holds the base address of a Firestorm server and the token used to
//! authorize writes. Collections and file handles read it on every call, so a value
//! changed through a setter is picked up by the next request.
//!
//! Most applications configure the process default once at startup:
//!
//! ```ignore
//! use firestorm::config::Config;
//!
//! Config::global().set_address("http://localhost:8000/firestorm");
//! Config::global().set_token("my-write-token");
//! ```

use std::{env, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{FirestormError, FirestormResult};

/// Environment variable read by [`Config::from_env`] for the server address.
pub const ADDRESS_ENV: &str = "FIRESTORM_ADDRESS";
/// Environment variable read by [`Config::from_env`] for the write token.
pub const TOKEN_ENV: &str = "FIRESTORM_TOKEN";

const READ_ENDPOINT: &str = "get.php";
const WRITE_ENDPOINT: &str = "post.php";
const FILE_ENDPOINT: &str = "files.php";

static GLOBAL: Lazy<Arc<Config>> = Lazy::new(|| Arc::new(Config::new()));

/// Address and token store shared by collections and file handles.
#[derive(Debug, Default)]
pub struct Config {
    address: RwLock<Option<String>>,
    token: RwLock<Option<String>>,
}

impl Config {
    /// Creates an empty configuration. Both accessors fail until set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide default configuration.
    pub fn global() -> Arc<Config> {
        GLOBAL.clone()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Builds a configuration from `FIRESTORM_ADDRESS` and `FIRESTORM_TOKEN`.
    ///
    /// Missing variables leave the corresponding value unset.
    pub fn from_env() -> Self {
        let config = Config::new();

        if let Ok(address) = env::var(ADDRESS_ENV) {
            config.set_address(address);
        }
        if let Ok(token) = env::var(TOKEN_ENV) {
            config.set_token(token);
        }

        config
    }

    /// Returns the base address, always ending with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::Configuration`] if no address was set.
    pub fn address(&self) -> FirestormResult<String> {
        self.address
            .read()
            .clone()
            .ok_or_else(|| FirestormError::Configuration("Firestorm address was not configured".into()))
    }

    /// Sets the base address, appending a trailing `/` when missing.
    pub fn set_address(&self, address: impl Into<String>) {
        let mut address = address.into();
        if !address.ends_with('/') {
            address.push('/');
        }
        *self.address.write() = Some(address);
    }

    /// Returns the write token.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::Configuration`] if no token was set.
    pub fn token(&self) -> FirestormResult<String> {
        self.token
            .read()
            .clone()
            .ok_or_else(|| FirestormError::Configuration("Firestorm token was not configured".into()))
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// URL of the read endpoint (`get.php`).
    pub fn read_address(&self) -> FirestormResult<String> {
        Ok(self.address()? + READ_ENDPOINT)
    }

    /// URL of the write endpoint (`post.php`).
    pub fn write_address(&self) -> FirestormResult<String> {
        Ok(self.address()? + WRITE_ENDPOINT)
    }

    /// URL of the file endpoint (`files.php`).
    pub fn file_address(&self) -> FirestormResult<String> {
        Ok(self.address()? + FILE_ENDPOINT)
    }
}

/// Builder for [`Config`] instances that are not the process default.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    address: Option<String>,
    token: Option<String>,
}

impl ConfigBuilder {
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn build(self) -> Config {
        let config = Config::new();

        if let Some(address) = self.address {
            config.set_address(address);
        }
        if let Some(token) = self.token {
            config.set_token(token);
        }

        config
    }
}
