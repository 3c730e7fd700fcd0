//! Convenient re-exports of commonly used types from firestorm.
//!
//! ```ignore
//! use firestorm::prelude::*;
//! ```
//!
//! This provides access to:
//! - The client, its configuration and collection handles
//! - Documents, keys and query options
//! - The transport traits
//! - Error types

pub use firestorm_core::{
    client::Firestorm,
    collection::{Collection, TypedCollection},
    config::{Config, ConfigBuilder},
    decorator::{Decorator, DecoratorChain},
    document::{Document, DocumentMap, ID_FIELD, Key},
    error::{FirestormError, FirestormResult},
    files::FileHandle,
    options::{
        Criteria, EditFieldOption, EditOperation, SearchOption, SearchRandom, SelectOption,
        ValueOption,
    },
    response::WriteConfirmation,
    transport::{Transport, TransportBuilder},
};
