//! Document and key types exchanged with a Firestorm server.
//!
//! A document is a plain JSON object. Its key inside the collection is not part of the
//! stored value; the client attaches it under the id field ([`ID_FIELD`] by default)
//! when a document is read and removes it again before the document is written.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value};
use std::fmt;

use crate::error::FirestormResult;

/// Default name of the field holding a document's own key.
pub const ID_FIELD: &str = "id";

/// A single record: field name to arbitrary JSON value.
pub type Document = Map<String, Value>;

/// Documents keyed by their storage key, in server order.
pub type DocumentMap = IndexMap<String, Document>;

/// Collection entries keyed by their storage key, whatever their JSON type.
pub type RawCollection = IndexMap<String, Value>;

/// The key of a document inside its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    String(String),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::String(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::String(value.clone())
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

macro_rules! key_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Key {
                fn from(value: $t) -> Self {
                    Key::Int(value as i64)
                }
            }
        )*
    };
}

key_from_int!(i32, i64, u8, u16, u32);

/// Deserializes a [`Document`] into a concrete type.
pub fn from_document<T: DeserializeOwned>(document: Document) -> FirestormResult<T> {
    Ok(from_value(Value::Object(document))?)
}
