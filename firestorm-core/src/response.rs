//! Response normalization.
//!
//! Pure functions that turn what the server sent back into the values handed to callers:
//! status checking, rejection of bare error strings, and re-attaching each document's
//! key under the id field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document::{Document, DocumentMap, RawCollection},
    error::{FirestormError, FirestormResult},
    transport::{BinaryResponse, Response},
};

/// Server acknowledgement of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteConfirmation {
    pub message: String,
}

/// Returns the body of a successful response.
///
/// # Errors
///
/// Returns [`FirestormError::Transport`] for any non-2xx status, whatever the body.
pub fn extract(response: Response) -> FirestormResult<Value> {
    if !response.is_success() {
        return Err(FirestormError::Transport {
            status: response.status,
            body: body_text(&response.body),
        });
    }

    Ok(response.body)
}

/// Binary counterpart of [`extract`].
pub fn extract_binary(response: BinaryResponse) -> FirestormResult<Vec<u8>> {
    if !response.is_success() {
        return Err(FirestormError::Transport {
            status: response.status,
            body: String::from_utf8_lossy(&response.bytes).into_owned(),
        });
    }

    Ok(response.bytes)
}

fn body_text(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rejects bodies that are neither an object nor an array.
///
/// The server reports some logical errors as a bare string with a success status.
pub fn expect_object_like(body: Value) -> FirestormResult<Value> {
    match body {
        Value::Object(_) | Value::Array(_) => Ok(body),
        other => Err(FirestormError::shape(&other)),
    }
}

/// Reads a `{key: entry}` body without looking at the entries.
///
/// An empty array is accepted as an empty collection since that is how an empty map
/// survives some server-side encoders.
pub fn raw_entries(body: Value) -> FirestormResult<RawCollection> {
    match body {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Array(items) if items.is_empty() => Ok(RawCollection::new()),
        other => Err(FirestormError::shape(&other)),
    }
}

/// Turns a `{key: document}` body into a [`DocumentMap`], giving every document
/// `id_field = key`.
///
/// # Errors
///
/// Returns [`FirestormError::UnexpectedResponseShape`] if an entry is not an object.
pub fn documents(body: Value, id_field: &str) -> FirestormResult<DocumentMap> {
    raw_entries(body)?
        .into_iter()
        .map(|(key, value)| match value {
            Value::Object(mut document) => {
                document.insert(id_field.to_string(), Value::String(key.clone()));
                Ok((key, document))
            }
            other => Err(FirestormError::UnexpectedResponseShape(format!(
                "entry {key} is not a document: {other}"
            ))),
        })
        .collect()
}

/// Same as [`documents`] with ids injected, keeping only the documents in server order.
pub fn document_list(body: Value, id_field: &str) -> FirestormResult<Vec<Document>> {
    Ok(documents(body, id_field)?
        .into_values()
        .collect())
}

/// Extracts the only document of a `get` response, `{key: document}`.
///
/// # Errors
///
/// Returns [`FirestormError::UnexpectedResponseShape`] unless the body holds exactly
/// one document.
pub fn single_document(body: Value, id_field: &str) -> FirestormResult<Document> {
    let mut map = documents(body, id_field)?;

    if map.len() != 1 {
        return Err(FirestormError::UnexpectedResponseShape(format!(
            "expected exactly one document, got {}",
            map.len()
        )));
    }

    map.pop()
        .map(|(_, document)| document)
        .ok_or_else(|| FirestormError::UnexpectedResponseShape("empty response".into()))
}

/// Collects the non-null values of a `values` response, array or object.
pub fn distinct_values(body: Value) -> FirestormResult<Vec<Value>> {
    let values: Vec<Value> = match body {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => return Err(FirestormError::shape(&other)),
    };

    Ok(values
        .into_iter()
        .filter(|v| !v.is_null())
        .collect())
}

/// Parses a plain write acknowledgement.
pub fn write_confirmation(body: Value) -> FirestormResult<WriteConfirmation> {
    if !body.is_object() {
        return Err(FirestormError::shape(&body));
    }

    WriteConfirmation::deserialize(&body).map_err(|_| FirestormError::shape(&body))
}

/// Reads the key assigned by `add`, `{id: string}`.
pub fn added_id(body: Value) -> FirestormResult<String> {
    match body.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        _ => Err(FirestormError::shape(&body)),
    }
}

/// Reads the keys assigned by `addBulk`, `{ids: [string]}`.
pub fn added_ids(body: Value) -> FirestormResult<Vec<String>> {
    let ids = match body.get("ids") {
        Some(Value::Array(ids)) => ids,
        _ => return Err(FirestormError::shape(&body)),
    };

    ids.iter()
        .map(|id| match id {
            Value::String(id) => Ok(id.clone()),
            _ => Err(FirestormError::shape(&body)),
        })
        .collect()
}
