//! Request shaping.
//!
//! Pure functions that turn a logical collection operation into the JSON payload sent to
//! the read (`get.php`) or write (`post.php`) endpoint. Nothing here touches the network.

use serde::Serialize;
use serde_json::{Map, Value, json, to_value};

use crate::{
    error::{FirestormError, FirestormResult},
    options::{SearchOption, SearchRandom},
};

/// Renames applied to option keys on their way to the wire, `(storage, wire)`.
const WIRE_FIELD_NAMES: &[(&str, &str)] = &[("ignore_case", "ignoreCase")];

/// Server commands, one per collection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Sha1,
    Get,
    SearchKeys,
    Search,
    ReadRaw,
    Select,
    Values,
    Random,
    WriteRaw,
    Add,
    AddBulk,
    Remove,
    RemoveBulk,
    Set,
    SetBulk,
    EditField,
    EditFieldBulk,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Sha1 => "sha1",
            Command::Get => "get",
            Command::SearchKeys => "searchKeys",
            Command::Search => "search",
            Command::ReadRaw => "read_raw",
            Command::Select => "select",
            Command::Values => "values",
            Command::Random => "random",
            Command::WriteRaw => "write_raw",
            Command::Add => "add",
            Command::AddBulk => "addBulk",
            Command::Remove => "remove",
            Command::RemoveBulk => "removeBulk",
            Command::Set => "set",
            Command::SetBulk => "setBulk",
            Command::EditField => "editField",
            Command::EditFieldBulk => "editFieldBulk",
        }
    }
}

/// How the value of a write request is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// One value under `value`; the id field is removed if the value is an object.
    Single,
    /// A list of values under `values`; the id field is removed from each object.
    Bulk,
    /// A map of documents under `value`; the id field is removed from each document.
    Keyed,
    /// Sent as-is under `value`. Used when the id field is the lookup key itself.
    Verbatim,
}

/// Builds a read envelope `{collection, command, ...extra}`.
pub fn read_envelope(collection: &str, command: Command, extra: Map<String, Value>) -> Value {
    let mut envelope = Map::new();
    envelope.insert("collection".into(), Value::String(collection.to_string()));
    envelope.insert("command".into(), Value::String(command.as_str().to_string()));
    envelope.extend(extra);

    Value::Object(envelope)
}

/// Builds a write envelope `{token, collection, command, value|values}`.
///
/// The value is canonicalized to plain JSON first. The `value`/`values` key is left out
/// when the canonical value is falsy (see [`is_falsy`]). Extra fields such as `key` are
/// added by the caller on the returned map.
pub fn write_envelope<V: Serialize + ?Sized>(
    token: &str,
    collection: &str,
    command: Command,
    value: Option<&V>,
    payload: Payload,
    id_field: &str,
) -> FirestormResult<Map<String, Value>> {
    let mut envelope = Map::new();
    envelope.insert("token".into(), Value::String(token.to_string()));
    envelope.insert("collection".into(), Value::String(collection.to_string()));
    envelope.insert("command".into(), Value::String(command.as_str().to_string()));

    let value = match value {
        Some(value) => to_value(value)?,
        None => Value::Null,
    };
    let value = strip_id(value, payload, id_field);

    if !is_falsy(&value) {
        let key = match payload {
            Payload::Bulk => "values",
            Payload::Single | Payload::Keyed | Payload::Verbatim => "value",
        };
        envelope.insert(key.into(), value);
    }

    Ok(envelope)
}

fn strip_id(mut value: Value, payload: Payload, id_field: &str) -> Value {
    match (payload, &mut value) {
        (Payload::Single, Value::Object(map)) => {
            map.shift_remove(id_field);
        }
        (Payload::Bulk, Value::Array(items)) => {
            for item in items.iter_mut() {
                if let Value::Object(map) = item {
                    map.shift_remove(id_field);
                }
            }
        }
        (Payload::Keyed, Value::Object(documents)) => {
            for document in documents.values_mut() {
                if let Value::Object(map) = document {
                    map.shift_remove(id_field);
                }
            }
        }
        _ => {}
    }

    value
}

/// JSON truthiness: null, `false`, zero, `""` and empty containers are falsy.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Renames top-level keys of an option object to their wire names.
fn to_wire(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let key = WIRE_FIELD_NAMES
                        .iter()
                        .find(|(storage, _)| *storage == key)
                        .map(|(_, wire)| wire.to_string())
                        .unwrap_or(key);
                    (key, value)
                })
                .collect(),
        ),
        other => other,
    }
}

/// Validates search options and builds the `search` request fields.
///
/// # Errors
///
/// Returns [`FirestormError::InvalidArgument`] if any option fails
/// [`SearchOption::validate`].
pub fn search_fields(options: &[SearchOption], random: SearchRandom) -> FirestormResult<Map<String, Value>> {
    let search = options
        .iter()
        .map(|option| {
            option.validate()?;
            Ok(to_wire(to_value(option)?))
        })
        .collect::<FirestormResult<Vec<Value>>>()?;

    let mut fields = Map::new();
    fields.insert("search".into(), Value::Array(search));

    match random {
        SearchRandom::Disabled => {}
        SearchRandom::Server => {
            fields.insert("random".into(), json!({}));
        }
        SearchRandom::Seed(seed) => {
            fields.insert("random".into(), json!({ "seed": seed }));
        }
    }

    Ok(fields)
}

/// Validates the arguments of `random` and builds its parameter object.
///
/// `offset` defaults to 0 once a seed is given.
///
/// # Errors
///
/// Returns [`FirestormError::InvalidArgument`] if `max < -1`, if `offset` is given
/// without `seed`, or if `offset < 0`.
pub fn random_params(max: Option<i64>, seed: Option<i64>, offset: Option<i64>) -> FirestormResult<Value> {
    let mut params = Map::new();

    if let Some(max) = max {
        if max < -1 {
            return Err(FirestormError::invalid("expected an integer >= -1 for max"));
        }
        params.insert("max".into(), json!(max));
    }

    if offset.is_some() && seed.is_none() {
        return Err(FirestormError::invalid("an offset requires a seed"));
    }

    if let Some(offset) = offset {
        if offset < 0 {
            return Err(FirestormError::invalid("expected an integer >= 0 for offset"));
        }
    }

    if let Some(seed) = seed {
        params.insert("seed".into(), json!(seed));
        params.insert("offset".into(), json!(offset.unwrap_or(0)));
    }

    Ok(Value::Object(params))
}
