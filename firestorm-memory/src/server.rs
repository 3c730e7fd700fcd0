//! In-memory emulation of a Firestorm server.
//!
//! [`InMemoryServer`] implements [`Transport`] by answering requests itself instead of
//! sending them over the network. It understands the three endpoints of a Firestorm
//! server (`get.php`, `post.php` and `files.php`) and keeps collections and files in
//! async-aware read-write locks.
//!
//! Every request is recorded, so tests can assert on the exact payload a client sent or
//! on the fact that no request was sent at all.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use mea::rwlock::RwLock;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde_json::{Map, Value, json};
use sha1::{Digest, Sha1};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use firestorm_core::{
    error::{FirestormError, FirestormResult},
    options::{EditFieldOption, EditOperation},
    transport::{BinaryResponse, FilePart, Response, Transport, TransportBuilder},
};

use crate::evaluator::{SearchEvaluator, WireSearchOption};

const READ_ENDPOINT: &str = "get.php";
const WRITE_ENDPOINT: &str = "post.php";
const FILE_ENDPOINT: &str = "files.php";

type CollectionMap = IndexMap<String, Value>;

#[derive(Debug, Default)]
struct ServerState {
    collections: HashMap<String, CollectionMap>,
    files: HashMap<String, Vec<u8>>,
}

/// HTTP method of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A request as received by the server.
///
/// JSON requests keep their body. Multipart uploads record their text fields plus a
/// `file` entry holding the uploaded file name, and binary downloads record their query
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Value,
}

/// A request rejected by the server, answered with `{"message": ...}`.
#[derive(Debug)]
struct Rejection {
    status: u16,
    message: String,
}

impl Rejection {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: 400, message: message.into() }
    }

    fn forbidden(message: impl Into<String>) -> Self {
        Self { status: 403, message: message.into() }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self { status: 404, message: message.into() }
    }
}

type Outcome = Result<Value, Rejection>;

fn respond(outcome: Outcome) -> Response {
    match outcome {
        Ok(body) => Response::new(200, body),
        Err(rejection) => Response::new(rejection.status, json!({ "message": rejection.message })),
    }
}

/// A Firestorm server living in the current process.
///
/// Clones share the same collections, files and request log.
///
/// # Example
///
/// ```ignore
/// use firestorm::{Config, Firestorm, memory::InMemoryServer};
/// use std::sync::Arc;
///
/// let server = InMemoryServer::new("secret");
/// let config = Arc::new(Config::builder().address("http://firestorm.test").token("secret").build());
/// let client = Firestorm::with_config(server.clone(), config);
///
/// client.collection("users").set("alice", &serde_json::json!({ "age": 30 })).await?;
/// assert_eq!(server.request_count().await, 1);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryServer {
    token: Arc<str>,
    state: Arc<RwLock<ServerState>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    /// Canned responses, by command name, returned instead of executing the command.
    scripted: Arc<RwLock<HashMap<String, Response>>>,
}

impl InMemoryServer {
    /// Creates an empty server accepting writes signed with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_state(token.into(), ServerState::default())
    }

    fn with_state(token: String, state: ServerState) -> Self {
        Self {
            token: Arc::from(token),
            state: Arc::new(RwLock::new(state)),
            requests: Arc::new(RwLock::new(Vec::new())),
            scripted: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn builder() -> InMemoryServerBuilder {
        InMemoryServerBuilder::default()
    }

    /// Returns a snapshot of a collection, empty if it was never written.
    pub async fn collection(&self, name: &str) -> IndexMap<String, Value> {
        self.state
            .read()
            .await
            .collections
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the stored content of a file.
    pub async fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.read().await.files.get(path).cloned()
    }

    /// Answers every future request for `command` with `response`.
    pub async fn script(&self, command: &str, response: Response) {
        self.scripted
            .write()
            .await
            .insert(command.to_string(), response);
    }

    /// Returns every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub async fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.read().await.last().cloned()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    async fn record(&self, method: Method, url: &str, body: Value) {
        trace!(?method, url, "request received");

        self.requests.write().await.push(RecordedRequest {
            method,
            url: url.to_string(),
            body,
        });
    }

    async fn scripted_response(&self, body: &Value) -> Option<Response> {
        let command = body.get("command")?.as_str()?;
        self.scripted.read().await.get(command).cloned()
    }

    fn check_token(&self, token: Option<&str>) -> Result<(), Rejection> {
        if token == Some(&*self.token) {
            return Ok(());
        }

        warn!("rejected request with an invalid token");
        Err(Rejection::forbidden("Invalid token"))
    }

    async fn handle_read(&self, body: &Value) -> Outcome {
        let collection = string_field(body, "collection")?;
        let command = string_field(body, "command")?;

        debug!(collection, command, "handling read command");

        let state = self.state.read().await;
        let empty = CollectionMap::new();
        let documents = state.collections.get(collection).unwrap_or(&empty);

        match command {
            "sha1" => {
                let content = serde_json::to_vec(documents)
                    .map_err(|e| Rejection::bad_request(e.to_string()))?;
                Ok(Value::String(format!("{:x}", Sha1::digest(&content))))
            }
            "get" => {
                let key = body.get("id").and_then(key_of).ok_or_else(|| {
                    Rejection::bad_request("No key provided")
                })?;

                match documents.get(&key) {
                    Some(document) => Ok(single(key, document.clone())),
                    None => Err(Rejection::not_found(format!(
                        "get failed on collection {collection} with key {key}"
                    ))),
                }
            }
            "searchKeys" => {
                let keys = match body.get("search") {
                    Some(Value::Array(keys)) => keys,
                    _ => return Err(Rejection::bad_request("Incorrect search keys")),
                };

                Ok(Value::Object(
                    keys.iter()
                        .filter_map(key_of)
                        .filter_map(|key| documents.get(&key).map(|doc| (key, doc.clone())))
                        .collect(),
                ))
            }
            "search" => {
                let options: Vec<WireSearchOption> = body
                    .get("search")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|e| Rejection::bad_request(format!("Incorrect search options: {e}")))?
                    .ok_or_else(|| Rejection::bad_request("No search options provided"))?;

                let mut found: Vec<(String, Value)> = documents
                    .iter()
                    .filter(|(_, document)| SearchEvaluator::new(document).matches_all(&options))
                    .map(|(key, document)| (key.clone(), document.clone()))
                    .collect();

                if let Some(random) = body.get("random") {
                    shuffle(&mut found, random.get("seed").and_then(Value::as_i64));
                }

                Ok(Value::Object(found.into_iter().collect()))
            }
            "read_raw" => Ok(Value::Object(
                documents
                    .iter()
                    .map(|(key, document)| (key.clone(), document.clone()))
                    .collect(),
            )),
            "select" => {
                let fields: Vec<&str> = body
                    .pointer("/select/fields")
                    .and_then(Value::as_array)
                    .ok_or_else(|| Rejection::bad_request("No fields to select"))?
                    .iter()
                    .filter_map(Value::as_str)
                    .collect();

                Ok(Value::Object(
                    documents
                        .iter()
                        .map(|(key, document)| (key.clone(), project(document, &fields)))
                        .collect(),
                ))
            }
            "values" => {
                let field = body
                    .pointer("/values/field")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Rejection::bad_request("No field provided"))?;
                let flatten = body
                    .pointer("/values/flatten")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                Ok(Value::Array(distinct(documents, field, flatten)))
            }
            "random" => {
                let params = body.get("random").cloned().unwrap_or_else(|| json!({}));
                let max = params.get("max").and_then(Value::as_i64).unwrap_or(-1);
                let seed = params.get("seed").and_then(Value::as_i64);
                let offset = params.get("offset").and_then(Value::as_i64).unwrap_or(0);

                if max < -1 || offset < 0 {
                    return Err(Rejection::bad_request("Incorrect random parameters"));
                }

                let mut entries: Vec<(String, Value)> = documents
                    .iter()
                    .map(|(key, document)| (key.clone(), document.clone()))
                    .collect();
                shuffle(&mut entries, seed);

                let take = usize::try_from(max).unwrap_or(usize::MAX);

                Ok(Value::Object(
                    entries
                        .into_iter()
                        .skip(offset as usize)
                        .take(take)
                        .collect(),
                ))
            }
            other => Err(Rejection::bad_request(format!("Unknown command {other}"))),
        }
    }

    async fn handle_write(&self, body: &Value) -> Outcome {
        self.check_token(body.get("token").and_then(Value::as_str))?;

        let collection = string_field(body, "collection")?;
        let command = string_field(body, "command")?;
        let value = body.get("value");

        debug!(collection, command, "handling write command");

        let mut state = self.state.write().await;
        let documents = state
            .collections
            .entry(collection.to_string())
            .or_default();

        match command {
            "write_raw" => {
                let content = match value {
                    None => CollectionMap::new(),
                    Some(Value::Object(map)) => map.clone().into_iter().collect(),
                    Some(_) => return Err(Rejection::bad_request("write_raw value must be an object")),
                };
                *documents = content;
            }
            "add" => {
                let document = object_value(value)?;
                let key = Uuid::new_v4().to_string();
                documents.insert(key.clone(), document);

                return Ok(json!({ "id": key }));
            }
            "addBulk" => {
                let values = array_value(body.get("values"))?;
                let mut ids = Vec::with_capacity(values.len());

                for value in values {
                    let document = object_value(Some(value))?;
                    let key = Uuid::new_v4().to_string();
                    documents.insert(key.clone(), document);
                    ids.push(key);
                }

                return Ok(json!({ "ids": ids }));
            }
            "remove" => {
                let key = value
                    .and_then(key_of)
                    .ok_or_else(|| Rejection::bad_request("No key provided"))?;
                documents.shift_remove(&key);
            }
            "removeBulk" => {
                for key in array_value(value)?.iter().filter_map(key_of) {
                    documents.shift_remove(&key);
                }
            }
            "set" => {
                let key = body
                    .get("key")
                    .and_then(key_of)
                    .ok_or_else(|| Rejection::bad_request("No key provided"))?;
                let document = value.cloned().unwrap_or_else(|| json!({}));
                documents.insert(key, document);
            }
            "setBulk" => {
                let keys = array_value(body.get("keys"))?;
                let values = body
                    .get("values")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();

                if keys.len() != values.len() {
                    return Err(Rejection::bad_request("Keys and values must have the same length"));
                }

                for (key, document) in keys.iter().zip(values) {
                    let key = key_of(key).ok_or_else(|| Rejection::bad_request("Incorrect key"))?;
                    documents.insert(key, document);
                }
            }
            "editField" => {
                let option = value.ok_or_else(|| Rejection::bad_request("No edit provided"))?;
                edit_field(documents, option)?;
            }
            "editFieldBulk" => {
                for option in array_value(value)? {
                    edit_field(documents, option)?;
                }
            }
            other => return Err(Rejection::bad_request(format!("Unknown command {other}"))),
        }

        Ok(json!({ "message": format!("Successful {command} command") }))
    }

    async fn handle_upload(&self, fields: &HashMap<String, String>, file: FilePart) -> Outcome {
        self.check_token(fields.get("token").map(String::as_str))?;

        let path = fields
            .get("path")
            .ok_or_else(|| Rejection::bad_request("No path provided"))?;
        let overwrite = fields.get("overwrite").is_some_and(|v| v == "true");

        let mut state = self.state.write().await;
        if state.files.contains_key(path) && !overwrite {
            return Err(Rejection::forbidden("File already exists"));
        }

        debug!(path, size = file.content.len(), "storing file");
        state.files.insert(path.clone(), file.content);

        Ok(json!({ "message": format!("Written file successfully to {path}") }))
    }

    async fn handle_file_delete(&self, body: &Value) -> Outcome {
        self.check_token(body.get("token").and_then(Value::as_str))?;

        let path = string_field(body, "path")?;

        match self.state.write().await.files.remove(path) {
            Some(_) => Ok(json!({ "message": "File deleted successfully" })),
            None => Err(Rejection::not_found("File not found")),
        }
    }
}

#[async_trait]
impl Transport for InMemoryServer {
    async fn get(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        self.record(Method::Get, url, body.clone()).await;

        if !url.ends_with(READ_ENDPOINT) {
            return Ok(respond(Err(Rejection::not_found(format!("No endpoint at {url}")))));
        }

        if let Some(response) = self.scripted_response(body).await {
            return Ok(response);
        }

        Ok(respond(self.handle_read(body).await))
    }

    async fn post_json(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        self.record(Method::Post, url, body.clone()).await;

        if !url.ends_with(WRITE_ENDPOINT) {
            return Ok(respond(Err(Rejection::not_found(format!("No endpoint at {url}")))));
        }

        if let Some(response) = self.scripted_response(body).await {
            return Ok(response);
        }

        Ok(respond(self.handle_write(body).await))
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> FirestormResult<Response> {
        let fields: HashMap<String, String> = fields.into_iter().collect();

        let mut recorded: Map<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        recorded.insert(file.field.clone(), Value::String(file.file_name.clone()));
        self.record(Method::Post, url, Value::Object(recorded)).await;

        if !url.ends_with(FILE_ENDPOINT) {
            return Ok(respond(Err(Rejection::not_found(format!("No endpoint at {url}")))));
        }

        Ok(respond(self.handle_upload(&fields, file).await))
    }

    async fn delete(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        self.record(Method::Delete, url, body.clone()).await;

        if !url.ends_with(FILE_ENDPOINT) {
            return Ok(respond(Err(Rejection::not_found(format!("No endpoint at {url}")))));
        }

        Ok(respond(self.handle_file_delete(body).await))
    }

    async fn get_binary(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> FirestormResult<BinaryResponse> {
        let query: Map<String, Value> = query
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        let path = query.get("path").and_then(Value::as_str).map(str::to_string);
        self.record(Method::Get, url, Value::Object(query)).await;

        if !url.ends_with(FILE_ENDPOINT) {
            return Ok(BinaryResponse::new(404, b"Not found".to_vec()));
        }

        let file = match path {
            Some(path) => self.file(&path).await,
            None => return Ok(BinaryResponse::new(400, b"No path provided".to_vec())),
        };

        Ok(match file {
            Some(bytes) => BinaryResponse::new(200, bytes),
            None => BinaryResponse::new(404, b"File not found".to_vec()),
        })
    }
}

fn string_field<'v>(body: &'v Value, field: &str) -> Result<&'v str, Rejection> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Rejection::bad_request(format!("No {field} provided")))
}

/// Storage key of a JSON key, strings and integers alike.
fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

fn object_value(value: Option<&Value>) -> Result<Value, Rejection> {
    match value {
        Some(value @ Value::Object(_)) => Ok(value.clone()),
        _ => Err(Rejection::bad_request("Value must be an object")),
    }
}

fn array_value(value: Option<&Value>) -> Result<&Vec<Value>, Rejection> {
    value
        .and_then(Value::as_array)
        .ok_or_else(|| Rejection::bad_request("Value must be an array"))
}

fn single(key: String, document: Value) -> Value {
    let mut map = Map::new();
    map.insert(key, document);
    Value::Object(map)
}

fn shuffle<E>(entries: &mut [E], seed: Option<i64>) {
    match seed {
        Some(seed) => entries.shuffle(&mut StdRng::seed_from_u64(seed as u64)),
        None => entries.shuffle(&mut rand::thread_rng()),
    }
}

fn project(document: &Value, fields: &[&str]) -> Value {
    let Some(document) = document.as_object() else {
        return json!({});
    };

    Value::Object(
        fields
            .iter()
            .filter_map(|field| {
                document
                    .get(*field)
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect(),
    )
}

fn distinct(documents: &CollectionMap, field: &str, flatten: bool) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::new();

    let mut push = |value: &Value| {
        if !value.is_null() && !values.contains(value) {
            values.push(value.clone());
        }
    };

    for value in documents.values().filter_map(|document| document.get(field)) {
        match value {
            Value::Array(items) if flatten => items.iter().for_each(&mut push),
            other => push(other),
        }
    }

    values
}

fn edit_field(documents: &mut CollectionMap, option: &Value) -> Result<(), Rejection> {
    let option: EditFieldOption = serde_json::from_value(option.clone())
        .map_err(|e| Rejection::bad_request(format!("Incorrect edit: {e}")))?;

    let key = option.id.to_string();
    let document = documents
        .get_mut(&key)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Rejection::not_found(format!("No document with key {key}")))?;
    let field = option.field;

    match option.operation {
        EditOperation::Set => {
            document.insert(field, option.value.unwrap_or(Value::Null));
        }
        EditOperation::Remove => {
            document.shift_remove(&field);
        }
        EditOperation::Append => {
            let suffix = match option.value {
                Some(Value::String(suffix)) => suffix,
                _ => return Err(Rejection::bad_request("append requires a string value")),
            };
            let current = match document.get(&field) {
                None => String::new(),
                Some(Value::String(current)) => current.clone(),
                Some(_) => return Err(Rejection::bad_request(format!("{field} is not a string"))),
            };
            document.insert(field, Value::String(current + &suffix));
        }
        EditOperation::Increment | EditOperation::Decrement => {
            let amount = option.value.unwrap_or_else(|| json!(1));
            let current = document.get(&field).cloned().unwrap_or_else(|| json!(0));
            let negate = option.operation == EditOperation::Decrement;

            let result = match (current.as_i64(), amount.as_i64()) {
                (Some(current), Some(amount)) => {
                    json!(if negate { current - amount } else { current + amount })
                }
                _ => match (current.as_f64(), amount.as_f64()) {
                    (Some(current), Some(amount)) => {
                        json!(if negate { current - amount } else { current + amount })
                    }
                    _ => return Err(Rejection::bad_request(format!("{field} is not a number"))),
                },
            };
            document.insert(field, result);
        }
        EditOperation::Invert => {
            let current = match document.get(&field) {
                Some(Value::Bool(b)) => *b,
                _ => return Err(Rejection::bad_request(format!("{field} is not a boolean"))),
            };
            document.insert(field, Value::Bool(!current));
        }
        EditOperation::ArrayPush => {
            let item = option.value.unwrap_or(Value::Null);
            match document
                .entry(field.clone())
                .or_insert_with(|| json!([]))
            {
                Value::Array(items) => items.push(item),
                _ => return Err(Rejection::bad_request(format!("{field} is not an array"))),
            }
        }
        EditOperation::ArrayDelete => {
            let index = option
                .value
                .as_ref()
                .and_then(Value::as_u64)
                .ok_or_else(|| Rejection::bad_request("array-delete requires an index"))?
                as usize;

            match document.get_mut(&field) {
                Some(Value::Array(items)) if index < items.len() => {
                    items.remove(index);
                }
                _ => return Err(Rejection::bad_request(format!("No index {index} in {field}"))),
            }
        }
        EditOperation::ArraySplice => {
            let params = match option.value {
                Some(Value::Array(params)) if params.len() >= 2 => params,
                _ => {
                    return Err(Rejection::bad_request(
                        "array-splice requires [start, deleteCount, item?]",
                    ));
                }
            };
            let (Some(start), Some(count)) = (params[0].as_u64(), params[1].as_u64()) else {
                return Err(Rejection::bad_request("array-splice bounds must be integers"));
            };
            let replacement = match params.get(2) {
                Some(Value::Array(items)) => items.clone(),
                Some(item) => vec![item.clone()],
                None => Vec::new(),
            };

            match document.get_mut(&field) {
                Some(Value::Array(items)) => {
                    let start = (start as usize).min(items.len());
                    let end = start.saturating_add(count as usize).min(items.len());
                    items.splice(start..end, replacement).for_each(drop);
                }
                _ => return Err(Rejection::bad_request(format!("{field} is not an array"))),
            }
        }
    }

    Ok(())
}

/// Builder for [`InMemoryServer`] instances, optionally seeded with collections.
///
/// # Example
///
/// ```ignore
/// use firestorm::{memory::InMemoryServer, transport::TransportBuilder};
/// use serde_json::json;
///
/// let server = InMemoryServer::builder()
///     .token("secret")
///     .collection("users", json!({ "alice": { "age": 30 } }))
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryServerBuilder {
    token: String,
    collections: Vec<(String, Value)>,
}

impl InMemoryServerBuilder {
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Seeds a collection with `content`, a `{key: document}` object.
    pub fn collection(mut self, name: impl Into<String>, content: Value) -> Self {
        self.collections.push((name.into(), content));
        self
    }
}

#[async_trait]
impl TransportBuilder for InMemoryServerBuilder {
    type Transport = InMemoryServer;

    /// # Errors
    ///
    /// Returns [`FirestormError::Configuration`] if a seeded collection is not an object.
    async fn build(self) -> FirestormResult<Self::Transport> {
        let mut state = ServerState::default();

        for (name, content) in self.collections {
            let Value::Object(documents) = content else {
                return Err(FirestormError::Configuration(format!(
                    "seed content of collection {name} must be an object"
                )));
            };
            state
                .collections
                .insert(name, documents.into_iter().collect());
        }

        Ok(InMemoryServer::with_state(self.token, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const READ: &str = "http://firestorm.test/get.php";
    const WRITE: &str = "http://firestorm.test/post.php";

    async fn seeded() -> InMemoryServer {
        InMemoryServer::builder()
            .token("tok")
            .collection(
                "users",
                json!({
                    "a": { "name": "Alice", "age": 30, "tags": ["x", "y"] },
                    "b": { "name": "bob", "age": 17, "tags": ["y"] },
                    "c": { "name": "Carol", "age": 45 }
                }),
            )
            .build()
            .await
            .unwrap()
    }

    async fn read(server: &InMemoryServer, body: Value) -> Response {
        server.get(READ, &body).await.unwrap()
    }

    async fn write(server: &InMemoryServer, body: Value) -> Response {
        server.post_json(WRITE, &body).await.unwrap()
    }

    #[tokio::test]
    async fn get_returns_a_single_entry_map() {
        let server = seeded().await;

        let response = read(&server, json!({ "collection": "users", "command": "get", "id": "a" })).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body["a"]["name"], json!("Alice"));

        let missing = read(&server, json!({ "collection": "users", "command": "get", "id": "z" })).await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn search_applies_every_option() {
        let server = seeded().await;

        let response = read(
            &server,
            json!({
                "collection": "users",
                "command": "search",
                "search": [
                    { "field": "age", "criteria": ">=", "value": 18 },
                    { "field": "name", "criteria": "startsWith", "value": "a", "ignoreCase": true }
                ]
            }),
        )
        .await;

        assert_eq!(response.body.as_object().unwrap().keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[tokio::test]
    async fn seeded_random_is_reproducible() {
        let server = seeded().await;
        let body = json!({ "collection": "users", "command": "random", "random": { "seed": 7, "offset": 0 } });

        let first = read(&server, body.clone()).await.body;
        let second = read(&server, body).await.body;
        assert_eq!(first, second);
        assert_eq!(first.as_object().unwrap().len(), 3);

        let limited = read(
            &server,
            json!({ "collection": "users", "command": "random", "random": { "max": 1, "seed": 7, "offset": 1 } }),
        )
        .await
        .body;
        let expected_key = first.as_object().unwrap().keys().nth(1).unwrap().clone();
        assert_eq!(limited.as_object().unwrap().keys().collect::<Vec<_>>(), vec![&expected_key]);
    }

    #[tokio::test]
    async fn values_are_distinct_and_optionally_flattened() {
        let server = seeded().await;

        let plain = read(
            &server,
            json!({ "collection": "users", "command": "values", "values": { "field": "tags", "flatten": false } }),
        )
        .await;
        assert_eq!(plain.body, json!([["x", "y"], ["y"]]));

        let flat = read(
            &server,
            json!({ "collection": "users", "command": "values", "values": { "field": "tags", "flatten": true } }),
        )
        .await;
        assert_eq!(flat.body, json!(["x", "y"]));
    }

    #[tokio::test]
    async fn sha1_changes_with_content() {
        let server = seeded().await;
        let sha = json!({ "collection": "users", "command": "sha1" });

        let before = read(&server, sha.clone()).await.body;
        assert_eq!(before.as_str().unwrap().len(), 40);

        write(&server, json!({ "token": "tok", "collection": "users", "command": "remove", "value": "a" })).await;
        assert_ne!(read(&server, sha).await.body, before);
    }

    #[tokio::test]
    async fn writes_require_the_token() {
        let server = seeded().await;

        let response = write(
            &server,
            json!({ "token": "wrong", "collection": "users", "command": "write_raw" }),
        )
        .await;

        assert_eq!(response.status, 403);
        assert_eq!(server.collection("users").await.len(), 3);
    }

    #[tokio::test]
    async fn edit_field_operations() {
        let server = seeded().await;
        let edit = |option: Value| {
            json!({ "token": "tok", "collection": "users", "command": "editFieldBulk", "value": option })
        };

        let response = write(
            &server,
            edit(json!([
                { "id": "a", "field": "age", "operation": "increment" },
                { "id": "a", "field": "name", "operation": "append", "value": "!" },
                { "id": "a", "field": "tags", "operation": "array-push", "value": "z" },
                { "id": "a", "field": "tags", "operation": "array-delete", "value": 0 },
                { "id": "a", "field": "active", "operation": "set", "value": false },
                { "id": "a", "field": "active", "operation": "invert" },
                { "id": "b", "field": "tags", "operation": "array-splice", "value": [0, 1, "w"] },
                { "id": "c", "field": "age", "operation": "decrement", "value": 5 },
                { "id": "c", "field": "name", "operation": "remove" }
            ])),
        )
        .await;
        assert_eq!(response.status, 200);

        let users = server.collection("users").await;
        assert_eq!(
            users["a"],
            json!({ "name": "Alice!", "age": 31, "tags": ["y", "z"], "active": true })
        );
        assert_eq!(users["b"]["tags"], json!(["w"]));
        assert_eq!(users["c"], json!({ "age": 40 }));
    }

    #[tokio::test]
    async fn scripted_responses_replace_execution() {
        let server = seeded().await;
        server.script("add", Response::new(200, json!("Fatal error"))).await;

        let response = write(
            &server,
            json!({ "token": "tok", "collection": "users", "command": "add", "value": { "a": 1 } }),
        )
        .await;

        assert_eq!(response.body, json!("Fatal error"));
        assert_eq!(server.collection("users").await.len(), 3);
    }

    #[tokio::test]
    async fn seeding_requires_objects() {
        let result = InMemoryServer::builder()
            .collection("users", json!([1, 2]))
            .build()
            .await;

        assert!(matches!(result, Err(FirestormError::Configuration(_))));
    }
}
