//! Collection handles for reading and writing documents.
//!
//! A collection is identified by its name only; the client keeps no local copy of its
//! content. Every operation sends exactly one request and returns once the response has
//! been received and normalized.
//!
//! # Collection Types
//!
//! - [`Collection`] - Untyped collection working with JSON [`Document`]s
//! - [`TypedCollection`] - Collection deserializing documents into a concrete type
//!
//! # Example
//!
//! ```ignore
//! use firestorm::prelude::*;
//! use serde_json::json;
//!
//! # async fn example(client: &Firestorm<impl Transport>) -> FirestormResult<()> {
//! let mut users = client.collection("users");
//! users.register_decorator(|mut user| {
//!     user.insert("kind".into(), json!("user"));
//!     user
//! });
//!
//! let id = users.add(&json!({ "name": "Alice" })).await?;
//! let alice = users.get(id.as_str()).await?;
//! assert_eq!(alice["kind"], json!("user"));
//! # Ok(()) }
//! ```

use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value, to_value};
use std::marker::PhantomData;
use tracing::debug;

use crate::{
    config::Config,
    decorator::{Decorator, DecoratorChain},
    document::{Document, DocumentMap, ID_FIELD, Key, RawCollection, from_document},
    error::{FirestormError, FirestormResult},
    options::{EditFieldOption, SearchOption, SearchRandom, SelectOption, ValueOption},
    request::{self, Command, Payload},
    response::{self, WriteConfirmation},
    transport::Transport,
};

/// An untyped collection bound to a transport and a configuration.
///
/// Read results are JSON documents carrying their key under the id field and passed
/// through the collection's decorators. Write results are the server acknowledgement.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the client the collection was created from
/// * `T` - The transport type
#[derive(Debug)]
pub struct Collection<'a, T: Transport> {
    name: String,
    transport: &'a T,
    config: &'a Config,
    id_field: String,
    decorators: DecoratorChain,
}

impl<'a, T: Transport> Collection<'a, T> {
    /// Creates a new collection reference (internal use).
    pub(crate) fn new(name: String, transport: &'a T, config: &'a Config) -> Self {
        Self {
            name,
            transport,
            config,
            id_field: ID_FIELD.to_string(),
            decorators: DecoratorChain::new(),
        }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name of the field carrying document keys.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Uses `field` instead of [`ID_FIELD`] to carry document keys.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Registers a decorator applied to every document returned by a read.
    ///
    /// Decorators run in registration order. The registered function is returned so it
    /// can be reused elsewhere.
    pub fn register_decorator<F>(&mut self, decorator: F) -> Decorator
    where
        F: Fn(Document) -> Document + Send + Sync + 'static,
    {
        self.decorators.register(decorator)
    }

    pub fn decorators(&self) -> &DecoratorChain {
        &self.decorators
    }

    /// Converts this collection into one that deserializes documents into `D`.
    ///
    /// Registered decorators are kept and run before deserialization.
    pub fn typed<D>(self) -> TypedCollection<'a, T, D>
    where
        D: Serialize + DeserializeOwned,
    {
        TypedCollection { inner: self, _marker: PhantomData }
    }

    async fn read(&self, command: Command, extra: Map<String, Value>) -> FirestormResult<Value> {
        let url = self.config.read_address()?;
        let envelope = request::read_envelope(&self.name, command, extra);

        debug!(collection = %self.name, command = command.as_str(), "sending read request");

        response::extract(self.transport.get(&url, &envelope).await?)
    }

    async fn read_object_like(&self, command: Command, extra: Map<String, Value>) -> FirestormResult<Value> {
        response::expect_object_like(self.read(command, extra).await?)
    }

    async fn write<V>(
        &self,
        command: Command,
        value: Option<&V>,
        payload: Payload,
        extra: Map<String, Value>,
    ) -> FirestormResult<Value>
    where
        V: Serialize + ?Sized,
    {
        let url = self.config.write_address()?;
        let token = self.config.token()?;
        let mut envelope =
            request::write_envelope(&token, &self.name, command, value, payload, &self.id_field)?;
        envelope.extend(extra);

        debug!(collection = %self.name, command = command.as_str(), "sending write request");

        response::extract(
            self.transport
                .post_json(&url, &Value::Object(envelope))
                .await?,
        )
    }

    /// Returns the SHA-1 hash of the collection's JSON content.
    ///
    /// Useful to detect changes without downloading the collection.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::UnexpectedResponseShape`] if the server does not answer
    /// with a plain string.
    pub async fn sha1(&self) -> FirestormResult<String> {
        match self.read(Command::Sha1, Map::new()).await? {
            Value::String(hash) => Ok(hash),
            other => Err(FirestormError::UnexpectedResponseShape(other.to_string())),
        }
    }

    /// Retrieves a single document by key.
    ///
    /// # Errors
    ///
    /// A missing document surfaces as the server's error status
    /// ([`FirestormError::Transport`]).
    pub async fn get(&self, key: impl Into<Key>) -> FirestormResult<Document> {
        let body = self
            .read_object_like(Command::Get, fields([("id", to_value(key.into())?)]))
            .await?;

        Ok(self
            .decorators
            .apply(response::single_document(body, &self.id_field)?))
    }

    /// Retrieves several documents by key. Unknown keys are left out of the result.
    pub async fn search_keys<K>(&self, keys: impl IntoIterator<Item = K>) -> FirestormResult<Vec<Document>>
    where
        K: Into<Key>,
    {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        let body = self
            .read_object_like(Command::SearchKeys, fields([("search", to_value(keys)?)]))
            .await?;

        Ok(self
            .decorators
            .apply(response::document_list(body, &self.id_field)?))
    }

    /// Returns the documents matching every option.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::InvalidArgument`] before any request is sent if an option
    /// has an empty field, a null value, or uses `in` with a non-array value.
    pub async fn search(
        &self,
        options: &[SearchOption],
        random: impl Into<SearchRandom>,
    ) -> FirestormResult<Vec<Document>> {
        let extra = request::search_fields(options, random.into())?;
        let body = self.read_object_like(Command::Search, extra).await?;

        Ok(self
            .decorators
            .apply(response::document_list(body, &self.id_field)?))
    }

    /// Reads the whole collection.
    ///
    /// With `original` set, entries are returned exactly as stored: no id field, no
    /// decorators, and entries that are not objects are kept. Otherwise every entry must
    /// be a document and goes through the same normalization as [`Collection::get`].
    pub async fn read_raw(&self, original: bool) -> FirestormResult<RawCollection> {
        let body = self.read_object_like(Command::ReadRaw, Map::new()).await?;

        if original {
            return response::raw_entries(body);
        }

        Ok(self
            .decorators
            .apply(response::documents(body, &self.id_field)?)
            .into_iter()
            .map(|(key, document)| (key, Value::Object(document)))
            .collect())
    }

    /// Reads the whole collection keeping only the selected fields.
    pub async fn select(&self, option: &SelectOption) -> FirestormResult<DocumentMap> {
        let body = self
            .read_object_like(Command::Select, fields([("select", to_value(option)?)]))
            .await?;

        Ok(self
            .decorators
            .apply(response::documents(body, &self.id_field)?))
    }

    /// Returns the distinct non-null values of a field across the collection.
    pub async fn values(&self, option: &ValueOption) -> FirestormResult<Vec<Value>> {
        let body = self
            .read_object_like(Command::Values, fields([("values", to_value(option)?)]))
            .await?;

        response::distinct_values(body)
    }

    /// Reads a random sample of the collection.
    ///
    /// * `max` - number of documents, `-1` for all of them
    /// * `seed` - makes the sample reproducible
    /// * `offset` - skips that many documents of the seeded order; requires `seed` and
    ///   defaults to 0 once a seed is given
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::InvalidArgument`] before any request is sent if
    /// `max < -1`, if `offset` is given without `seed`, or if `offset < 0`.
    pub async fn random(
        &self,
        max: Option<i64>,
        seed: Option<i64>,
        offset: Option<i64>,
    ) -> FirestormResult<DocumentMap> {
        let params = request::random_params(max, seed, offset)?;
        let body = self
            .read_object_like(Command::Random, fields([("random", params)]))
            .await?;

        Ok(self
            .decorators
            .apply(response::documents(body, &self.id_field)?))
    }

    /// Replaces the entire content of the collection.
    ///
    /// # Warning
    ///
    /// Every document not present in `value` is lost.
    pub async fn write_raw<V>(&self, value: &V) -> FirestormResult<WriteConfirmation>
    where
        V: Serialize + ?Sized,
    {
        response::write_confirmation(
            self.write(Command::WriteRaw, Some(value), Payload::Keyed, Map::new())
                .await?,
        )
    }

    /// Appends a document under a key chosen by the server and returns that key.
    ///
    /// Only works when auto keys are enabled server-side.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::UnexpectedResponseShape`] if the response carries no
    /// string `id`.
    pub async fn add<V>(&self, value: &V) -> FirestormResult<String>
    where
        V: Serialize + ?Sized,
    {
        response::added_id(
            self.write(Command::Add, Some(value), Payload::Single, Map::new())
                .await?,
        )
    }

    /// Appends several documents and returns their server-chosen keys, in order.
    pub async fn add_bulk<V>(&self, values: &[V]) -> FirestormResult<Vec<String>>
    where
        V: Serialize,
    {
        response::added_ids(
            self.write(Command::AddBulk, Some(values), Payload::Bulk, Map::new())
                .await?,
        )
    }

    /// Removes a document by key.
    pub async fn remove(&self, key: impl Into<Key>) -> FirestormResult<WriteConfirmation> {
        let key = key.into();

        response::write_confirmation(
            self.write(Command::Remove, Some(&key), Payload::Single, Map::new())
                .await?,
        )
    }

    /// Removes several documents by key.
    pub async fn remove_bulk<K>(&self, keys: impl IntoIterator<Item = K>) -> FirestormResult<WriteConfirmation>
    where
        K: Into<Key>,
    {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();

        response::write_confirmation(
            self.write(Command::RemoveBulk, Some(&keys), Payload::Single, Map::new())
                .await?,
        )
    }

    /// Stores a document under `key`. The id field of `value`, if any, is not sent.
    pub async fn set<V>(&self, key: impl Into<Key>, value: &V) -> FirestormResult<WriteConfirmation>
    where
        V: Serialize + ?Sized,
    {
        let extra = fields([("key", to_value(key.into())?)]);

        response::write_confirmation(
            self.write(Command::Set, Some(value), Payload::Single, extra)
                .await?,
        )
    }

    /// Stores each of `values` under the key at the same position in `keys`.
    ///
    /// # Errors
    ///
    /// Returns [`FirestormError::InvalidArgument`] if the two lists differ in length.
    pub async fn set_bulk<K, V>(
        &self,
        keys: impl IntoIterator<Item = K>,
        values: &[V],
    ) -> FirestormResult<WriteConfirmation>
    where
        K: Into<Key>,
        V: Serialize,
    {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        if keys.len() != values.len() {
            return Err(FirestormError::InvalidArgument(format!(
                "got {} keys for {} values",
                keys.len(),
                values.len()
            )));
        }

        let extra = fields([("keys", to_value(keys)?)]);

        response::write_confirmation(
            self.write(Command::SetBulk, Some(values), Payload::Bulk, extra)
                .await?,
        )
    }

    /// Edits one field of one document in place.
    pub async fn edit_field(&self, option: &EditFieldOption) -> FirestormResult<WriteConfirmation> {
        response::write_confirmation(
            self.write(Command::EditField, Some(option), Payload::Verbatim, Map::new())
                .await?,
        )
    }

    /// Applies several field edits in one request.
    pub async fn edit_field_bulk(&self, options: &[EditFieldOption]) -> FirestormResult<WriteConfirmation> {
        response::write_confirmation(
            self.write(Command::EditFieldBulk, Some(options), Payload::Verbatim, Map::new())
                .await?,
        )
    }
}

fn fields<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// A collection whose documents deserialize into `D`.
///
/// Reads go through the untyped collection (id injection and decorators included) and
/// the resulting documents are then deserialized, so `D` may declare the id field to
/// receive each document's key.
#[derive(Debug)]
pub struct TypedCollection<'a, T: Transport, D> {
    inner: Collection<'a, T>,
    _marker: PhantomData<D>,
}

impl<'a, T, D> TypedCollection<'a, T, D>
where
    T: Transport,
    D: Serialize + DeserializeOwned,
{
    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Gives access to the untyped collection, e.g. to register decorators.
    pub fn untyped(&mut self) -> &mut Collection<'a, T> {
        &mut self.inner
    }

    /// Converts this typed collection to a different document type.
    pub fn with_type<U>(self) -> TypedCollection<'a, T, U>
    where
        U: Serialize + DeserializeOwned,
    {
        self.inner.typed()
    }

    pub async fn get(&self, key: impl Into<Key>) -> FirestormResult<D> {
        from_document(self.inner.get(key).await?)
    }

    pub async fn search_keys<K>(&self, keys: impl IntoIterator<Item = K>) -> FirestormResult<Vec<D>>
    where
        K: Into<Key>,
    {
        self.inner
            .search_keys(keys)
            .await?
            .into_iter()
            .map(from_document::<D>)
            .collect()
    }

    pub async fn search(
        &self,
        options: &[SearchOption],
        random: impl Into<SearchRandom>,
    ) -> FirestormResult<Vec<D>> {
        self.inner
            .search(options, random)
            .await?
            .into_iter()
            .map(from_document::<D>)
            .collect()
    }

    pub async fn read_raw(&self) -> FirestormResult<IndexMap<String, D>> {
        self.inner
            .read_raw(false)
            .await?
            .into_iter()
            .map(|(key, value)| -> FirestormResult<(String, D)> {
                Ok((key, from_value(value)?))
            })
            .collect()
    }

    pub async fn random(
        &self,
        max: Option<i64>,
        seed: Option<i64>,
        offset: Option<i64>,
    ) -> FirestormResult<IndexMap<String, D>> {
        self.inner
            .random(max, seed, offset)
            .await?
            .into_iter()
            .map(|(key, document)| from_document(document).map(|d| (key, d)))
            .collect()
    }

    pub async fn add(&self, value: &D) -> FirestormResult<String> {
        self.inner.add(value).await
    }

    pub async fn add_bulk(&self, values: &[D]) -> FirestormResult<Vec<String>> {
        self.inner.add_bulk(values).await
    }

    pub async fn set(&self, key: impl Into<Key>, value: &D) -> FirestormResult<WriteConfirmation> {
        self.inner.set(key, value).await
    }

    pub async fn set_bulk<K>(&self, keys: impl IntoIterator<Item = K>, values: &[D]) -> FirestormResult<WriteConfirmation>
    where
        K: Into<Key>,
    {
        self.inner.set_bulk(keys, values).await
    }

    pub async fn remove(&self, key: impl Into<Key>) -> FirestormResult<WriteConfirmation> {
        self.inner.remove(key).await
    }
}
