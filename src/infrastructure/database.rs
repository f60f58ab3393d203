// Document Store - collection-of-documents interface the engines talk to
// Paths follow the Firestore shape: articles/{slug}/comments/{id}

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{AppError, AppResult};

/// A collection address, either top-level (`articles`) or nested under a
/// document (`articles/hello-world/comments`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: CollectionPath,
    pub id: String,
}

impl DocumentPath {
    /// Address a sub-collection owned by this document.
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}/{}", self.collection, self.id, name))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document: its key plus the raw field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Decode the field map into a typed schema. Missing fields are the
    /// schema's business (see `#[serde(default)]` on the entity types).
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            AppError::SerializationError(format!("Failed to decode document {}: {}", self.id, e))
        })
    }
}

/// Encode a typed value into a field map for storage.
pub fn to_fields<T: Serialize>(value: &T) -> AppResult<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::SerializationError(format!(
            "Expected a JSON object for a document, got {}",
            other
        ))),
    }
}

/// One field mutation inside an `update`. All updates of one call apply atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Set(String, Value),
    /// Add `delta` to a counter field; an absent field counts as zero and
    /// the result never drops below zero.
    Increment(String, i64),
    /// Append values to an array field; an absent field counts as empty.
    Append(String, Vec<Value>),
}

impl FieldUpdate {
    pub fn set(field: &str, value: impl Into<Value>) -> Self {
        FieldUpdate::Set(field.to_string(), value.into())
    }

    pub fn increment(field: &str, delta: i64) -> Self {
        FieldUpdate::Increment(field.to_string(), delta)
    }

    pub fn append(field: &str, values: Vec<Value>) -> Self {
        FieldUpdate::Append(field.to_string(), values)
    }

    /// Apply this update to an in-memory field map.
    pub fn apply(&self, fields: &mut Map<String, Value>) -> AppResult<()> {
        match self {
            FieldUpdate::Set(field, value) => {
                fields.insert(field.clone(), value.clone());
            }
            FieldUpdate::Increment(field, delta) => {
                let current = match fields.get(field) {
                    None | Some(Value::Null) => 0,
                    Some(value) => value.as_i64().ok_or_else(|| {
                        AppError::Validation(format!("Field {} is not an integer", field))
                    })?,
                };
                fields.insert(field.clone(), Value::from(current.saturating_add(*delta).max(0)));
            }
            FieldUpdate::Append(field, values) => {
                let mut current = match fields.remove(field) {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items,
                    Some(_) => {
                        return Err(AppError::Validation(format!(
                            "Field {} is not an array",
                            field
                        )))
                    }
                };
                current.extend(values.iter().cloned());
                fields.insert(field.clone(), Value::Array(current));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordered range query over one collection.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    pub collection: CollectionPath,
    pub order_by: String,
    pub direction: SortDirection,
    pub limit: Option<usize>,
    /// Exclusive cursor: the `order_by` value and id of the last document
    /// already seen. Equal values are ordered by document id.
    pub start_after: Option<(Value, String)>,
}

impl DocumentQuery {
    pub fn new(collection: CollectionPath, order_by: &str, direction: SortDirection) -> Self {
        Self {
            collection,
            order_by: order_by.to_string(),
            direction,
            limit: None,
            start_after: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: Value, id: &str) -> Self {
        self.start_after = Some((cursor, id.to_string()));
        self
    }
}

/// An open unit of work. Dropping it without `commit` rolls everything back.
#[async_trait]
pub trait DocumentTransaction: Send {
    async fn get(&mut self, path: &DocumentPath) -> AppResult<Option<Document>>;
    /// Insert a new document; `Conflict` if one already exists at `path`.
    async fn create(&mut self, path: &DocumentPath, fields: Map<String, Value>) -> AppResult<()>;
    /// Insert under a store-generated id and return that id.
    async fn add(
        &mut self,
        collection: &CollectionPath,
        fields: Map<String, Value>,
    ) -> AppResult<String>;
    /// `NotFound` if the document is absent.
    async fn update(&mut self, path: &DocumentPath, updates: &[FieldUpdate]) -> AppResult<()>;
    async fn delete(&mut self, path: &DocumentPath) -> AppResult<bool>;
    async fn delete_collection(&mut self, collection: &CollectionPath) -> AppResult<u64>;
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Document store collaborator. Single calls are atomic on their own;
/// multi-document units go through `begin_transaction`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn begin_transaction(&self) -> AppResult<Box<dyn DocumentTransaction>>;

    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Document>>;
    async fn create(&self, path: &DocumentPath, fields: Map<String, Value>) -> AppResult<()>;
    /// Insert or fully replace.
    async fn set(&self, path: &DocumentPath, fields: Map<String, Value>) -> AppResult<()>;
    async fn add(&self, collection: &CollectionPath, fields: Map<String, Value>)
        -> AppResult<String>;
    async fn update(&self, path: &DocumentPath, updates: &[FieldUpdate]) -> AppResult<()>;
    async fn delete(&self, path: &DocumentPath) -> AppResult<bool>;
    async fn delete_collection(&self, collection: &CollectionPath) -> AppResult<u64>;

    async fn query(&self, query: DocumentQuery) -> AppResult<Vec<Document>>;
    /// Every document of a collection in natural (insertion) order.
    async fn scan(&self, collection: &CollectionPath) -> AppResult<Vec<Document>>;

    async fn health_check(&self) -> AppResult<()>;
}
