//! Document store interface used by the resource repos.
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::services::document_id::DocumentId;

/// A schemaless document as exchanged with the HTTP layer.
///
/// Documents returned by a store always carry `_id` as a hex string.
pub type JsonDocument = Map<String, Value>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors (transport/command/encoding).
///
/// Note:
/// - `Duplicate` is the only variant with a meaning for callers; it is raised
///   when a unique key registered through `ensure_unique` would be violated.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),
    #[error("store command error: {0}")]
    Command(String),
    #[error("store encoding error: {0}")]
    Encoding(String),
    #[error("duplicate key")]
    Duplicate,
}

/// Wire form of server timestamps: RFC 3339, UTC, millisecond precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Case-insensitive substring match on a single top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub field: String,
    pub needle: String,
}

impl ListFilter {
    pub fn new(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn matches(&self, doc: &JsonDocument) -> bool {
        match doc.get(&self.field) {
            Some(Value::String(s)) => s.to_lowercase().contains(&self.needle.to_lowercase()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: bool,
    pub modified: bool,
}

/// A minimal document store interface.
///
/// Every operation addresses one named collection and performs exactly one
/// store round trip. Implementations are shared behind `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Register a unique compound key on `fields`. Idempotent.
    async fn ensure_unique(&self, collection: &str, fields: &[&str]) -> StoreResult<()>;

    // All documents in insertion order, optionally filtered.
    async fn find(
        &self,
        collection: &str,
        filter: Option<&ListFilter>,
    ) -> StoreResult<Vec<JsonDocument>>;

    async fn find_by_id(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> StoreResult<Option<JsonDocument>>;

    // Insert a document, ignoring any `_id` it carries. Returns the assigned id.
    async fn insert_one(&self, collection: &str, doc: JsonDocument) -> StoreResult<DocumentId> {
        self.insert_stamped(collection, doc, None).await
    }

    // Same as `insert_one`, and sets `stamp` to the server's current time,
    // as a native date where the backend has one.
    async fn insert_stamped(
        &self,
        collection: &str,
        doc: JsonDocument,
        stamp: Option<&str>,
    ) -> StoreResult<DocumentId>;

    // Insert a batch. Returns ids in input order.
    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<JsonDocument>,
    ) -> StoreResult<Vec<DocumentId>>;

    // Shallow `$set` of the given fields.
    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        patch: JsonDocument,
    ) -> StoreResult<UpdateOutcome>;

    // Returns `true` if a document was removed.
    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool>;

    // Atomically add `delta` to a numeric field and return the updated document.
    async fn increment(
        &self,
        collection: &str,
        id: DocumentId,
        field: &str,
        delta: i64,
    ) -> StoreResult<Option<JsonDocument>>;
}
