/*
 * Responsibility
 * - 1 collection 分の CRUD (find / insert / update / delete / increment)
 * - DocumentStore を受け取り、collection 名を固定して操作を提供
 * - store の結果を RepoError (NotFound / InvalidPayload / Duplicate) に寄せる
 */
use serde_json::Value;
use std::{fmt, sync::Arc};

use crate::repos::error::{RepoError, RepoResult};
use crate::services::{
    document_id::DocumentId,
    store::{DocumentStore, JsonDocument, ListFilter, UpdateOutcome},
};

#[derive(Clone)]
pub struct ResourceRepo {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
}

impl fmt::Debug for ResourceRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRepo")
            .field("backend", &self.store.backend_name())
            .field("collection", &self.collection)
            .finish()
    }
}

impl ResourceRepo {
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self { store, collection }
    }

    pub async fn list_all(&self, filter: Option<&ListFilter>) -> RepoResult<Vec<JsonDocument>> {
        let docs = self.store.find(self.collection, filter).await?;
        Ok(docs)
    }

    pub async fn get_by_id(&self, id: DocumentId) -> RepoResult<JsonDocument> {
        self.store
            .find_by_id(self.collection, id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    // `stamp` names a field the store sets to its current time.
    pub async fn insert_one(
        &self,
        doc: JsonDocument,
        stamp: Option<&str>,
    ) -> RepoResult<DocumentId> {
        let id = self.store.insert_stamped(self.collection, doc, stamp).await?;
        Ok(id)
    }

    // Every element must be a JSON object; an empty batch is rejected as well.
    pub async fn insert_many(&self, docs: Vec<Value>) -> RepoResult<Vec<DocumentId>> {
        if docs.is_empty() {
            return Err(RepoError::InvalidPayload(
                "expected at least one document".into(),
            ));
        }

        let docs = docs
            .into_iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(doc) => Ok(doc),
                _ => Err(RepoError::InvalidPayload(format!(
                    "element {i} is not a document"
                ))),
            })
            .collect::<RepoResult<Vec<_>>>()?;

        let ids = self.store.insert_many(self.collection, docs).await?;
        Ok(ids)
    }

    // matched=false is how a missing document is reported; the caller picks the status.
    pub async fn update_by_id(
        &self,
        id: DocumentId,
        patch: JsonDocument,
    ) -> RepoResult<UpdateOutcome> {
        let outcome = self.store.update_by_id(self.collection, id, patch).await?;
        Ok(outcome)
    }

    pub async fn delete_by_id(&self, id: DocumentId) -> RepoResult<bool> {
        let deleted = self.store.delete_by_id(self.collection, id).await?;
        Ok(deleted)
    }

    pub async fn increment_field(
        &self,
        id: DocumentId,
        field: &str,
        delta: i64,
    ) -> RepoResult<JsonDocument> {
        self.store
            .increment(self.collection, id, field, delta)
            .await?
            .ok_or(RepoError::NotFound)
    }
}
