/*
 * Responsibility
 * - DocumentStore の in-process 実装 (テスト / STORE_BACKEND=memory)
 * - collection ごとに挿入順を保持
 * - unique key の検査と挿入を write lock 内で 1 step として行う
 */
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Number, Value};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::services::{
    document_id::DocumentId,
    store::client::{
        DocumentStore, JsonDocument, ListFilter, StoreError, StoreResult, UpdateOutcome,
        format_timestamp,
    },
};

/// In-process document store.
///
/// Used by tests and for running the API without a database. Each collection
/// keeps insertion order; unique keys are checked under the write lock so a
/// check-and-insert is a single atomic step.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

#[derive(Debug, Default)]
struct Collection {
    docs: Vec<(DocumentId, JsonDocument)>,
    unique_keys: Vec<Vec<String>>,
}

impl Collection {
    fn position(&self, id: DocumentId) -> Option<usize> {
        self.docs.iter().position(|(doc_id, _)| *doc_id == id)
    }

    fn key_of<'a>(key: &[String], doc: &'a JsonDocument) -> Vec<&'a Value> {
        key.iter()
            .map(|f| doc.get(f).unwrap_or(&Value::Null))
            .collect()
    }

    // Would `candidate` collide with a stored document (other than `skip`) on any unique key?
    fn violates_unique(&self, candidate: &JsonDocument, skip: Option<DocumentId>) -> bool {
        self.unique_keys.iter().any(|key| {
            let wanted = Self::key_of(key, candidate);
            self.docs
                .iter()
                .filter(|(id, _)| Some(*id) != skip)
                .any(|(_, doc)| Self::key_of(key, doc) == wanted)
        })
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_id(id: DocumentId, mut doc: JsonDocument) -> JsonDocument {
    doc.remove("_id");
    let mut out = JsonDocument::new();
    out.insert("_id".to_string(), Value::String(id.to_hex()));
    out.append(&mut doc);
    out
}

fn add_delta(current: Option<&Value>, field: &str, delta: i64) -> StoreResult<Value> {
    let next = match current {
        None | Some(Value::Null) => Number::from(delta),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                let sum = i
                    .checked_add(delta)
                    .ok_or_else(|| StoreError::Command(format!("overflow incrementing {field}")))?;
                Number::from(sum)
            } else {
                let f = n.as_f64().unwrap_or_default() + delta as f64;
                Number::from_f64(f)
                    .ok_or_else(|| StoreError::Command(format!("cannot increment {field}")))?
            }
        }
        Some(_) => {
            return Err(StoreError::Command(format!(
                "cannot increment non-numeric field {field}"
            )));
        }
    };
    Ok(Value::Number(next))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ensure_unique(&self, collection: &str, fields: &[&str]) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        let key: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        if !coll.unique_keys.contains(&key) {
            coll.unique_keys.push(key);
        }
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Option<&ListFilter>,
    ) -> StoreResult<Vec<JsonDocument>> {
        let collections = self.collections.read().await;
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(coll
            .docs
            .iter()
            .filter(|(_, doc)| filter.is_none_or(|f| f.matches(doc)))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> StoreResult<Option<JsonDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|coll| coll.position(id).map(|i| coll.docs[i].1.clone())))
    }

    async fn insert_stamped(
        &self,
        collection: &str,
        doc: JsonDocument,
        stamp: Option<&str>,
    ) -> StoreResult<DocumentId> {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        let id = DocumentId::generate();
        let mut doc = with_id(id, doc);
        if let Some(field) = stamp {
            let now = format_timestamp(Utc::now());
            doc.insert(field.to_string(), Value::String(now));
        }
        if coll.violates_unique(&doc, None) {
            return Err(StoreError::Duplicate);
        }
        coll.docs.push((id, doc));
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<JsonDocument>,
    ) -> StoreResult<Vec<DocumentId>> {
        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        // Validate the whole batch first; nothing is applied on failure.
        let staged: Vec<(DocumentId, JsonDocument)> = docs
            .into_iter()
            .map(|doc| {
                let id = DocumentId::generate();
                (id, with_id(id, doc))
            })
            .collect();

        for (i, (_, doc)) in staged.iter().enumerate() {
            let clashes_in_batch = coll.unique_keys.iter().any(|key| {
                let wanted = Collection::key_of(key, doc);
                staged[..i]
                    .iter()
                    .any(|(_, other)| Collection::key_of(key, other) == wanted)
            });
            if clashes_in_batch || coll.violates_unique(doc, None) {
                return Err(StoreError::Duplicate);
            }
        }

        let ids = staged.iter().map(|(id, _)| *id).collect();
        coll.docs.extend(staged);
        Ok(ids)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: DocumentId,
        mut patch: JsonDocument,
    ) -> StoreResult<UpdateOutcome> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };
        let Some(pos) = coll.position(id) else {
            return Ok(UpdateOutcome::default());
        };

        patch.remove("_id");
        let mut merged = coll.docs[pos].1.clone();
        let mut modified = false;
        for (key, value) in patch {
            if merged.get(&key) != Some(&value) {
                merged.insert(key, value);
                modified = true;
            }
        }

        if modified {
            if coll.violates_unique(&merged, Some(id)) {
                return Err(StoreError::Duplicate);
            }
            coll.docs[pos].1 = merged;
        }

        Ok(UpdateOutcome {
            matched: true,
            modified,
        })
    }

    async fn delete_by_id(&self, collection: &str, id: DocumentId) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };

        match coll.position(id) {
            Some(pos) => {
                coll.docs.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment(
        &self,
        collection: &str,
        id: DocumentId,
        field: &str,
        delta: i64,
    ) -> StoreResult<Option<JsonDocument>> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(pos) = coll.position(id) else {
            return Ok(None);
        };

        let doc = &mut coll.docs[pos].1;
        let next = add_delta(doc.get(field), field, delta)?;
        doc.insert(field.to_string(), next);

        Ok(Some(doc.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> JsonDocument {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_then_find_by_id_round_trips() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("items", doc(json!({"name": "A", "price": 3})))
            .await
            .unwrap();

        let found = store.find_by_id("items", id).await.unwrap().unwrap();
        assert_eq!(found["_id"], json!(id.to_hex()));
        assert_eq!(found["name"], json!("A"));
        assert_eq!(found["price"], json!(3));
    }

    #[tokio::test]
    async fn client_supplied_id_is_replaced() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("items", doc(json!({"_id": "mine", "name": "A"})))
            .await
            .unwrap();

        let found = store.find_by_id("items", id).await.unwrap().unwrap();
        assert_eq!(found["_id"], json!(id.to_hex()));
    }

    #[tokio::test]
    async fn stamp_overrides_client_value() {
        let store = MemoryStore::new();
        let id = store
            .insert_stamped(
                "buyerdata",
                doc(json!({"modelName": "m", "purchasedAt": "yesterday"})),
                Some("purchasedAt"),
            )
            .await
            .unwrap();

        let found = store.find_by_id("buyerdata", id).await.unwrap().unwrap();
        let stamped = found["purchasedAt"].as_str().unwrap();
        assert_ne!(stamped, "yesterday");
        assert!(chrono::DateTime::parse_from_rfc3339(stamped).is_ok());
        assert!(stamped.ends_with('Z'));
    }

    #[tokio::test]
    async fn find_keeps_insertion_order_and_filters() {
        let store = MemoryStore::new();
        store
            .insert_many(
                "items",
                vec![
                    doc(json!({"name": "Blue lamp"})),
                    doc(json!({"name": "Chair"})),
                    doc(json!({"name": "Red LAMP"})),
                ],
            )
            .await
            .unwrap();

        let all = store.find("items", None).await.unwrap();
        let names: Vec<_> = all.iter().map(|d| d["name"].clone()).collect();
        assert_eq!(names, vec![json!("Blue lamp"), json!("Chair"), json!("Red LAMP")]);

        let filter = ListFilter::new("name", "lamp");
        let lamps = store.find("items", Some(&filter)).await.unwrap();
        assert_eq!(lamps.len(), 2);
    }

    #[tokio::test]
    async fn unknown_collection_is_empty_not_an_error() {
        let store = MemoryStore::new();
        assert!(store.find("nothing", None).await.unwrap().is_empty());
        assert!(
            store
                .find_by_id("nothing", DocumentId::generate())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_merges_fields_and_reports_modification() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("project", doc(json!({"name": "p", "status": "draft"})))
            .await
            .unwrap();

        let out = store
            .update_by_id("project", id, doc(json!({"status": "live"})))
            .await
            .unwrap();
        assert_eq!(
            out,
            UpdateOutcome {
                matched: true,
                modified: true
            }
        );

        let same = store
            .update_by_id("project", id, doc(json!({"status": "live"})))
            .await
            .unwrap();
        assert!(same.matched);
        assert!(!same.modified);

        let found = store.find_by_id("project", id).await.unwrap().unwrap();
        assert_eq!(found["name"], json!("p"));
        assert_eq!(found["status"], json!("live"));
    }

    #[tokio::test]
    async fn update_missing_document_is_unmatched() {
        let store = MemoryStore::new();
        let out = store
            .update_by_id("project", DocumentId::generate(), doc(json!({"a": 1})))
            .await
            .unwrap();
        assert!(!out.matched);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = store.insert_one("user", doc(json!({"n": 1}))).await.unwrap();

        assert!(store.delete_by_id("user", id).await.unwrap());
        assert!(!store.delete_by_id("user", id).await.unwrap());
    }

    #[tokio::test]
    async fn increment_starts_missing_field_at_zero() {
        let store = MemoryStore::new();
        let id = store.insert_one("users", doc(json!({"name": "m"}))).await.unwrap();

        for _ in 0..3 {
            store.increment("users", id, "purchased", 1).await.unwrap();
        }
        let found = store.find_by_id("users", id).await.unwrap().unwrap();
        assert_eq!(found["purchased"], json!(3));
    }

    #[tokio::test]
    async fn increment_rejects_non_numeric_field() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("users", doc(json!({"purchased": "many"})))
            .await
            .unwrap();

        let err = store.increment("users", id, "purchased", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Command(_)));
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("users", doc(json!({"purchased": 10})))
            .await
            .unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment("users", id, "purchased", 1).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let found = store.find_by_id("users", id).await.unwrap().unwrap();
        assert_eq!(found["purchased"], json!(30));
    }

    #[tokio::test]
    async fn unique_key_rejects_second_insert() {
        let store = MemoryStore::new();
        store
            .ensure_unique("buyerdata", &["modelName", "buyerEmail"])
            .await
            .unwrap();

        let buyer = doc(json!({"modelName": "m1", "buyerEmail": "a@b.c"}));
        store.insert_one("buyerdata", buyer.clone()).await.unwrap();
        let err = store.insert_one("buyerdata", buyer).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));

        store
            .insert_one(
                "buyerdata",
                doc(json!({"modelName": "m2", "buyerEmail": "a@b.c"})),
            )
            .await
            .unwrap();
        assert_eq!(store.find("buyerdata", None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_duplicate_inserts_admit_exactly_one() {
        let store = MemoryStore::new();
        store
            .ensure_unique("buyerdata", &["modelName", "buyerEmail"])
            .await
            .unwrap();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert_one(
                            "buyerdata",
                            doc(json!({"modelName": "m", "buyerEmail": "x@y.z"})),
                        )
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.find("buyerdata", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_many_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.ensure_unique("items", &["sku"]).await.unwrap();

        let err = store
            .insert_many(
                "items",
                vec![doc(json!({"sku": 1})), doc(json!({"sku": 2})), doc(json!({"sku": 1}))],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert!(store.find("items", None).await.unwrap().is_empty());
    }
}
