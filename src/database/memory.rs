use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Document, DocumentStore, UniqueKey};
use crate::filter::Filter;

/// Process-local document store. Collections keep insertion order, which is
/// also creation order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    unique_keys: Vec<UniqueKey>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_keys(unique_keys: &[UniqueKey]) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            unique_keys: unique_keys.to_vec(),
        }
    }

    fn check_unique(
        &self,
        collection: &str,
        documents: &[Document],
        data: &Map<String, Value>,
        except: Option<Uuid>,
    ) -> Result<(), DatabaseError> {
        for key in self.unique_keys.iter().filter(|k| k.collection == collection) {
            let Some(candidate) = key.project(data) else {
                continue;
            };
            let taken = documents
                .iter()
                .filter(|doc| Some(doc.id) != except)
                .any(|doc| key.project(&doc.data).as_ref() == Some(&candidate));
            if taken {
                return Err(DatabaseError::UniqueViolation(key.name.to_string()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError> {
        Filter::validate_table_name(collection)?;
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        self.check_unique(collection, documents, &data, None)?;

        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            data,
            created_at: now,
            updated_at: now,
        };
        documents.push(document.clone());
        Ok(document)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(&d.data)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| ids.contains(&d.id)).cloned().collect())
            .unwrap_or_default())
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        self.check_unique(collection, documents, &data, Some(id))?;

        let Some(document) = documents.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        document.data = data;
        document.updated_at = Utc::now().max(document.created_at);
        Ok(Some(document.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(documents
            .iter()
            .position(|d| d.id == id)
            .map(|index| documents.remove(index)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<i64, DatabaseError> {
        filter.validate()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(&d.data)).count() as i64)
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    const EMAIL_KEY: UniqueKey = UniqueKey {
        collection: "users",
        name: "users_email_key",
        fields: &["email"],
    };

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("groups", data(json!({"name": "A"}))).await.unwrap();
        assert_eq!(doc.created_at, doc.updated_at);

        let found = store.find_by_id("groups", doc.id).await.unwrap();
        assert_eq!(found, Some(doc));
    }

    #[tokio::test]
    async fn find_filters_and_keeps_creation_order() {
        let store = MemoryDocumentStore::new();
        let first = store.insert("payments", data(json!({"childId": "a", "amount": 1}))).await.unwrap();
        store.insert("payments", data(json!({"childId": "b", "amount": 2}))).await.unwrap();
        let third = store.insert("payments", data(json!({"childId": "a", "amount": 3}))).await.unwrap();

        let found = store.find("payments", &Filter::by("childId", "a")).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
        assert_eq!(store.count("payments", &Filter::new()).await.unwrap(), 3);
        assert_eq!(store.count("payments", &Filter::by("childId", "a")).await.unwrap(), 2);
        assert_eq!(store.count("children", &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unique_keys_reject_duplicates_on_insert_and_replace() {
        let store = MemoryDocumentStore::with_unique_keys(&[EMAIL_KEY]);
        store.insert("users", data(json!({"email": "a@x.io"}))).await.unwrap();
        let other = store.insert("users", data(json!({"email": "b@x.io"}))).await.unwrap();

        let err = store.insert("users", data(json!({"email": "a@x.io"}))).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(name) if name == "users_email_key"));

        let err = store
            .replace("users", other.id, data(json!({"email": "a@x.io"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));

        // Rewriting a document with its own value is not a conflict
        let same = store.replace("users", other.id, data(json!({"email": "b@x.io"}))).await.unwrap();
        assert!(same.is_some());
        assert_eq!(store.count("users", &Filter::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn replace_and_delete_missing_documents_return_none() {
        let store = MemoryDocumentStore::new();
        let id = Uuid::new_v4();
        assert!(store.replace("children", id, Map::new()).await.unwrap().is_none());
        assert!(store.delete("children", id).await.unwrap().is_none());

        let doc = store.insert("children", data(json!({"name": "Ana"}))).await.unwrap();
        let removed = store.delete("children", doc.id).await.unwrap();
        assert_eq!(removed.map(|d| d.id), Some(doc.id));
        assert!(store.find_by_id("children", doc.id).await.unwrap().is_none());
    }
}
