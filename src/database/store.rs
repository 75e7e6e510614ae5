use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::filter::Filter;

/// A stored document: the entity fields plus the columns the store owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A uniqueness constraint over top-level fields of a collection.
///
/// Postgres enforces these with unique expression indexes; the memory
/// store checks them under its write lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueKey {
    pub collection: &'static str,
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

impl UniqueKey {
    /// The values this key covers in `data`, or `None` when any is absent.
    pub fn project<'a>(&self, data: &'a Map<String, Value>) -> Option<Vec<&'a Value>> {
        self.fields.iter().map(|field| data.get(*field)).collect()
    }
}

/// Persistence gateway over named collections of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document, assigning its id and timestamps.
    async fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError>;

    /// Documents matching `filter`, oldest first.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    /// Documents whose id is in `ids`; missing ids are skipped.
    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Document>, DatabaseError>;

    /// Overwrites the data of an existing document and refreshes `updated_at`.
    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError>;

    /// Removes a document, returning it if it existed.
    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<i64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
