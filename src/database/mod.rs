pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod record;
pub mod relationships;
pub mod repository;
pub mod store;

use std::sync::Arc;
use tracing::info;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use record::{Record, RecordError};
pub use relationships::{DeletePolicy, ReferencePolicies};
pub use repository::Repository;
pub use store::{Document, DocumentStore, UniqueKey};

use crate::config::{DatabaseConfig, StoreKind};

/// Opens the configured document store, creating collections as needed.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory document store; data is lost on exit");
            Ok(Arc::new(MemoryDocumentStore::with_unique_keys(models::UNIQUE_KEYS)))
        }
        StoreKind::Postgres => {
            let manager = DatabaseManager::connect(config).await?;
            manager
                .ensure_collections(models::COLLECTIONS, models::UNIQUE_KEYS)
                .await?;
            Ok(Arc::new(
                PgDocumentStore::new(manager.pool()).with_query_logging(config.enable_query_logging),
            ))
        }
    }
}
