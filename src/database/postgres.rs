use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{Document, DocumentStore};
use crate::filter::{Filter, SqlParam};

const COLUMNS: &str = "id, data, created_at, updated_at";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Document store with one JSONB table per collection.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    log_queries: bool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, log_queries: false }
    }

    pub fn with_query_logging(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    fn table(collection: &str) -> Result<String, DatabaseError> {
        Filter::validate_table_name(collection)?;
        Ok(DatabaseManager::quote_identifier(collection))
    }

    fn trace(&self, sql: &str) {
        if self.log_queries {
            debug!(sql, "document query");
        }
    }
}

fn bind_param<'q>(
    query: QueryAs<'q, Postgres, DocumentRow, PgArguments>,
    param: &SqlParam,
) -> QueryAs<'q, Postgres, DocumentRow, PgArguments> {
    match param {
        SqlParam::Json(value) => query.bind(value.clone()),
        SqlParam::Timestamp(ts) => query.bind(*ts),
    }
}

/// Maps a unique index violation to its own variant so callers can
/// report it as a conflict.
fn map_write_error(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<Document, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (id, data, created_at, updated_at) VALUES ($1, $2, $3, $3) RETURNING {}",
            Self::table(collection)?,
            COLUMNS
        );
        self.trace(&sql);

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(Json(data))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let sql = filter.to_sql(collection)?;
        self.trace(&sql.query);

        let mut query = sqlx::query_as::<_, DocumentRow>(&sql.query);
        for param in &sql.params {
            query = bind_param(query, param);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, Self::table(collection)?);
        self.trace(&sql);

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> Result<Vec<Document>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ANY($1) ORDER BY created_at ASC, id ASC",
            COLUMNS,
            Self::table(collection)?
        );
        self.trace(&sql);

        let rows = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn replace(
        &self,
        collection: &str,
        id: Uuid,
        data: Map<String, Value>,
    ) -> Result<Option<Document>, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET data = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            Self::table(collection)?,
            COLUMNS
        );
        self.trace(&sql);

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .bind(Json(data))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING {}", Self::table(collection)?, COLUMNS);
        self.trace(&sql);

        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<i64, DatabaseError> {
        let sql = filter.to_count_sql(collection)?;
        self.trace(&sql.query);

        let mut query = sqlx::query(&sql.query);
        for param in &sql.params {
            query = match param {
                SqlParam::Json(value) => query.bind(value.clone()),
                SqlParam::Timestamp(ts) => query.bind(*ts),
            };
        }
        let row: PgRow = query.fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("count")?)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
