use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::UniqueKey;
use crate::filter::FilterError;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness rule rejected the write. Carries the user-facing message.
    #[error("{0}")]
    Conflict(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Stored document could not be decoded: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

/// Owns the Postgres pool and the collection tables.
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let redacted = Self::redacted_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected to database: {}", redacted);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    /// Creates the collection tables and unique indexes if they are missing.
    pub async fn ensure_collections(
        &self,
        collections: &[&str],
        unique_keys: &[UniqueKey],
    ) -> Result<(), DatabaseError> {
        for collection in collections {
            sqlx::query(&Self::create_table_sql(collection))
                .execute(&self.pool)
                .await?;
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} (created_at)",
                Self::quote_identifier(&format!("{}_created_at_idx", collection)),
                Self::quote_identifier(collection),
            ))
            .execute(&self.pool)
            .await?;
        }

        for key in unique_keys {
            sqlx::query(&Self::unique_index_sql(key))
                .execute(&self.pool)
                .await?;
        }

        info!("Ensured {} collections", collections.len());
        Ok(())
    }

    fn create_table_sql(collection: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                id UUID PRIMARY KEY, \
                data JSONB NOT NULL, \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now())",
            Self::quote_identifier(collection)
        )
    }

    fn unique_index_sql(key: &UniqueKey) -> String {
        let expressions: Vec<String> = key
            .fields
            .iter()
            .map(|field| format!("(\"data\"->>'{}')", field.replace('\'', "''")))
            .collect();
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
            Self::quote_identifier(key.name),
            Self::quote_identifier(key.collection),
            expressions.join(", ")
        )
    }

    /// Connection string with the password masked, for logs
    fn redacted_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
