//! PostgreSQL Document Store
//!
//! One `documents` table keyed by `(collection, id)` with a JSONB body.

use serde_json::Value;
use sqlx::PgPool;

use crate::error::AccessResult;
use crate::infra::document::DocumentStore;

/// PostgreSQL-backed document store
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> AccessResult<Option<Value>> {
        let document = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> AccessResult<Vec<Value>> {
        let documents = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT data FROM documents
            WHERE collection = $1 AND data -> $2::text = $3::jsonb
            ORDER BY id
            "#,
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn list(&self, collection: &str) -> AccessResult<Vec<Value>> {
        let documents = sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> AccessResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(document)
        .execute(&self.pool)
        .await?;

        tracing::debug!(collection, id, "Document written");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> AccessResult<bool> {
        let deleted = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}
