use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    SqliteRow,
};
use sqlx::{QueryBuilder, Row, Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::{
    CollectionPath, Document, DocumentPath, DocumentQuery, DocumentStore, DocumentTransaction,
    FieldUpdate, SortDirection,
};

/// SQLite implementation of the document store. Every document is one row
/// keyed by (collection, id) with its fields kept as JSON text.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub async fn new(database_url: &str) -> AppResult<Self> {
        ensure_parent_dir(database_url)?;

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Invalid database URL {}: {}",
                    database_url, e
                ))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", database_url, e))
            })?;

        let store = Self { pool };
        store.initialize().await?;
        info!("Document store ready at {}", database_url);
        Ok(store)
    }

    /// Single-connection in-memory store; the connection is never recycled
    /// because the data lives and dies with it.
    pub async fn new_in_memory() -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create documents table: {}", e)))?;

        Ok(())
    }
}

fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

fn row_to_document(row: &SqliteRow) -> AppResult<Document> {
    let id: String = row.get("id");
    let data: String = row.get("data");
    match serde_json::from_str(&data)? {
        Value::Object(fields) => Ok(Document { id, fields }),
        _ => Err(AppError::SerializationError(format!(
            "Document {} is not a JSON object",
            id
        ))),
    }
}

async fn fetch_document(
    conn: &mut SqliteConnection,
    path: &DocumentPath,
) -> AppResult<Option<Document>> {
    let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ? AND id = ?")
        .bind(path.collection.as_str())
        .bind(&path.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get document {}: {}", path, e)))?;

    row.map(|row| row_to_document(&row)).transpose()
}

async fn insert_document(
    conn: &mut SqliteConnection,
    path: &DocumentPath,
    fields: Map<String, Value>,
) -> AppResult<()> {
    let now = Utc::now().timestamp_millis();
    let data = serde_json::to_string(&fields)?;
    let result = sqlx::query(
        "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(collection, id) DO NOTHING",
    )
    .bind(path.collection.as_str())
    .bind(&path.id)
    .bind(data)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to create document {}: {}", path, e)))?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!("Document {} already exists", path)));
    }
    Ok(())
}

async fn upsert_document(
    conn: &mut SqliteConnection,
    path: &DocumentPath,
    fields: Map<String, Value>,
) -> AppResult<()> {
    let now = Utc::now().timestamp_millis();
    let data = serde_json::to_string(&fields)?;
    sqlx::query(
        "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
    )
    .bind(path.collection.as_str())
    .bind(&path.id)
    .bind(data)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(format!("Failed to set document {}: {}", path, e)))?;
    Ok(())
}

/// Must run inside a transaction. The leading write takes SQLite's writer
/// lock before the read, so concurrent updates of one document serialise.
async fn update_document(
    conn: &mut SqliteConnection,
    path: &DocumentPath,
    updates: &[FieldUpdate],
) -> AppResult<()> {
    let now = Utc::now().timestamp_millis();
    let touched = sqlx::query("UPDATE documents SET updated_at = ? WHERE collection = ? AND id = ?")
        .bind(now)
        .bind(path.collection.as_str())
        .bind(&path.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to lock document {}: {}", path, e)))?;

    if touched.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Document {} not found", path)));
    }

    let mut document = fetch_document(conn, path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", path)))?;

    for update in updates {
        update.apply(&mut document.fields)?;
    }

    let data = serde_json::to_string(&document.fields)?;
    sqlx::query("UPDATE documents SET data = ? WHERE collection = ? AND id = ?")
        .bind(data)
        .bind(path.collection.as_str())
        .bind(&path.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update document {}: {}", path, e)))?;

    debug!("Applied {} field updates to {}", updates.len(), path);
    Ok(())
}

async fn delete_document(conn: &mut SqliteConnection, path: &DocumentPath) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
        .bind(path.collection.as_str())
        .bind(&path.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete document {}: {}", path, e)))?;
    Ok(result.rows_affected() > 0)
}

async fn delete_all_in_collection(
    conn: &mut SqliteConnection,
    collection: &CollectionPath,
) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
        .bind(collection.as_str())
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to delete collection {}: {}", collection, e))
        })?;
    Ok(result.rows_affected())
}

fn generate_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn push_cursor(qb: &mut QueryBuilder<'_, Sqlite>, cursor: Value) {
    match cursor {
        Value::String(s) => {
            qb.push_bind(s);
        }
        Value::Bool(b) => {
            qb.push_bind(b);
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                qb.push_bind(i);
            }
            None => {
                qb.push_bind(n.as_f64().unwrap_or_default());
            }
        },
        other => {
            qb.push_bind(other.to_string());
        }
    }
}

/// Transaction over a pooled SQLite connection.
pub struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl DocumentTransaction for SqliteTransaction {
    async fn get(&mut self, path: &DocumentPath) -> AppResult<Option<Document>> {
        fetch_document(&mut self.tx, path).await
    }

    async fn create(&mut self, path: &DocumentPath, fields: Map<String, Value>) -> AppResult<()> {
        insert_document(&mut self.tx, path, fields).await
    }

    async fn add(
        &mut self,
        collection: &CollectionPath,
        fields: Map<String, Value>,
    ) -> AppResult<String> {
        let id = generate_document_id();
        insert_document(&mut self.tx, &collection.doc(&id), fields).await?;
        Ok(id)
    }

    async fn update(&mut self, path: &DocumentPath, updates: &[FieldUpdate]) -> AppResult<()> {
        update_document(&mut self.tx, path, updates).await
    }

    async fn delete(&mut self, path: &DocumentPath) -> AppResult<bool> {
        delete_document(&mut self.tx, path).await
    }

    async fn delete_collection(&mut self, collection: &CollectionPath) -> AppResult<u64> {
        delete_all_in_collection(&mut self.tx, collection).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn begin_transaction(&self) -> AppResult<Box<dyn DocumentTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Document>> {
        let mut conn = self.pool.acquire().await?;
        fetch_document(&mut conn, path).await
    }

    async fn create(&self, path: &DocumentPath, fields: Map<String, Value>) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_document(&mut conn, path, fields).await
    }

    async fn set(&self, path: &DocumentPath, fields: Map<String, Value>) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        upsert_document(&mut conn, path, fields).await
    }

    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Map<String, Value>,
    ) -> AppResult<String> {
        let id = generate_document_id();
        let mut conn = self.pool.acquire().await?;
        insert_document(&mut conn, &collection.doc(&id), fields).await?;
        Ok(id)
    }

    async fn update(&self, path: &DocumentPath, updates: &[FieldUpdate]) -> AppResult<()> {
        let mut tx = self.begin_transaction().await?;
        tx.update(path, updates).await?;
        tx.commit().await
    }

    async fn delete(&self, path: &DocumentPath) -> AppResult<bool> {
        let mut conn = self.pool.acquire().await?;
        delete_document(&mut conn, path).await
    }

    async fn delete_collection(&self, collection: &CollectionPath) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await?;
        delete_all_in_collection(&mut conn, collection).await
    }

    async fn query(&self, query: DocumentQuery) -> AppResult<Vec<Document>> {
        let field_path = format!("$.{}", query.order_by);
        let direction = match query.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };

        let mut qb =
            QueryBuilder::<Sqlite>::new("SELECT id, data FROM documents WHERE collection = ");
        qb.push_bind(query.collection.as_str().to_string());

        if let Some((cursor, cursor_id)) = query.start_after {
            let past = match query.direction {
                SortDirection::Ascending => " > ",
                SortDirection::Descending => " < ",
            };
            qb.push(" AND (json_extract(data, ");
            qb.push_bind(field_path.clone());
            qb.push(")");
            qb.push(past);
            push_cursor(&mut qb, cursor.clone());
            qb.push(" OR (json_extract(data, ");
            qb.push_bind(field_path.clone());
            qb.push(") = ");
            push_cursor(&mut qb, cursor);
            qb.push(" AND id");
            qb.push(past);
            qb.push_bind(cursor_id);
            qb.push("))");
        }

        qb.push(" ORDER BY json_extract(data, ");
        qb.push_bind(field_path);
        qb.push(format!(") {}, id {}", direction, direction));

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to query {}: {}", query.collection, e))
        })?;

        rows.iter().map(row_to_document).collect()
    }

    async fn scan(&self, collection: &CollectionPath) -> AppResult<Vec<Document>> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = ? ORDER BY rowid")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to scan {}: {}", collection, e))
            })?;

        rows.iter().map(row_to_document).collect()
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;
        Ok(())
    }
}
