//! Conversation Repository
//!
//! The durable-store seam. The engine only needs whole-document semantics:
//! find one document by task, upsert one document, list recent documents.
//! The Postgres implementation keeps the thread as a single JSONB value per
//! task; the in-memory implementation backs tests and database-less runs.

use crate::shared::error::ConversationError;
use crate::shared::thread::{ConversationDocument, ThreadMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Whole-document access to conversation storage.
///
/// Uniqueness of `task_id` is the store's responsibility (enforced here via
/// the primary key); atomicity covers the single write only, never a
/// caller's read-then-write cycle.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Load the document for a task, if one exists.
    async fn find(&self, task_id: Uuid) -> Result<Option<ConversationDocument>, ConversationError>;

    /// Create or replace the document for a task.
    async fn upsert(
        &self,
        task_id: Uuid,
        thread: &[ThreadMessage],
        updated_at: DateTime<Utc>,
    ) -> Result<(), ConversationError>;

    /// Documents ordered by last mutation, most recent first.
    async fn recent(&self, limit: i64) -> Result<Vec<ConversationDocument>, ConversationError>;
}

/// PostgreSQL-backed repository: one row per task, thread as JSONB.
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    task_id: Uuid,
    thread: sqlx::types::Json<Vec<ThreadMessage>>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for ConversationDocument {
    fn from(row: ConversationRow) -> Self {
        Self {
            task_id: row.task_id,
            thread: row.thread.0,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    async fn find(&self, task_id: Uuid) -> Result<Option<ConversationDocument>, ConversationError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT task_id, thread, updated_at
            FROM conversations
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(ConversationDocument::from))
    }

    async fn upsert(
        &self,
        task_id: Uuid,
        thread: &[ThreadMessage],
        updated_at: DateTime<Utc>,
    ) -> Result<(), ConversationError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (task_id, thread, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (task_id) DO UPDATE SET
                thread = EXCLUDED.thread,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(task_id)
        .bind(sqlx::types::Json(thread))
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConversationDocument>, ConversationError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT task_id, thread, updated_at
            FROM conversations
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(ConversationDocument::from).collect())
    }
}

fn storage_error(err: sqlx::Error) -> ConversationError {
    ConversationError::storage(err.to_string())
}

/// In-memory repository for tests and database-less operation.
#[derive(Default)]
pub struct MemoryConversationRepository {
    documents: RwLock<HashMap<Uuid, ConversationDocument>>,
}

impl MemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for MemoryConversationRepository {
    async fn find(&self, task_id: Uuid) -> Result<Option<ConversationDocument>, ConversationError> {
        Ok(self.documents.read().await.get(&task_id).cloned())
    }

    async fn upsert(
        &self,
        task_id: Uuid,
        thread: &[ThreadMessage],
        updated_at: DateTime<Utc>,
    ) -> Result<(), ConversationError> {
        self.documents.write().await.insert(
            task_id,
            ConversationDocument {
                task_id,
                thread: thread.to_vec(),
                updated_at,
            },
        );
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ConversationDocument>, ConversationError> {
        let mut documents: Vec<_> = self.documents.read().await.values().cloned().collect();
        documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        documents.truncate(limit.max(0) as usize);
        Ok(documents)
    }
}
