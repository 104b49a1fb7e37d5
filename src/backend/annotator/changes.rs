//! Change Groups and History
//!
//! The field-change side of the annotator: the incoming delta type, the
//! persisted per-delta record keyed by its change-group id, and the two
//! collaborator seams: the change log (write side) and the task directory
//! (read side, supplying the latest recorded owner transition).
//!
//! The Postgres implementations share one `task_field_changes` table, which
//! is also exactly why owner substitution can lag the current batch: the
//! "latest owner change" is whatever row most recently landed there.

use crate::shared::error::ConversationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

/// One field delta as received from the task entity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    /// Name of the changed field (e.g. "status", "owner").
    pub field: String,
    pub old_value: String,
    pub new_value: String,
}

/// A persisted field delta, correlated to its batch by `group_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChangeRecord {
    pub task_id: Uuid,
    /// Correlation id shared by every delta of one edit action.
    pub group_id: Uuid,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub acting_user: String,
    pub changed_at: DateTime<Utc>,
}

/// The most recent recorded owner transition for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerChange {
    pub old_owner: String,
    pub new_owner: String,
}

/// Write side: persist individual field deltas.
#[async_trait]
pub trait ChangeLog: Send + Sync {
    async fn record(&self, record: FieldChangeRecord) -> Result<(), ConversationError>;
}

/// Read side: history lookups owned by the task entity collaborator.
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    /// The latest recorded owner change for a task, if any.
    async fn latest_owner_change(
        &self,
        task_id: Uuid,
    ) -> Result<Option<OwnerChange>, ConversationError>;
}

/// PostgreSQL change log and history lookup over `task_field_changes`.
pub struct PgChangeLog {
    pool: PgPool,
}

impl PgChangeLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangeLog for PgChangeLog {
    async fn record(&self, record: FieldChangeRecord) -> Result<(), ConversationError> {
        sqlx::query(
            r#"
            INSERT INTO task_field_changes
                (id, task_id, group_id, field, old_value, new_value, acting_user, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.task_id)
        .bind(record.group_id)
        .bind(&record.field)
        .bind(&record.old_value)
        .bind(&record.new_value)
        .bind(&record.acting_user)
        .bind(record.changed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ConversationError::storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl TaskDirectory for PgChangeLog {
    async fn latest_owner_change(
        &self,
        task_id: Uuid,
    ) -> Result<Option<OwnerChange>, ConversationError> {
        #[derive(sqlx::FromRow)]
        struct OwnerRow {
            old_value: String,
            new_value: String,
        }

        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            SELECT old_value, new_value
            FROM task_field_changes
            WHERE task_id = $1 AND field = 'owner'
            ORDER BY changed_at DESC
            LIMIT 1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ConversationError::storage(e.to_string()))?;

        Ok(row.map(|r| OwnerChange {
            old_owner: r.old_value,
            new_owner: r.new_value,
        }))
    }
}

/// In-memory change log for tests and database-less operation.
#[derive(Default)]
pub struct MemoryChangeLog {
    records: RwLock<Vec<FieldChangeRecord>>,
}

impl MemoryChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, in insertion order. Test helper.
    pub async fn records(&self) -> Vec<FieldChangeRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ChangeLog for MemoryChangeLog {
    async fn record(&self, record: FieldChangeRecord) -> Result<(), ConversationError> {
        self.records.write().await.push(record);
        Ok(())
    }
}

#[async_trait]
impl TaskDirectory for MemoryChangeLog {
    async fn latest_owner_change(
        &self,
        task_id: Uuid,
    ) -> Result<Option<OwnerChange>, ConversationError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.task_id == task_id && r.field == "owner")
            .max_by_key(|r| r.changed_at)
            .map(|r| OwnerChange {
                old_owner: r.old_value.clone(),
                new_owner: r.new_value.clone(),
            }))
    }
}
