use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

/// A persisted message row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "entryID")]
    pub entry_id: i64,
    pub sender_name: String,
    pub sender_mail: String,
    pub receiver_mail: String,
    pub message_content: String,
}

/// The writable fields of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub sender_name: String,
    pub sender_mail: String,
    pub receiver_mail: String,
    pub message_content: String,
}

/// Outcome of an INSERT, UPDATE or DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
    pub affected_rows: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<i64>,
}

impl WriteResult {
    pub fn inserted(id: i64) -> Self {
        Self {
            affected_rows: 1,
            insert_id: Some(id),
        }
    }

    pub fn affected(rows: u64) -> Self {
        Self {
            affected_rows: rows,
            insert_id: None,
        }
    }

    pub fn matched_any(&self) -> bool {
        self.affected_rows > 0
    }
}

/// Storage for the `messages` table.
///
/// Every value reaches the database as a bound parameter.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn list_messages(&self) -> Result<Vec<Message>>;

    async fn get_message(&self, entry_id: i64) -> Result<Option<Message>>;

    async fn insert_message(&self, message: &NewMessage) -> Result<WriteResult>;

    /// Replace all four fields of a row, keeping its id.
    async fn update_message(&self, entry_id: i64, message: &NewMessage) -> Result<WriteResult>;

    async fn delete_message(&self, entry_id: i64) -> Result<WriteResult>;
}

/// PostgreSQL-backed message store.
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the messages table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                entry_id BIGSERIAL PRIMARY KEY,
                sender_name TEXT NOT NULL,
                sender_mail TEXT NOT NULL,
                receiver_mail TEXT NOT NULL,
                message_content TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create messages table")?;

        Ok(())
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn list_messages(&self) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT entry_id, sender_name, sender_mail, receiver_mail, message_content
            FROM messages
            ORDER BY entry_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list messages")?;

        Ok(messages)
    }

    async fn get_message(&self, entry_id: i64) -> Result<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT entry_id, sender_name, sender_mail, receiver_mail, message_content
            FROM messages
            WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await
        .context(format!("Failed to fetch message {}", entry_id))?;

        Ok(message)
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<WriteResult> {
        let row = sqlx::query(
            r#"
            INSERT INTO messages (sender_name, sender_mail, receiver_mail, message_content)
            VALUES ($1, $2, $3, $4)
            RETURNING entry_id
            "#,
        )
        .bind(&message.sender_name)
        .bind(&message.sender_mail)
        .bind(&message.receiver_mail)
        .bind(&message.message_content)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert message")?;

        let entry_id: i64 = row.try_get("entry_id")?;
        Ok(WriteResult::inserted(entry_id))
    }

    async fn update_message(&self, entry_id: i64, message: &NewMessage) -> Result<WriteResult> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET sender_name = $1, sender_mail = $2, receiver_mail = $3, message_content = $4
            WHERE entry_id = $5
            "#,
        )
        .bind(&message.sender_name)
        .bind(&message.sender_mail)
        .bind(&message.receiver_mail)
        .bind(&message.message_content)
        .bind(entry_id)
        .execute(&self.pool)
        .await
        .context(format!("Failed to update message {}", entry_id))?;

        Ok(WriteResult::affected(result.rows_affected()))
    }

    async fn delete_message(&self, entry_id: i64) -> Result<WriteResult> {
        let result = sqlx::query("DELETE FROM messages WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .context(format!("Failed to delete message {}", entry_id))?;

        Ok(WriteResult::affected(result.rows_affected()))
    }
}
