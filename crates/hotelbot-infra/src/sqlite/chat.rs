//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `hotelbot-core` with raw queries, private
//! Row structs and split reader/writer pool usage. Writes that also refresh
//! the session's `updated_at` run in a single writer transaction.

use chrono::Utc;
use hotelbot_core::chat::repository::ChatRepository;
use hotelbot_types::error::RepositoryError;
use hotelbot_types::message::{Message, MessageId, NewMessage, Sender};
use hotelbot_types::session::{normalize_email, ChatSession, SessionId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::support::{
    count_to_u64, format_datetime, map_sqlx_error, now_micros, parse_datetime, parse_session_id,
    query_error,
};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    email: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        Ok(ChatSession {
            id: parse_session_id(&self.id)?,
            email: self.email,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    id: i64,
    session_id: String,
    sender: String,
    text: String,
    timestamp: String,
    intent: Option<String>,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            sender: row.try_get("sender")?,
            text: row.try_get("text")?,
            timestamp: row.try_get("timestamp")?,
            intent: row.try_get("intent")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let sender: Sender = self
            .sender
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Message {
            id: MessageId(self.id),
            session_id: parse_session_id(&self.session_id)?,
            sender,
            text: self.text,
            timestamp: parse_datetime(&self.timestamp)?,
            intent: self.intent,
        })
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<ChatSession, RepositoryError> {
    ChatSessionRow::from_row(row)
        .map_err(query_error)?
        .into_session()
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, RepositoryError> {
    MessageRow::from_row(row).map_err(query_error)?.into_message()
}

fn push_paging(sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
    match (limit, offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        // SQLite requires a LIMIT before OFFSET; -1 means unbounded.
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, email: Option<&str>) -> Result<ChatSession, RepositoryError> {
        let email = normalize_email(email)?;
        let now = now_micros();
        let session = ChatSession {
            id: SessionId::new(),
            email,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO chat_sessions (id, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.email)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| map_sqlx_error(e, "session"))?;

        Ok(session)
    }

    async fn get_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn list_sessions(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        let mut sql =
            String::from("SELECT * FROM chat_sessions ORDER BY created_at DESC, rowid DESC");
        push_paging(&mut sql, limit, offset);

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(row_to_session).collect()
    }

    async fn update_email(
        &self,
        session_id: &SessionId,
        email: Option<&str>,
    ) -> Result<ChatSession, RepositoryError> {
        let email = normalize_email(email)?;

        let row = sqlx::query(
            "UPDATE chat_sessions SET email = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(&email)
        .bind(format_datetime(&Utc::now()))
        .bind(session_id.to_string())
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(|e| map_sqlx_error(e, "email"))?;

        match row {
            Some(row) => row_to_session(&row),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn touch_session(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count_to_u64(count))
    }

    async fn add_message(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        message.validate()?;
        let now = format_datetime(&Utc::now());

        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query(
            r#"INSERT INTO messages (session_id, sender, text, timestamp, intent)
               VALUES (?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(message.session_id.to_string())
        .bind(message.sender.to_string())
        .bind(&message.text)
        .bind(&now)
        .bind(&message.intent)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(e, "message"))?;

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(message.session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        row_to_message(&row)
    }

    async fn get_message(&self, message_id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(message_id.0)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn get_messages(
        &self,
        session_id: &SessionId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut sql = String::from(
            "SELECT * FROM messages WHERE session_id = ? ORDER BY timestamp ASC, id ASC",
        );
        push_paging(&mut sql, limit, offset);

        let rows = sqlx::query(&sql)
            .bind(session_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter().map(row_to_message).collect()
    }

    async fn count_messages(&self, session_id: Option<&SessionId>) -> Result<u64, RepositoryError> {
        let row = match session_id {
            Some(session_id) => {
                sqlx::query("SELECT COUNT(*) AS cnt FROM messages WHERE session_id = ?")
                    .bind(session_id.to_string())
                    .fetch_one(&self.pool.reader)
                    .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS cnt FROM messages")
                    .fetch_one(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count_to_u64(count))
    }
}
