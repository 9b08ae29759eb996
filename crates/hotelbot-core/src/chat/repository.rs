//! ChatRepository trait definition.
//!
//! CRUD for chat sessions and their messages. Messages have no update path.

use hotelbot_types::error::RepositoryError;
use hotelbot_types::message::{Message, MessageId, NewMessage};
use hotelbot_types::session::{ChatSession, SessionId};

/// Repository trait for session and message persistence.
///
/// Implementations live in hotelbot-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Start a new session with a freshly generated id.
    ///
    /// `email` is validated; blank strings are stored as no email.
    fn create_session(
        &self,
        email: Option<&str>,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    fn get_session(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// List sessions, most recently created first.
    fn list_sessions(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Replace the contact email and refresh `updated_at`.
    fn update_email(
        &self,
        session_id: &SessionId,
        email: Option<&str>,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Refresh `updated_at` without changing anything else.
    fn touch_session(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a session; messages, preferences, recommendations and clicks go with it.
    fn delete_session(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Append a message and refresh the owning session's `updated_at`.
    ///
    /// Fails with `Reference` when the session does not exist.
    fn add_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    fn get_message(
        &self,
        message_id: MessageId,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// Messages for a session in chronological order.
    fn get_messages(
        &self,
        session_id: &SessionId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    fn count_messages(
        &self,
        session_id: Option<&SessionId>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
