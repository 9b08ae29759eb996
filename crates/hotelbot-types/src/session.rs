//! Chat session types.
//!
//! A `ChatSession` is the aggregate root of a conversation: messages, the
//! cached search preference, recommendations and clicks all hang off it and
//! are deleted with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::validate;

/// Stable external handle for a conversation, wrapping a UUID v7 (time-sortable).
///
/// Generated once when the session is created and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// First eight characters of the hyphenated form, used in display strings.
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One user conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    /// Optional contact email left by the user.
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every interaction with the session.
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session {}... ({})", self.id.short(), self.created_at)
    }
}

/// Normalize and validate an optional contact email.
///
/// Blank strings are treated as "no email".
pub fn normalize_email(email: Option<&str>) -> Result<Option<String>, ValidationError> {
    match email.map(str::trim) {
        None | Some("") => Ok(None),
        Some(addr) => {
            validate::email(addr)?;
            Ok(Some(addr.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_roundtrip() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.short().len(), 8);
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_session_display() {
        let id: SessionId = "0191d3a4-5b6c-7d8e-9f00-112233445566".parse().unwrap();
        let now = Utc::now();
        let session = ChatSession {
            id,
            email: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(session.to_string(), format!("Session 0191d3a4... ({now})"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(None).unwrap(), None);
        assert_eq!(normalize_email(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_email(Some(" guest@example.com ")).unwrap().as_deref(),
            Some("guest@example.com")
        );
        assert!(normalize_email(Some("not-an-email")).is_err());
    }
}
