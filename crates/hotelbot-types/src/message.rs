//! Conversation turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::session::SessionId;
use crate::validate;

/// Maximum length of a classified intent label.
pub const MAX_INTENT_LEN: usize = 50;

/// Who authored a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (sender IN ('user', 'bot'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored turn. Messages are immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Label attached by the intent classifier, if any.
    pub intent: Option<String>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(50).collect();
        write!(f, "{}: {}", self.sender.to_string().to_uppercase(), preview)
    }
}

/// Input for appending a message; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub session_id: SessionId,
    pub sender: Sender,
    pub text: String,
    #[serde(default)]
    pub intent: Option<String>,
}

impl NewMessage {
    pub fn user(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            sender: Sender::User,
            text: text.into(),
            intent: None,
        }
    }

    pub fn bot(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            sender: Sender::Bot,
            text: text.into(),
            intent: None,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::new("text", "is required"));
        }
        if let Some(intent) = &self.intent {
            validate::required("intent", intent, MAX_INTENT_LEN)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Bot] {
            let parsed: Sender = sender.to_string().parse().unwrap();
            assert_eq!(sender, parsed);
        }
        assert!("assistant".parse::<Sender>().is_err());
    }

    #[test]
    fn test_sender_serde() {
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
    }

    #[test]
    fn test_message_display_truncates() {
        let msg = Message {
            id: MessageId(1),
            session_id: SessionId::new(),
            sender: Sender::User,
            text: "x".repeat(80),
            timestamp: Utc::now(),
            intent: None,
        };
        assert_eq!(msg.to_string(), format!("USER: {}", "x".repeat(50)));
    }

    #[test]
    fn test_new_message_validation() {
        let sid = SessionId::new();
        assert!(NewMessage::user(sid, "Need a hotel in Paris").validate().is_ok());
        assert!(NewMessage::user(sid, "  ").validate().is_err());

        let err = NewMessage::bot(sid, "Here are options")
            .with_intent("i".repeat(51))
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "intent");
    }
}
