//! Conversation Messages
//!
//! Standard message format used for both the session transcript and the
//! prompts sent to the language model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Only ever sent to the provider, never stored in a transcript
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire and display name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chat message
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,

    /// When the message was created; filled in if absent on the wire
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A question typed into the page
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// A greeting or an agent answer
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Message::user("What is 2 + 2?").role, Role::User);
        assert_eq!(Message::assistant("4").role, Role::Assistant);
        assert_eq!(Message::system("rules").role.as_str(), "system");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_timestamp_defaults_when_missing() {
        let msg: Message = serde_json::from_str(r#"{"role":"user","content":"2+2"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "2+2");
    }
}
