use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a transcript message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standing instruction for the conversation.
    Developer,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Developer => write!(f, "developer"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One role-tagged message.  An ordered sequence of these forms a
/// transcript; the first element, when present, is the standing
/// developer instruction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The text content of the message.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new developer `Message`.
    pub fn developer(content: impl Into<String>) -> Self {
        Self::new(Role::Developer, content)
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serialization() {
        assert_eq!(
            serde_json::to_string(&Role::Developer).unwrap(),
            r#""developer""#
        );
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
    }

    #[test]
    fn message_round_trip() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn constructors() {
        assert_eq!(Message::developer("x").role, Role::Developer);
        assert_eq!(Message::assistant("x").role, Role::Assistant);
        let from_str: Message = "hi".into();
        assert_eq!(from_str.role, Role::User);
    }
}
