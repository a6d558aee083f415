//! Conversation entities

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Prepend `system_prompt` unless the conversation already opens with a
/// system turn.
pub fn with_system_prompt(messages: &[Message], system_prompt: &str) -> Vec<Message> {
    if system_prompt.is_empty() || messages.iter().any(Message::is_system) {
        return messages.to_vec();
    }
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(Message::system(system_prompt));
    out.extend_from_slice(messages);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_with_system_prompt_prepends_once() {
        let messages = vec![Message::user("hello")];
        let out = with_system_prompt(&messages, "be brief");
        assert_eq!(out.len(), 2);
        assert!(out[0].is_system());

        let again = with_system_prompt(&out, "be brief");
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_with_empty_system_prompt_is_noop() {
        let messages = vec![Message::user("hello")];
        assert_eq!(with_system_prompt(&messages, ""), messages);
    }
}
