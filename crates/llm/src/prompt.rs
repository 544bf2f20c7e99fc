//! Message construction
//!
//! Every turn is stateless: one system message followed by one user message.

use std::fmt;
use serde::{Deserialize, Serialize};

use avatar_chat_core::CompletionRequest;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Messages for a single stateless turn
pub fn turn_messages(request: &CompletionRequest) -> Vec<Message> {
    vec![
        Message::system(&request.system_prompt),
        Message::user(&request.user_message),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_chat_core::CompletionOptions;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::User.as_str(), "user");
    }

    #[test]
    fn test_turn_messages_order() {
        let request = CompletionRequest::new(
            "You are a guide",
            "Hello",
            CompletionOptions::new("gpt-3.5-turbo", 200),
        );
        let messages = turn_messages(&request);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::system("You are a guide"));
        assert_eq!(messages[1], Message::user("Hello"));
    }
}
