//! UI-agnostic chat message types
//!
//! Messages carry no identity beyond their position in a conversation, and
//! are shared by every front end (terminal UI, one-shot CLI).

use serde::{Deserialize, Serialize};

/// Text shown for the transient entry while a reply is on its way
pub const PLACEHOLDER_TEXT: &str = "Bot is typing...";

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub pending: bool,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            pending: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            pending: false,
        }
    }

    /// The "typing" placeholder appended while awaiting the relay
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER_TEXT.to_string(),
            sender: Sender::Bot,
            pending: true,
        }
    }
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "AI",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_pending_bot_message() {
        let msg = Message::placeholder();
        assert_eq!(msg.sender, Sender::Bot);
        assert!(msg.pending);
        assert_eq!(msg.text, PLACEHOLDER_TEXT);
    }

    #[test]
    fn sender_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"text":"hi","sender":"user","pending":false}"#);
    }
}
