//! Conversation messages and the bounded history sent to the model.

use serde::{Deserialize, Serialize};

/// Trim once the history grows past this many entries
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Entries kept from the tail when trimming (the first entry is kept as well)
pub const DEFAULT_HISTORY_KEEP: usize = 8;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat message, serialized in the Chat Completions wire shape
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
}

/// Ordered message history.
///
/// The first entry is never evicted. When a system prompt is present it is
/// always that first entry, so trimming keeps the model's instructions.
#[derive(Debug, Clone)]
pub struct History {
    messages: Vec<Message>,
    limit: usize,
    keep: usize,
}

impl History {
    /// Create an empty history with the default trim policy
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_HISTORY_LIMIT, DEFAULT_HISTORY_KEEP)
    }

    /// Create a history that starts with a system prompt
    pub fn with_system(prompt: impl Into<String>) -> Self {
        let mut history = Self::new();
        history.messages.push(Message::system(prompt));
        history
    }

    /// Create an empty history with a custom trim policy.
    ///
    /// `keep` is clamped below `limit` so a trim always shrinks the history.
    pub fn with_policy(limit: usize, keep: usize) -> Self {
        Self {
            messages: Vec::new(),
            limit,
            keep: keep.min(limit.saturating_sub(1)),
        }
    }

    /// Replace the trim policy, keeping the current messages
    pub fn set_policy(&mut self, limit: usize, keep: usize) {
        self.limit = limit;
        self.keep = keep.min(limit.saturating_sub(1));
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Trim to `[first] + [last keep]` if the history exceeds its limit.
    ///
    /// Returns the number of discarded entries.
    pub fn trim(&mut self) -> usize {
        if self.messages.len() <= self.limit {
            return 0;
        }

        let tail_start = self.messages.len() - self.keep;
        let discarded = tail_start - 1;
        self.messages.drain(1..tail_start);
        discarded
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
