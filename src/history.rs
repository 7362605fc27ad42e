//! In-memory conversation transcripts.
//!
//! One transcript per conversation key, kept for the process lifetime only.
//! Settings are the durable half of per-conversation state; transcripts are
//! deliberately not persisted.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::key::ConversationKey;

/// One role-tagged message in a conversation's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl Turn {
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

/// Keyed map of transcripts. Lock scope stays inside each method; nothing
/// here is ever held across an await point.
#[derive(Debug, Default)]
pub struct ConversationStore {
    histories: RwLock<HashMap<ConversationKey, Vec<Turn>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the key's transcript, creating it if absent.
    pub fn append(&self, key: &ConversationKey, turn: Turn) {
        let mut histories = self.histories.write().unwrap();
        histories.entry(key.clone()).or_default().push(turn);
    }

    /// The last `min(n, stored)` turns, in original order.
    pub fn recent(&self, key: &ConversationKey, n: usize) -> Vec<Turn> {
        let histories = self.histories.read().unwrap();
        match histories.get(key) {
            Some(turns) => {
                let start = turns.len().saturating_sub(n);
                turns[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Empty the key's transcript. The key stays known; future appends
    /// start a fresh transcript.
    pub fn reset(&self, key: &ConversationKey) {
        let mut histories = self.histories.write().unwrap();
        histories.insert(key.clone(), Vec::new());
    }

    /// The full stored transcript, for display.
    pub fn status(&self, key: &ConversationKey) -> Vec<Turn> {
        let histories = self.histories.read().unwrap();
        histories.get(key).cloned().unwrap_or_default()
    }
}
