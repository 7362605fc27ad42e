//! Conversation scoping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier scoping settings and history to one conversation:
/// one per shared channel context, one per direct one-to-one context.
///
/// Derived deterministically from platform identifiers, so the same scope
/// always maps to the same key across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Key for a shared group or channel scope.
    /// Used by platform gateways that carry group conversations
    #[allow(dead_code)]
    pub fn group(platform_id: &str) -> Self {
        Self(platform_id.to_string())
    }

    /// Key for a direct one-to-one scope. The `DM_` prefix keeps direct
    /// conversations from ever colliding with group identifiers.
    pub fn direct(user_id: &str) -> Self {
        Self(format!("DM_{}", user_id))
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
