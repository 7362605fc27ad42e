// Operational limits for the bot core. Values mirror the ceilings of the
// host platform and the completion API the bot is deployed against.

/// Most recent turns sent as model context when history is enabled.
pub const HISTORY_WINDOW: usize = 10;

/// Output-token budget per completion request.
pub const MAX_REPLY_TOKENS: u32 = 1500;

/// Conservative per-message ceiling for outbound replies.
pub const MESSAGE_CHUNK_LIMIT: usize = 1900;

/// Upper bound on tool output fed back to the model.
pub const FETCH_TEXT_LIMIT: usize = 5000;

/// Timeout for the tool fetch; a slow page must not stall a conversation.
pub const FETCH_TIMEOUT_SECS: u64 = 20;

/// Identifying header sent with tool fetches.
pub const FETCH_USER_AGENT: &str = "Mozilla/5.0 (compatible; parley/0.1)";

/// Per-turn preview length in the history listing.
pub const HISTORY_PREVIEW_CHARS: usize = 100;

/// Instruction prepended to every completion request.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
