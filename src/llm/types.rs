//! Wire types for chat-completion exchanges.
//!
//! Request shapes follow the chat-completions message format; optional
//! fields are skipped on serialization so the JSON stays minimal.

use serde::{Deserialize, Serialize};

use crate::history::Turn;

/// A role-tagged message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self::text("system", content)
    }

    pub fn user(content: &str) -> Self {
        Self::text("user", content)
    }

    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// The assistant message that carried a tool call, replayed on the
    /// second round so the API can associate the pending call.
    pub fn assistant_tool_call(content: Option<String>, call: ToolCall) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: Some(vec![call]),
            tool_call_id: None,
        }
    }

    /// The tool-result message, tagged with the originating call id.
    pub fn tool_result(call_id: &str, output: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(output),
            tool_calls: None,
            tool_call_id: Some(call_id.to_string()),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self::text(turn.role.as_str(), &turn.content)
    }
}

/// A model-initiated request to invoke an external capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the API sent it.
    pub arguments: String,
}

/// A callable capability declared to the API.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON-schema object describing the accepted arguments.
    pub parameters: serde_json::Value,
}

/// One completion exchange: context messages in, one candidate out.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Capabilities the model may call; empty on terminal rounds.
    pub tools: Vec<ToolSpec>,
    pub max_tokens: u32,
}

/// The first response candidate plus its usage report.
#[derive(Debug, Clone)]
pub struct Completion {
    pub message: AssistantMessage,
    pub usage: UsageTriple,
}

/// The assistant message of a response candidate.
#[derive(Debug, Clone, Default)]
pub struct AssistantMessage {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// Token usage reported by the completion API per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UsageTriple {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}
