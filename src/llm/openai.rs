//! OpenAI chat completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm::retry::send_with_retry;
use crate::llm::{
    AssistantMessage, ChatMessage, Completion, CompletionBackend, CompletionRequest, LlmError,
    ToolCall, ToolSpec, UsageTriple,
};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Request payload for the chat completions endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<UsageTriple>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

/// Client for the OpenAI chat completions endpoint.
pub struct OpenAiBackend {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: String, api_base: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("failed to create HTTP client");

        Self {
            api_key,
            api_base,
            client,
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let payload = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            tools: (!request.tools.is_empty()).then_some(request.tools.as_slice()),
            max_tokens: request.max_tokens,
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| LlmError::Api(format!("failed to serialize request: {}", e)))?;
        let url = format!("{}/chat/completions", self.api_base);

        let response: ChatCompletionResponse = send_with_retry(|| {
            self.client
                .post(&url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
        })
        .await?;

        // Only the first candidate is used.
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Api("no choices in completion response".to_string()))?;

        Ok(Completion {
            message: AssistantMessage {
                content: choice.message.content,
                tool_calls: choice.message.tool_calls.unwrap_or_default(),
            },
            usage: response.usage.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolInvocation;

    #[test]
    fn request_serializes_with_declared_tools() {
        let declarations = ToolInvocation::declarations();
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let payload = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            tools: Some(&declarations),
            max_tokens: 1500,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 1500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "fetch_url");
    }

    #[test]
    fn request_omits_the_tools_field_on_terminal_rounds() {
        let messages = [ChatMessage::user("hi")];
        let payload = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            tools: None,
            max_tokens: 1500,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn response_parses_a_tool_call_candidate() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "fetch_url",
                            "arguments": "{\"url\":\"https://example.com\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 21, "completion_tokens": 17, "total_tokens": 38}
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let calls = parsed.choices[0].message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_abc");
        assert_eq!(calls[0].function.name, "fetch_url");
        assert_eq!(parsed.usage.unwrap().total_tokens, 38);
    }

    #[test]
    fn response_parses_a_plain_text_candidate() {
        let raw = r#"{
            "choices": [{
                "message": {"role": "assistant", "content": "4"},
                "finish_reason": "stop"
            }]
        }"#;

        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("4"));
        assert!(parsed.choices[0].message.tool_calls.is_none());
        assert_eq!(parsed.usage.unwrap_or_default(), UsageTriple::default());
    }
}
