//! The completion orchestrator: one user turn in, one reply out, with at
//! most one tool round-trip in between.

use std::sync::Arc;

use tracing::debug;

use crate::constants::{HISTORY_WINDOW, MAX_REPLY_TOKENS};
use crate::history::{ConversationStore, Turn};
use crate::key::ConversationKey;
use crate::llm::{ChatMessage, CompletionBackend, CompletionRequest, LlmError, ToolCall};
use crate::settings::SettingsStore;
use crate::tools::{ToolExecutor, ToolInvocation, ToolParseError};
use crate::usage::UsageTracker;

/// Errors that abort a conversation turn. The user turn already appended to
/// history is kept; no assistant turn is recorded.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Completion(#[from] LlmError),

    /// The API requested a call the bot never declared, or sent arguments
    /// that do not match the declared schema.
    #[error(transparent)]
    Protocol(#[from] ToolParseError),
}

impl EngineError {
    /// The one short notice shown to the end user; detail stays in the log.
    pub fn user_notice(&self) -> &'static str {
        "Something went wrong while generating a reply. Please try again."
    }
}

/// Progress of one turn through the two-round tool-calling protocol.
///
/// A tool hop is only reachable from the first response and the second
/// response is terminal, so a turn can never chain tool calls.
enum TurnPhase {
    AwaitingFirstResponse,
    AwaitingToolResult {
        assistant: ChatMessage,
        call: ToolCall,
    },
    AwaitingSecondResponse {
        assistant: ChatMessage,
        call_id: String,
        output: String,
    },
    Done {
        reply: String,
    },
}

/// Orchestrates completion requests for every conversation. One instance is
/// shared by all in-flight message tasks; the stores it holds are the only
/// mutable state they share.
pub struct Engine {
    backend: Box<dyn CompletionBackend>,
    tools: ToolExecutor,
    history: Arc<ConversationStore>,
    settings: Arc<SettingsStore>,
    usage: Arc<UsageTracker>,
    system_prompt: String,
}

impl Engine {
    pub fn new(
        backend: Box<dyn CompletionBackend>,
        tools: ToolExecutor,
        history: Arc<ConversationStore>,
        settings: Arc<SettingsStore>,
        usage: Arc<UsageTracker>,
        system_prompt: String,
    ) -> Self {
        Self {
            backend,
            tools,
            history,
            settings,
            usage,
            system_prompt,
        }
    }

    /// Run one user turn to completion and return the final reply text.
    ///
    /// The user turn is appended before the first request, so a failed turn
    /// still replays naturally as context on retry. Prior turns are
    /// snapshotted before that append: the context is the system
    /// instruction, up to [`HISTORY_WINDOW`] prior turns, and the new user
    /// message.
    pub async fn run_turn(
        &self,
        key: &ConversationKey,
        user_message: &str,
    ) -> Result<String, EngineError> {
        let settings = self.settings.get(key);

        let prior = if settings.history_enabled {
            self.history.recent(key, HISTORY_WINDOW)
        } else {
            Vec::new()
        };
        self.history.append(key, Turn::user(user_message));

        let mut context = Vec::with_capacity(prior.len() + 2);
        context.push(ChatMessage::system(&self.system_prompt));
        context.extend(prior.iter().map(ChatMessage::from));
        context.push(ChatMessage::user(user_message));

        let mut phase = TurnPhase::AwaitingFirstResponse;
        loop {
            phase = match phase {
                TurnPhase::AwaitingFirstResponse => {
                    let completion = self
                        .backend
                        .complete(&CompletionRequest {
                            model: settings.model.as_str().to_string(),
                            messages: context.clone(),
                            tools: ToolInvocation::declarations(),
                            max_tokens: MAX_REPLY_TOKENS,
                        })
                        .await?;
                    self.usage.record(&completion.usage);
                    debug!(
                        key = %key,
                        total_tokens = completion.usage.total_tokens,
                        "first completion round"
                    );

                    let mut calls = completion.message.tool_calls;
                    if calls.is_empty() {
                        TurnPhase::Done {
                            reply: completion.message.content.unwrap_or_default(),
                        }
                    } else {
                        if calls.len() > 1 {
                            debug!(
                                ignored = calls.len() - 1,
                                "honoring only the first requested tool call"
                            );
                        }
                        let call = calls.swap_remove(0);
                        let assistant = ChatMessage::assistant_tool_call(
                            completion.message.content,
                            call.clone(),
                        );
                        TurnPhase::AwaitingToolResult { assistant, call }
                    }
                }

                TurnPhase::AwaitingToolResult { assistant, call } => {
                    let invocation =
                        ToolInvocation::parse(&call.function.name, &call.function.arguments)?;
                    let output = self.tools.run(&invocation).await;
                    TurnPhase::AwaitingSecondResponse {
                        assistant,
                        call_id: call.id,
                        output,
                    }
                }

                TurnPhase::AwaitingSecondResponse {
                    assistant,
                    call_id,
                    output,
                } => {
                    let mut messages = context.clone();
                    messages.push(assistant);
                    messages.push(ChatMessage::tool_result(&call_id, output));

                    // Terminal round: no tools are offered, which bounds
                    // every turn to a single tool hop.
                    let completion = self
                        .backend
                        .complete(&CompletionRequest {
                            model: settings.model.as_str().to_string(),
                            messages,
                            tools: Vec::new(),
                            max_tokens: MAX_REPLY_TOKENS,
                        })
                        .await?;
                    self.usage.record(&completion.usage);
                    debug!(
                        key = %key,
                        total_tokens = completion.usage.total_tokens,
                        "second completion round"
                    );

                    TurnPhase::Done {
                        reply: completion.message.content.unwrap_or_default(),
                    }
                }

                TurnPhase::Done { reply } => {
                    self.history.append(key, Turn::assistant(reply.clone()));
                    return Ok(reply);
                }
            };
        }
    }
}
