//! The bot's callable tools.
//!
//! Tool dispatch is a closed enum: the orchestrator parses a requested call
//! into a [`ToolInvocation`] and only then hands it to the executor, so a
//! name outside the enum never reaches the execution path.

pub mod fetch;

use std::time::Duration;

use lazy_static::lazy_static;
use serde::Deserialize;
use serde_json::json;

use crate::constants::{FETCH_TEXT_LIMIT, FETCH_TIMEOUT_SECS, FETCH_USER_AGENT};
use crate::llm::{FunctionSpec, ToolSpec};

lazy_static! {
    /// Parameter schema for `fetch_url`, as declared to the completion API.
    static ref FETCH_URL_PARAMETERS: serde_json::Value = json!({
        "type": "object",
        "properties": {
            "url": { "type": "string" }
        },
        "required": ["url"]
    });
}

/// A recognized tool call with parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    FetchUrl { url: String },
}

#[derive(Debug, Deserialize)]
struct FetchUrlArgs {
    url: String,
}

/// Why a requested call could not be turned into an invocation.
#[derive(Debug, thiserror::Error)]
pub enum ToolParseError {
    #[error("unrecognized tool name '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for '{name}': {source}")]
    InvalidArguments {
        name: String,
        source: serde_json::Error,
    },
}

impl ToolInvocation {
    /// Parse a requested call by name and JSON-encoded arguments.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolParseError> {
        match name {
            "fetch_url" => {
                let args: FetchUrlArgs =
                    serde_json::from_str(arguments).map_err(|source| {
                        ToolParseError::InvalidArguments {
                            name: name.to_string(),
                            source,
                        }
                    })?;
                Ok(ToolInvocation::FetchUrl { url: args.url })
            }
            other => Err(ToolParseError::UnknownTool(other.to_string())),
        }
    }

    /// Declarations for every recognized tool, offered on the first round.
    pub fn declarations() -> Vec<ToolSpec> {
        vec![ToolSpec {
            kind: "function",
            function: FunctionSpec {
                name: "fetch_url",
                description: "Fetch the text content of a web page by URL",
                parameters: FETCH_URL_PARAMETERS.clone(),
            },
        }]
    }
}

/// Runs tool invocations against the outside world.
///
/// Execution never fails past this boundary: fetch and extraction problems
/// come back as descriptive text, so the model always receives a usable
/// tool result.
pub struct ToolExecutor {
    client: reqwest::Client,
    max_output_chars: usize,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self::with_limits(FETCH_TIMEOUT_SECS, FETCH_TEXT_LIMIT)
    }

    pub fn with_limits(timeout_secs: u64, max_output_chars: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(FETCH_USER_AGENT)
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            max_output_chars,
        }
    }

    pub async fn run(&self, invocation: &ToolInvocation) -> String {
        match invocation {
            ToolInvocation::FetchUrl { url } => {
                fetch::fetch_url(&self.client, url, self.max_output_chars).await
            }
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}
