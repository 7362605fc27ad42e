//! Runtime configuration from the environment.

use std::env;
use std::path::PathBuf;

use crate::constants::SYSTEM_PROMPT;
use crate::llm::openai::DEFAULT_API_BASE;

/// Process-level configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the completion service.
    pub api_key: String,

    /// Base URL of the completion service.
    pub api_base: String,

    /// Path of the persisted settings document.
    pub settings_path: PathBuf,

    /// Instruction prepended to every completion request.
    pub system_prompt: String,
}

impl Config {
    /// Read configuration from the environment. Only the API key is
    /// required; everything else has a default.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let api_base =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let settings_path = env::var("PARLEY_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("settings.json"));
        let system_prompt =
            env::var("PARLEY_SYSTEM_PROMPT").unwrap_or_else(|_| SYSTEM_PROMPT.to_string());

        Ok(Self {
            api_key,
            api_base,
            settings_path,
            system_prompt,
        })
    }
}
