//! The configuration command surface.
//!
//! Commands arrive from the platform's command layer already scoped to one
//! conversation key. Dispatch is a closed match over [`Command`], so an
//! unhandled command is a compile error rather than a silent no-op.

use std::str::FromStr;
use std::sync::Arc;

use tracing::error;

use crate::constants::{HISTORY_PREVIEW_CHARS, MESSAGE_CHUNK_LIMIT};
use crate::history::ConversationStore;
use crate::key::ConversationKey;
use crate::settings::{ModelId, SettingsStore};
use crate::usage::UsageTracker;

/// A recognized configuration command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetModel(ModelId),
    ResetHistory,
    SetHistoryMode(bool),
    ShowHistory,
    ShowUsage,
    ResetUsage,
}

impl Command {
    /// Parse a `/command [arg]` line. `None` for lines that are not
    /// commands at all; `Err` carries a usage message for a command line
    /// with an unknown name or bad arguments.
    pub fn parse(line: &str) -> Option<Result<Command, String>> {
        let rest = line.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next()?.to_lowercase();
        let arg = parts.next();

        let parsed = match name.as_str() {
            "model" => match arg {
                Some(value) => ModelId::from_str(value)
                    .map(Command::SetModel)
                    .map_err(|_| format!("Unknown model. Available: {}", model_list())),
                None => Err(format!("Usage: /model <{}>", model_list())),
            },
            "reset" => Ok(Command::ResetHistory),
            "history" => match arg {
                Some("on") => Ok(Command::SetHistoryMode(true)),
                Some("off") => Ok(Command::SetHistoryMode(false)),
                _ => Err("Usage: /history on|off".to_string()),
            },
            "status" => Ok(Command::ShowHistory),
            "usage" => Ok(Command::ShowUsage),
            "usage_reset" => Ok(Command::ResetUsage),
            other => Err(format!("Unknown command '/{}'.", other)),
        };
        Some(parsed)
    }
}

fn model_list() -> String {
    ModelId::ALL
        .iter()
        .map(|model| model.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// Store handles the command surface operates on.
pub struct CommandContext {
    pub history: Arc<ConversationStore>,
    pub settings: Arc<SettingsStore>,
    pub usage: Arc<UsageTracker>,
}

/// Execute a command for one conversation and return the reply text.
///
/// Persist failures never crash the command path: the in-memory state is
/// already applied, so the reply acknowledges the change and reports that
/// saving failed, with detail in the log.
pub fn dispatch(command: Command, key: &ConversationKey, ctx: &CommandContext) -> String {
    // Every inbound interaction seeds the scope's settings on first touch.
    ctx.settings.get(key);

    match command {
        Command::SetModel(model) => match ctx.settings.set_model(key, model) {
            Ok(()) => format!("Model set to **{}**", model),
            Err(err) => {
                error!(key = %key, error = %err, "failed to persist model selection");
                format!("Model set to **{}**, but saving settings failed.", model)
            }
        },

        Command::ResetHistory => {
            ctx.history.reset(key);
            "Conversation history cleared.".to_string()
        }

        Command::SetHistoryMode(enabled) => {
            let mode = if enabled { "on" } else { "off" };
            match ctx.settings.set_history_enabled(key, enabled) {
                Ok(()) => format!("History mode set to **{}**", mode),
                Err(err) => {
                    error!(key = %key, error = %err, "failed to persist history mode");
                    format!("History mode set to **{}**, but saving settings failed.", mode)
                }
            }
        }

        Command::ShowHistory => {
            let turns = ctx.history.status(key);
            if turns.is_empty() {
                return "History is empty.".to_string();
            }
            let listing = turns
                .iter()
                .enumerate()
                .map(|(i, turn)| {
                    format!("{}. [{}] {}", i + 1, turn.role.as_str(), preview(&turn.content))
                })
                .collect::<Vec<_>>()
                .join("\n");
            let mut reply = format!("**Stored history**\n{}", listing);
            truncate_in_place(&mut reply, MESSAGE_CHUNK_LIMIT);
            reply
        }

        Command::ShowUsage => {
            let stats = ctx.usage.snapshot();
            format!(
                "**Token usage since start**\nTotal: {}\nPrompt: {}\nCompletion: {}",
                stats.total_tokens, stats.prompt_tokens, stats.completion_tokens
            )
        }

        Command::ResetUsage => {
            ctx.usage.reset();
            "Token usage statistics reset.".to_string()
        }
    }
}

fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let shortened: String = chars.by_ref().take(HISTORY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", shortened)
    } else {
        shortened
    }
}

fn truncate_in_place(text: &mut String, max_chars: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max_chars) {
        text.truncate(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Turn;
    use crate::llm::UsageTriple;
    use crate::settings::Settings;

    fn context(tag: &str) -> (CommandContext, ConversationKey) {
        let path = std::env::temp_dir().join(format!(
            "parley-commands-{}-{}.json",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let ctx = CommandContext {
            history: Arc::new(ConversationStore::new()),
            settings: Arc::new(SettingsStore::load(path)),
            usage: Arc::new(UsageTracker::new()),
        };
        (ctx, ConversationKey::group("guild"))
    }

    #[test]
    fn parse_recognizes_every_command() {
        assert_eq!(
            Command::parse("/model gpt-4o"),
            Some(Ok(Command::SetModel(ModelId::Gpt4o)))
        );
        assert_eq!(Command::parse("/reset"), Some(Ok(Command::ResetHistory)));
        assert_eq!(
            Command::parse("/history off"),
            Some(Ok(Command::SetHistoryMode(false)))
        );
        assert_eq!(
            Command::parse("/history on"),
            Some(Ok(Command::SetHistoryMode(true)))
        );
        assert_eq!(Command::parse("/status"), Some(Ok(Command::ShowHistory)));
        assert_eq!(Command::parse("/usage"), Some(Ok(Command::ShowUsage)));
        assert_eq!(Command::parse("/usage_reset"), Some(Ok(Command::ResetUsage)));
    }

    #[test]
    fn parse_passes_chat_lines_through() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse("  plain text "), None);
    }

    #[test]
    fn parse_reports_bad_arguments() {
        assert!(matches!(Command::parse("/model nope"), Some(Err(_))));
        assert!(matches!(Command::parse("/model"), Some(Err(_))));
        assert!(matches!(Command::parse("/history maybe"), Some(Err(_))));
        assert!(matches!(Command::parse("/frobnicate"), Some(Err(_))));
    }

    #[test]
    fn set_model_updates_settings() {
        let (ctx, key) = context("setmodel");
        let reply = dispatch(Command::SetModel(ModelId::O3Mini), &key, &ctx);
        assert!(reply.contains("o3-mini"));
        assert_eq!(ctx.settings.get(&key).model, ModelId::O3Mini);
    }

    #[test]
    fn reset_clears_the_conversation() {
        let (ctx, key) = context("reset");
        ctx.history.append(&key, Turn::user("hello"));

        let reply = dispatch(Command::ResetHistory, &key, &ctx);
        assert_eq!(reply, "Conversation history cleared.");
        assert!(ctx.history.status(&key).is_empty());
    }

    #[test]
    fn history_mode_toggles_the_flag() {
        let (ctx, key) = context("mode");
        dispatch(Command::SetHistoryMode(false), &key, &ctx);
        assert_eq!(
            ctx.settings.get(&key),
            Settings {
                history_enabled: false,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn history_listing_previews_long_turns() {
        let (ctx, key) = context("listing");
        ctx.history.append(&key, Turn::user("a".repeat(300)));

        let reply = dispatch(Command::ShowHistory, &key, &ctx);
        assert!(reply.contains("[user]"));
        assert!(reply.contains(&format!("{}...", "a".repeat(100))));
        assert!(!reply.contains(&"a".repeat(150)));
    }

    #[test]
    fn empty_history_reports_empty() {
        let (ctx, key) = context("empty");
        assert_eq!(dispatch(Command::ShowHistory, &key, &ctx), "History is empty.");
    }

    #[test]
    fn usage_report_and_reset() {
        let (ctx, key) = context("usage");
        ctx.usage.record(&UsageTriple {
            prompt_tokens: 7,
            completion_tokens: 3,
            total_tokens: 10,
        });

        let reply = dispatch(Command::ShowUsage, &key, &ctx);
        assert!(reply.contains("Total: 10"));
        assert!(reply.contains("Prompt: 7"));
        assert!(reply.contains("Completion: 3"));

        dispatch(Command::ResetUsage, &key, &ctx);
        assert!(dispatch(Command::ShowUsage, &key, &ctx).contains("Total: 0"));
    }

    #[test]
    fn persist_failure_is_reported_but_applied_in_memory() {
        let path = std::env::temp_dir()
            .join(format!("parley-commands-absent-{}", std::process::id()))
            .join("nested")
            .join("settings.json");
        let ctx = CommandContext {
            history: Arc::new(ConversationStore::new()),
            settings: Arc::new(SettingsStore::load(path)),
            usage: Arc::new(UsageTracker::new()),
        };
        let key = ConversationKey::group("guild");

        let reply = dispatch(Command::SetModel(ModelId::Gpt4o), &key, &ctx);
        assert!(reply.contains("saving settings failed"));
        assert_eq!(ctx.settings.get(&key).model, ModelId::Gpt4o);
    }
}
