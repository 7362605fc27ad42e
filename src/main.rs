//! Console gateway for the relay bot.
//!
//! Stands in for a chat-platform client: each input line is one inbound
//! message, `/`-prefixed lines are configuration commands, and reply chunks
//! are printed in order. A single message argument runs one turn and exits.

mod chunk;
mod commands;
mod config;
mod constants;
mod engine;
mod history;
mod key;
mod llm;
mod settings;
mod tools;
mod usage;

use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use commands::{Command, CommandContext};
use config::Config;
use constants::MESSAGE_CHUNK_LIMIT;
use engine::Engine;
use history::ConversationStore;
use key::ConversationKey;
use settings::SettingsStore;
use tools::ToolExecutor;
use usage::UsageTracker;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Relay chat messages to a completion API, one tool hop at a time"
)]
struct Cli {
    /// Send a single message, print the reply, and exit.
    message: Option<String>,

    /// Path of the settings document.
    #[arg(long)]
    settings: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(path) = cli.settings {
        config.settings_path = path;
    }

    let history = Arc::new(ConversationStore::new());
    let settings = Arc::new(SettingsStore::load(&config.settings_path));
    let usage = Arc::new(UsageTracker::new());

    let backend = llm::create_backend(&config)?;
    let engine = Engine::new(
        backend,
        ToolExecutor::new(),
        history.clone(),
        settings.clone(),
        usage.clone(),
        config.system_prompt.clone(),
    );

    let ctx = CommandContext {
        history,
        settings,
        usage,
    };
    let key = ConversationKey::direct("console");

    if let Some(message) = cli.message {
        respond(&engine, &key, &message).await;
        return Ok(());
    }

    run_console(engine, ctx, key).await
}

async fn run_console(
    engine: Engine,
    ctx: CommandContext,
    key: ConversationKey,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/exit" {
            break;
        }
        if !line.is_empty() {
            match Command::parse(line) {
                Some(Ok(command)) => println!("{}", commands::dispatch(command, &key, &ctx)),
                Some(Err(usage_text)) => println!("{}", usage_text),
                None => respond(&engine, &key, line).await,
            }
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

/// Run one turn and deliver the reply as ordered chunks.
async fn respond(engine: &Engine, key: &ConversationKey, message: &str) {
    match engine.run_turn(key, message).await {
        Ok(reply) => {
            for part in chunk::split(&reply, MESSAGE_CHUNK_LIMIT) {
                println!("{}", part);
            }
        }
        Err(err) => {
            error!(error = %err, "conversation turn failed");
            println!("{}", err.user_notice());
        }
    }
}
