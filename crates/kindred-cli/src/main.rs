// Kindred CLI: run the policy engine against a single message from the
// terminal. Every subcommand prints pretty JSON on stdout.
//
//   kindred analyze "I'm stressed about my exam tomorrow"
//   kindred crisis  "..."
//   kindred tags    "..."
//
// Logging goes to stderr via env_logger (RUST_LOG=debug for the [policy-*]
// trace).

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use kindred::engine::policy::{crisis_resource_message, extract_memory_tags, scan_crisis};
use kindred::{
    ChatMessage, CompanionSession, PolicyConfig, PolicyError, PolicyResult, SystemClock,
    ThreadRandom,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Kindred conversational policy engine
#[derive(Parser)]
#[command(name = "kindred")]
#[command(about = "Heuristic emotion, crisis and memory policy for an AI companion", long_about = None)]
#[command(version)]
struct Cli {
    /// Policy config (TOML). Defaults apply to every omitted key.
    #[arg(long, global = true, env = "KINDRED_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a message and select a response strategy
    Analyze {
        text: String,
        /// JSON array of prior messages ({role, content, timestamp}), oldest first
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Check a message against the crisis keyword net
    Crisis { text: String },

    /// Extract memory tags from a message
    Tags { text: String },

    /// Print shell completions
    Completions { shell: Shell },
}

#[derive(Serialize)]
struct CrisisReport {
    crisis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<String>,
}

fn load_config(path: Option<&Path>) -> PolicyResult<PolicyConfig> {
    match path {
        Some(p) => PolicyConfig::load(p),
        None => Ok(PolicyConfig::default()),
    }
}

fn load_history(path: Option<&Path>) -> PolicyResult<Vec<ChatMessage>> {
    match path {
        Some(p) => Ok(serde_json::from_str(&std::fs::read_to_string(p)?)?),
        None => Ok(Vec::new()),
    }
}

fn print_json<T: Serialize>(value: &T) -> PolicyResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> PolicyResult<()> {
    match cli.command {
        Commands::Analyze { text, history } => {
            let config = load_config(cli.config.as_deref())?;
            let history = load_history(history.as_deref())?;
            let mut session =
                CompanionSession::new(config, Arc::new(SystemClock), Box::new(ThreadRandom))?;
            print_json(&session.handle_inbound(&text, &history))
        }
        Commands::Crisis { text } => {
            let matched = scan_crisis(&text);
            print_json(&CrisisReport {
                crisis: matched.is_some(),
                matched,
                resources: matched.map(|_| crisis_resource_message()),
            })
        }
        Commands::Tags { text } => print_json(&extract_memory_tags(&text, chrono::Utc::now())),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "kindred", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{}", e);
        eprintln!("kindred: {}", e);
        std::process::exit(match e {
            PolicyError::Config(_) | PolicyError::Toml(_) => 2,
            _ => 1,
        });
    }
}
