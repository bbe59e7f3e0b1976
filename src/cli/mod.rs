//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Skill Chain - Enforce skill workflows for Claude Code agents
#[derive(Parser, Debug)]
#[command(name = "sc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable robot mode (JSON output to stdout, logs to stderr)
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: <workspace>/.claude/chain.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace root (default: current directory)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a profile and start an enforced session
    Activate(commands::activate::ActivateArgs),

    /// Show the current session: progress, current skill, blocked intents
    Status(commands::status::StatusArgs),

    /// Dry-run resolution of a profile (exit 1 on warnings)
    Resolve(commands::resolve::ResolveArgs),

    /// Explain why each skill was selected for a profile
    Explain(commands::explain::ExplainArgs),

    /// Render a profile's resolved chain as a mermaid flowchart
    Mermaid(commands::mermaid::MermaidArgs),

    /// Record manual evidence for a capability
    Satisfy(commands::satisfy::SatisfyArgs),

    /// Claude Code hook entry points (reads JSON on stdin)
    Hook(commands::hook::HookArgs),

    /// List or clear sessions
    Sessions(commands::sessions::SessionsArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
