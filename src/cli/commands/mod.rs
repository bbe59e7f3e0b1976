//! Command handlers.
//!
//! Each handler returns the process exit code: 0 on success, 1 on
//! operational failure (for `resolve`, also when warnings are present).

pub mod activate;
pub mod completions;
pub mod explain;
pub mod hook;
pub mod mermaid;
pub mod resolve;
pub mod satisfy;
pub mod sessions;
pub mod status;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::error::Result;

/// Dispatch a parsed command.
pub fn run(ctx: &AppContext, cli: &Cli) -> Result<u8> {
    match &cli.command {
        Commands::Activate(args) => activate::run(ctx, cli.robot, args),
        Commands::Status(args) => status::run(ctx, cli.robot, args),
        Commands::Resolve(args) => resolve::run(ctx, cli.robot, args),
        Commands::Explain(args) => explain::run(ctx, cli.robot, args),
        Commands::Mermaid(args) => mermaid::run(ctx, args),
        Commands::Satisfy(args) => satisfy::run(ctx, cli.robot, args),
        Commands::Hook(args) => hook::run(ctx, args),
        Commands::Sessions(args) => sessions::run(ctx, cli.robot, args),
        Commands::Completions(args) => completions::run(args),
    }
}
