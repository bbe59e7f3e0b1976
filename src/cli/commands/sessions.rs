//! sc sessions - session housekeeping.

use clap::{Args, Subcommand};
use console::style;

use crate::app::AppContext;
use crate::cli::output::emit_robot;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// List known session ids
    List,
    /// Delete a session (default: the current one)
    Clear {
        /// Session id to delete
        id: Option<String>,
    },
}

pub fn run(ctx: &AppContext, robot: bool, args: &SessionsArgs) -> Result<u8> {
    match &args.command {
        SessionsCommand::List => {
            let ids = ctx.store.list();
            let current = ctx.store.current_session_id();

            if robot {
                emit_robot(
                    serde_json::json!({ "sessions": ids, "current": current }),
                    Vec::new(),
                );
                return Ok(0);
            }

            if ids.is_empty() {
                println!("No sessions");
                return Ok(0);
            }
            for id in &ids {
                let marker = if Some(id) == current.as_ref() {
                    style("*").green().to_string()
                } else {
                    " ".to_string()
                };
                println!("{marker} {id}");
            }
            Ok(0)
        }
        SessionsCommand::Clear { id } => {
            let removed = match id {
                Some(id) => ctx.store.clear(id)?,
                None => ctx.store.clear_current()?,
            };

            if robot {
                emit_robot(serde_json::json!({ "removed": removed }), Vec::new());
                return Ok(0);
            }

            if removed {
                println!("Session cleared");
            } else {
                println!("Nothing to clear");
            }
            Ok(0)
        }
    }
}
