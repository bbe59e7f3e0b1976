//! sc - Skill Chain CLI
//!
//! Enforce skill workflows for Claude Code agents.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use skillchain::Result;
use skillchain::app::AppContext;
use skillchain::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            if cli.robot {
                // Robot mode: JSON error output to stdout
                let code = e.code();
                let error_json = serde_json::json!({
                    "error": true,
                    "code": code,
                    "numeric_code": code.numeric(),
                    "message": e.to_string(),
                    "suggestion": code.suggestion(),
                    "category": code.category(),
                    "recoverable": code.is_recoverable(),
                });
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    if let Commands::Completions(args) = &cli.command {
        return skillchain::cli::commands::completions::run(args);
    }
    let ctx = AppContext::from_cli(cli)?;
    skillchain::cli::commands::run(&ctx, cli)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,skillchain=info",
        1 => "info,skillchain=debug",
        2 => "debug,skillchain=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Human-readable logging
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
