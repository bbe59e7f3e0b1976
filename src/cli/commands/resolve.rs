//! sc resolve - dry-run resolution of a profile.
//!
//! Exits 1 when the resolution carries warnings, so CI can treat a
//! partial chain as a failure.

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, print_warnings};
use crate::error::Result;
use crate::resolver::{ResolveOptions, resolve};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Profile to resolve
    pub profile: String,

    /// Emit JSON instead of human output
    #[arg(long)]
    pub json: bool,

    /// Skip conflicting providers with a warning instead of failing
    #[arg(long)]
    pub no_fail_fast: bool,
}

pub fn run(ctx: &AppContext, robot: bool, args: &ResolveArgs) -> Result<u8> {
    let profile = ctx.find_profile(&args.profile)?;
    let result = resolve(
        profile,
        &ctx.skills.skills,
        ResolveOptions {
            fail_fast: !args.no_fail_fast,
        },
    )?;

    let exit = u8::from(!result.warnings.is_empty());

    if robot || args.json {
        let warnings = result.warnings.clone();
        emit_robot(&result, warnings);
        return Ok(exit);
    }

    println!(
        "Profile {} resolves to {} skill(s)",
        style(&profile.name).green().bold(),
        result.chain.len()
    );
    for name in &result.chain {
        println!("  {} {name}", style("→").cyan());
    }
    if !result.blocked_intents.is_empty() {
        println!("Gated intents:");
        for (intent, reason) in &result.blocked_intents {
            println!("  {} {intent}: {reason}", style("⊘").red());
        }
    }
    print_warnings(&result.warnings);

    Ok(exit)
}
