//! sc explain - per-skill selection reasons for a profile.

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, print_warnings};
use crate::error::Result;
use crate::resolver::{ResolveOptions, resolve};

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Profile to explain
    pub profile: String,
}

pub fn run(ctx: &AppContext, robot: bool, args: &ExplainArgs) -> Result<u8> {
    let profile = ctx.find_profile(&args.profile)?;
    let result = resolve(profile, &ctx.skills.skills, ResolveOptions::default())?;

    if robot {
        let warnings = result.warnings.clone();
        emit_robot(&result.explanations, warnings);
        return Ok(0);
    }

    println!(
        "Resolution of {} ({} skill(s)):",
        style(&profile.name).green().bold(),
        result.chain.len()
    );
    for explanation in &result.explanations {
        println!(
            "  {} {}",
            style(&explanation.skill).cyan().bold(),
            explanation.reason
        );
        if !explanation.requires.is_empty() {
            println!("      requires: {}", explanation.requires.join(", "));
        }
        if !explanation.provides.is_empty() {
            println!("      provides: {}", explanation.provides.join(", "));
        }
    }
    print_warnings(&result.warnings);

    Ok(0)
}
