//! sc activate - resolve a profile and start an enforced session.

use clap::Args;
use console::style;

use crate::activation::ActivationOptions;
use crate::app::AppContext;
use crate::cli::output::{emit_robot, print_warnings};
use crate::error::Result;
use crate::resolver::ResolveOptions;

#[derive(Args, Debug)]
pub struct ActivateArgs {
    /// Profile to activate
    pub profile: String,

    /// Replay key: the same id always returns the same session
    #[arg(long)]
    pub request_id: Option<String>,

    /// Skip conflicting providers with a warning instead of failing
    #[arg(long)]
    pub no_fail_fast: bool,
}

pub fn run(ctx: &AppContext, robot: bool, args: &ActivateArgs) -> Result<u8> {
    let options = ActivationOptions {
        request_id: args.request_id.clone(),
        resolve: ResolveOptions {
            fail_fast: !args.no_fail_fast,
        },
        auto_activated: false,
    };
    let result = ctx.activator.activate(
        &args.profile,
        &ctx.skills,
        &ctx.profiles,
        &ctx.store,
        &ctx.usage,
        &options,
    )?;

    if robot {
        let warnings = result.warnings.clone();
        emit_robot(&result, warnings);
        return Ok(0);
    }

    if result.idempotent {
        println!(
            "Session {} already active for profile {} (idempotent replay)",
            style(&result.session_id).cyan(),
            style(&result.profile).green()
        );
        return Ok(0);
    }

    println!(
        "Activated profile {} (session {})",
        style(&result.profile).green().bold(),
        style(&result.session_id).cyan()
    );
    if result.chain.is_empty() {
        println!("  chain: (empty)");
    } else {
        println!("  chain: {}", result.chain.join(" → "));
    }
    print_warnings(&result.warnings);

    Ok(0)
}
