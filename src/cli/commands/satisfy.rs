//! sc satisfy - record manual evidence for a capability.

use chrono::Utc;
use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::emit_robot;
use crate::error::{ChainError, Result};
use crate::session::CapabilityEvidence;
use crate::telemetry::UsageEvent;

#[derive(Args, Debug)]
pub struct SatisfyArgs {
    /// Capability to mark satisfied
    pub capability: String,

    /// Skill credited with the work (default: the current skill)
    #[arg(long)]
    pub by: Option<String>,
}

pub fn run(ctx: &AppContext, robot: bool, args: &SatisfyArgs) -> Result<u8> {
    let state = ctx.store.load_current().ok_or(ChainError::NoActiveSession)?;
    let id = state.session_id.clone();

    let satisfied_by = args.by.clone().unwrap_or_else(|| {
        state
            .current_skill(&ctx.skills.skills)
            .map_or_else(|| "manual".to_string(), |(s, _)| s.name.clone())
    });

    let already = state.is_satisfied(&args.capability);
    ctx.store.satisfy_capability(
        &id,
        CapabilityEvidence::manual(args.capability.as_str(), satisfied_by.as_str()),
        &ctx.skills.skills,
    )?;

    let updated = ctx
        .store
        .load(&id)
        .ok_or_else(|| ChainError::SessionNotFound(id.clone()))?;
    if updated.is_complete() {
        ctx.usage.record(&UsageEvent::Completion {
            session_id: id.clone(),
            timestamp: Utc::now(),
            profile: updated.profile_id.clone(),
            capabilities_satisfied: updated.capabilities_satisfied.len(),
        });
    }

    if robot {
        emit_robot(
            serde_json::json!({
                "capability": args.capability,
                "already_satisfied": already,
                "complete": updated.is_complete(),
            }),
            Vec::new(),
        );
        return Ok(0);
    }

    if already {
        println!(
            "{} {} already satisfied (first evidence kept)",
            style("✓").green(),
            args.capability
        );
    } else {
        println!(
            "{} {} satisfied by {}",
            style("✓").green(),
            args.capability,
            satisfied_by
        );
    }
    if updated.is_complete() {
        println!("{}", style("Chain COMPLETE").green().bold());
    }

    Ok(0)
}
