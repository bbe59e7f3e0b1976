//! sc status - show the current session.

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_robot, heading};
use crate::error::{ChainError, Result};
use crate::probes::run_session_probes;
use crate::session::{SessionPhase, SessionState};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit JSON instead of human output
    #[arg(long)]
    pub json: bool,

    /// Run evidence probes and record what they find before reporting
    #[arg(long)]
    pub probe: bool,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    session: &'a SessionState,
    complete: bool,
    satisfied: usize,
    total: usize,
    current_skill: Option<String>,
    current_capability: Option<String>,
    unsatisfied: Vec<String>,
}

pub fn run(ctx: &AppContext, robot: bool, args: &StatusArgs) -> Result<u8> {
    let mut state = ctx.store.load_current().ok_or(ChainError::NoActiveSession)?;

    if args.probe {
        let profile = ctx.find_profile(&state.profile_id).ok();
        let newly = run_session_probes(&ctx.workspace, &mut state, &ctx.skills.skills, profile);
        if !newly.is_empty() {
            ctx.store.save(&state)?;
            tracing::info!(count = newly.len(), "probes recorded new evidence");
        }
    }

    let current = state.current_skill(&ctx.skills.skills);
    let report = StatusReport {
        complete: state.is_complete(),
        satisfied: state.satisfied_count(),
        total: state.capabilities_required.len(),
        current_skill: current.as_ref().map(|(s, _)| s.name.clone()),
        current_capability: current.as_ref().map(|(_, c)| c.clone()),
        unsatisfied: state.unsatisfied_capabilities(),
        session: &state,
    };

    if robot || args.json {
        emit_robot(&report, Vec::new());
        return Ok(0);
    }

    println!(
        "{} {} (session {})",
        heading("Profile:"),
        style(&state.profile_id).green().bold(),
        style(&state.session_id).dim()
    );
    println!(
        "{} {}/{} capabilities satisfied",
        heading("Progress:"),
        report.satisfied,
        report.total
    );
    println!("{} {}", heading("Chain:"), state.chain.join(" → "));

    match state.phase() {
        SessionPhase::Complete => {
            println!("{}", style("COMPLETE").green().bold());
        }
        SessionPhase::Active(_) => {
            if let Some((skill, capability)) = &current {
                println!(
                    "{} {} (need: {})",
                    heading("Current:"),
                    style(&skill.name).cyan(),
                    capability
                );
            }
        }
    }

    if !state.capabilities_satisfied.is_empty() {
        println!("{}", heading("Satisfied:"));
        for evidence in &state.capabilities_satisfied {
            let path = evidence
                .evidence_path
                .as_deref()
                .map(|p| format!(" ({p})"))
                .unwrap_or_default();
            println!(
                "  {} {} by {}{path}",
                style("✓").green(),
                evidence.capability,
                evidence.satisfied_by
            );
        }
    }
    if !report.unsatisfied.is_empty() {
        println!("{}", heading("Outstanding:"));
        for capability in &report.unsatisfied {
            println!("  {} {capability}", style("•").dim());
        }
    }
    if !state.blocked_intents.is_empty() {
        println!("{}", heading("Gated intents:"));
        for (intent, reason) in &state.blocked_intents {
            println!("  {} {intent}: {reason}", style("⊘").red());
        }
    }

    Ok(0)
}
