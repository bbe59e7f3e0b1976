//! sc hook - Claude Code hook entry points.
//!
//! `sc hook pre-tool-use` reads the hook payload JSON on stdin, runs the
//! gate, and writes the hook response JSON on stdout. It always exits 0:
//! a crashing hook must not take the agent down, so even a malformed
//! payload degrades to an allow.

use std::io::Read;

use clap::{Args, Subcommand};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppContext;
use crate::error::Result;
use crate::gate::{CheckOptions, ToolInvocation};

#[derive(Args, Debug)]
pub struct HookArgs {
    #[command(subcommand)]
    pub event: HookEvent,
}

#[derive(Subcommand, Debug)]
pub enum HookEvent {
    /// Arbitrate a proposed tool invocation
    PreToolUse,
}

/// Payload delivered by Claude Code on stdin.
#[derive(Debug, Deserialize)]
struct HookPayload {
    tool_name: String,
    #[serde(default)]
    tool_input: Value,
    /// Prompt that triggered the tool call, when available.
    #[serde(default)]
    prompt: Option<String>,
}

pub fn run(ctx: &AppContext, args: &HookArgs) -> Result<u8> {
    match args.event {
        HookEvent::PreToolUse => pre_tool_use(ctx),
    }
}

fn pre_tool_use(ctx: &AppContext) -> Result<u8> {
    let mut raw = String::new();
    if std::io::stdin().read_to_string(&mut raw).is_err() {
        emit(true, None);
        return Ok(0);
    }

    let payload: HookPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(%err, "malformed hook payload, allowing");
            emit(true, None);
            return Ok(0);
        }
    };

    let invocation = ToolInvocation {
        tool_name: payload.tool_name,
        tool_input: payload.tool_input,
    };
    let options = CheckOptions {
        prompt: payload.prompt,
        auto_select: ctx.config.gate.auto_select,
    };
    let decision = ctx.gate().check(&invocation, &options);

    emit(decision.allowed, decision.message);
    Ok(0)
}

/// Write the PreToolUse hook response JSON.
fn emit(allowed: bool, reason: Option<String>) {
    let decision = if allowed { "allow" } else { "deny" };
    let mut output = serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": "PreToolUse",
            "permissionDecision": decision,
        }
    });
    if let Some(reason) = reason {
        output["hookSpecificOutput"]["permissionDecisionReason"] = Value::String(reason);
    }
    println!("{output}");
}
