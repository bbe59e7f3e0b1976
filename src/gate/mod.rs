//! The enforcement gate: the synchronous allow/deny arbiter consulted on
//! every tool invocation (Claude Code's PreToolUse hook).
//!
//! The gate is total and read-only: it never throws for operational
//! faults and never writes session state. Evidence delivery (which
//! unblocks intents) is the session store's job; two concurrent checks on
//! one session are safe.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::activation::{ActivationOptions, Activator};
use crate::catalog::{ProfilesCatalog, Skill, SkillsCatalog, Strictness, Tier};
use crate::intent::{Intent, classify};
use crate::matcher::ProfileMatcher;
use crate::session::{SessionState, SessionStore};
use crate::telemetry::{UsageEvent, UsageLog};

/// A proposed tool invocation, as delivered by the hook.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
}

/// Options for one gate check.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Prompt that triggered the tool call; enables auto-activation.
    pub prompt: Option<String>,
    /// Allow auto-activation when no session exists.
    pub auto_select: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            prompt: None,
            auto_select: true,
        }
    }
}

/// One intent the gate would deny right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedIntentReport {
    pub intent: Intent,
    /// Denial reason, verbatim from the catalog.
    pub reason: String,
    /// Capability whose satisfaction releases the intent.
    pub capability: String,
    /// Skill enforcing the rule.
    pub skill: Option<String>,
}

/// Gate verdict.
#[derive(Debug, Clone, Serialize)]
pub struct GateDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_intents: Vec<BlockedIntentReport>,
    pub auto_activated: bool,
}

impl GateDecision {
    fn allow(message: Option<String>, auto_activated: bool) -> Self {
        Self {
            allowed: true,
            message,
            blocked_intents: Vec::new(),
            auto_activated,
        }
    }
}

/// The decision point. Holds only transient references; all state lives in
/// the store and the catalogs.
pub struct Gate<'a> {
    skills: &'a SkillsCatalog,
    profiles: &'a ProfilesCatalog,
    store: &'a SessionStore,
    usage: &'a UsageLog,
    matcher: &'a dyn ProfileMatcher,
    activator: &'a Activator,
}

impl<'a> Gate<'a> {
    #[must_use]
    pub fn new(
        skills: &'a SkillsCatalog,
        profiles: &'a ProfilesCatalog,
        store: &'a SessionStore,
        usage: &'a UsageLog,
        matcher: &'a dyn ProfileMatcher,
        activator: &'a Activator,
    ) -> Self {
        Self {
            skills,
            profiles,
            store,
            usage,
            matcher,
            activator,
        }
    }

    /// Check a proposed tool invocation against current session state.
    #[must_use]
    pub fn check(&self, invocation: &ToolInvocation, options: &CheckOptions) -> GateDecision {
        let mut auto_activated = false;
        let mut session = self.store.load_current();

        if session.is_none() && options.auto_select {
            if let Some(prompt) = options.prompt.as_deref() {
                session = self.auto_activate(prompt);
                auto_activated = session.is_some();
            }
        }

        let Some(session) = session else {
            return GateDecision::allow(None, false);
        };

        let intents = classify(&invocation.tool_name, &invocation.tool_input);
        let mut blocked = self.blocked_reports(&session, &intents);

        // Tier filter under the current skill.
        let current = session.current_skill(&self.skills.skills);
        let tier = current.as_ref().map_or(Tier::None, |(s, _)| s.tier);
        match tier {
            Tier::None => blocked.clear(),
            Tier::Soft => blocked.retain(|b| b.intent.is_high_impact()),
            Tier::Hard => {}
        }

        let decision = self.decide(&session, current, blocked, auto_activated);
        self.usage.record(&UsageEvent::Decision {
            session_id: session.session_id.clone(),
            timestamp: Utc::now(),
            tool: invocation.tool_name.clone(),
            intents,
            allowed: decision.allowed,
        });
        decision
    }

    /// Intersect the invocation's intents with the session's blocked set,
    /// then release every intent whose unblocking capability already has
    /// evidence.
    fn blocked_reports(
        &self,
        session: &SessionState,
        intents: &[Intent],
    ) -> Vec<BlockedIntentReport> {
        let mut reports = Vec::new();
        for intent in intents {
            let Some(reason) = session.blocked_intents.get(intent.as_str()) else {
                continue;
            };
            let rule = self.deny_rule(session, intent);
            let capability = rule.as_ref().map(|(_, until)| until.clone());
            if let Some(cap) = &capability {
                if session.is_satisfied(cap) {
                    continue; // evidence released this intent
                }
            }
            reports.push(BlockedIntentReport {
                intent: *intent,
                reason: reason.clone(),
                capability: capability.unwrap_or_default(),
                skill: rule.map(|(skill, _)| skill),
            });
        }
        reports
    }

    /// First chain skill gating `intent`, with its unblocking capability.
    fn deny_rule(&self, session: &SessionState, intent: &Intent) -> Option<(String, String)> {
        session.chain.iter().find_map(|name| {
            self.skills
                .skills
                .iter()
                .find(|s| s.name == *name)
                .and_then(|s| s.tool_policy.deny_until.get(intent.as_str()))
                .map(|rule| (name.clone(), rule.until.clone()))
        })
    }

    fn decide(
        &self,
        session: &SessionState,
        current: Option<(&Skill, String)>,
        blocked: Vec<BlockedIntentReport>,
        auto_activated: bool,
    ) -> GateDecision {
        let guidance = Self::guidance(session, current.as_ref());

        if blocked.is_empty() {
            return GateDecision::allow(Some(guidance), auto_activated);
        }

        match session.strictness {
            Strictness::Permissive => GateDecision::allow(None, auto_activated),
            Strictness::Advisory => {
                let message = format!(
                    "[chain] advisory: {}\n{guidance}",
                    Self::denial_lines(&blocked, current.as_ref())
                );
                GateDecision {
                    allowed: true,
                    message: Some(message),
                    blocked_intents: blocked,
                    auto_activated,
                }
            }
            Strictness::Strict => {
                for report in &blocked {
                    self.usage.record(&UsageEvent::Block {
                        session_id: session.session_id.clone(),
                        timestamp: Utc::now(),
                        intent: report.intent,
                        reason: report.reason.clone(),
                        capability: report.capability.clone(),
                    });
                }
                let message = format!(
                    "{}\n{guidance}",
                    Self::denial_lines(&blocked, current.as_ref())
                );
                GateDecision {
                    allowed: false,
                    message: Some(message),
                    blocked_intents: blocked,
                    auto_activated,
                }
            }
        }
    }

    fn denial_lines(blocked: &[BlockedIntentReport], current: Option<&(&Skill, String)>) -> String {
        let current_name = current.map_or("-", |(s, _)| s.name.as_str());
        blocked
            .iter()
            .map(|b| {
                format!(
                    "[chain] BLOCKED: {} - {} (unblocks after: {}; current skill: {})",
                    b.intent, b.reason, b.capability, current_name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Progress line shown on every allow and appended to every denial.
    fn guidance(session: &SessionState, current: Option<&(&Skill, String)>) -> String {
        let total = session.capabilities_required.len();
        let satisfied = session.satisfied_count();
        let pct = if total == 0 {
            100
        } else {
            satisfied * 100 / total
        };

        match current {
            Some((skill, capability)) => format!(
                "[chain] {}: {satisfied}/{total} ({pct}%) - CURRENT: {} (need: {capability})\n→ Skill(skill: \"{}\")",
                session.profile_id, skill.name, skill.name
            ),
            None if session.is_complete() => format!(
                "[chain] {}: {satisfied}/{total} ({pct}%) - COMPLETE",
                session.profile_id
            ),
            None => format!(
                "[chain] {}: {satisfied}/{total} ({pct}%)",
                session.profile_id
            ),
        }
    }

    /// No session: let the prompt pick a profile and activate it.
    fn auto_activate(&self, prompt: &str) -> Option<SessionState> {
        if self.profiles.profiles.is_empty() {
            return None;
        }
        let profile = self.matcher.match_profile(prompt, self.profiles)?;
        let options = ActivationOptions {
            auto_activated: true,
            ..Default::default()
        };
        match self.activator.activate(
            &profile.name,
            self.skills,
            self.profiles,
            self.store,
            self.usage,
            &options,
        ) {
            Ok(result) => {
                tracing::info!(profile = %profile.name, session_id = %result.session_id, "auto-activated");
                self.store.load(&result.session_id)
            }
            Err(err) => {
                tracing::warn!(%err, profile = %profile.name, "auto-activation failed");
                None
            }
        }
    }
}
