//! Deterministic profile resolution.
//!
//! Given a profile and the skill catalog, select an ordered chain of
//! skills whose combined `provides` covers the profile's required
//! capabilities. Selection is a recursive walk over required capabilities;
//! ties between eligible providers break on (risk, cost, name). The
//! finished chain is re-ordered by the capability graph's topological sort.
//!
//! Operational failures (no provider, unbreakable require chains) become
//! warnings, never errors; the only hard failure is a skill conflict under
//! `fail_fast`.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{Profile, Skill};
use crate::error::{ChainError, Result};
use crate::graph::{CapabilityGraph, compare_skills};

/// Recursion ceiling for pathological catalogs. The `visiting` set already
/// fails require cycles; this bounds deep non-cyclic chains.
const MAX_DEPTH: usize = 100;

/// Options controlling resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Fail the whole resolution on a skill conflict instead of skipping
    /// the conflicting provider with a warning.
    pub fail_fast: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

/// Why a skill was selected into the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub skill: String,
    pub reason: String,
    pub provides: Vec<String>,
    pub requires: Vec<String>,
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Selected skills in topological order.
    pub chain: Vec<String>,
    /// Per-skill selection reasons, aligned with `chain`.
    pub explanations: Vec<Explanation>,
    /// Intent name -> reason, merged first-wins across the chain.
    pub blocked_intents: BTreeMap<String, String>,
    /// Ordered warnings; non-empty means the chain is partial or degraded.
    pub warnings: Vec<String>,
}

/// Resolve a profile against the skill catalog.
pub fn resolve(
    profile: &Profile,
    skills: &[Skill],
    options: ResolveOptions,
) -> Result<ResolutionResult> {
    let mut resolver = Resolver::new(skills, options.fail_fast);

    for cap in &profile.capabilities_required {
        if !resolver.satisfy(cap, 0)? {
            resolver
                .warnings
                .push(format!("Unable to satisfy required capability \"{cap}\""));
        }
    }

    Ok(resolver.finish())
}

struct Resolver<'a> {
    by_name: HashMap<&'a str, &'a Skill>,
    /// capability -> providers, preserving input order within a capability.
    providers: HashMap<&'a str, Vec<&'a Skill>>,
    fail_fast: bool,
    selected: Vec<&'a Skill>,
    satisfied: HashSet<String>,
    /// Capabilities on the current recursion path. A re-entrant request
    /// means the require chain cannot be broken.
    visiting: HashSet<String>,
    chain: Vec<String>,
    explanations: Vec<Explanation>,
    blocked_intents: BTreeMap<String, String>,
    warnings: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(skills: &'a [Skill], fail_fast: bool) -> Self {
        let by_name = skills.iter().map(|s| (s.name.as_str(), s)).collect();
        let mut providers: HashMap<&str, Vec<&Skill>> = HashMap::new();
        for skill in skills {
            for cap in &skill.provides {
                providers.entry(cap.as_str()).or_default().push(skill);
            }
        }
        Self {
            by_name,
            providers,
            fail_fast,
            selected: Vec::new(),
            satisfied: HashSet::new(),
            visiting: HashSet::new(),
            chain: Vec::new(),
            explanations: Vec::new(),
            blocked_intents: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|s| s.name == name)
    }

    /// Ensure `cap` is satisfied, selecting providers as needed. Returns
    /// false when the capability cannot be satisfied; hard-fails only on a
    /// conflict under `fail_fast`.
    fn satisfy(&mut self, cap: &str, depth: usize) -> Result<bool> {
        if depth > MAX_DEPTH {
            self.warnings.push(format!(
                "Maximum resolution depth exceeded while satisfying capability \"{cap}\""
            ));
            return Ok(false);
        }
        if self.satisfied.contains(cap) {
            return Ok(true);
        }
        if self.visiting.contains(cap) {
            return Ok(false);
        }

        let candidates: Vec<&Skill> = self.providers.get(cap).cloned().unwrap_or_default();
        if candidates.is_empty() {
            self.warnings
                .push(format!("No skill provides capability \"{cap}\""));
            return Ok(false);
        }

        self.visiting.insert(cap.to_string());
        let mut survivors: Vec<&Skill> = Vec::new();

        'candidates: for candidate in candidates {
            if self.is_selected(&candidate.name) {
                continue;
            }

            for req in &candidate.requires {
                if !self.satisfy(req, depth + 1)? {
                    continue 'candidates;
                }
            }

            for other in self.selected.clone() {
                if candidate.conflicts_with(other) {
                    if self.fail_fast {
                        self.visiting.remove(cap);
                        return Err(ChainError::SkillConflict {
                            skill: candidate.name.clone(),
                            other: other.name.clone(),
                        });
                    }
                    self.warnings.push(format!(
                        "Skill \"{}\" conflicts with selected skill \"{}\"; skipping",
                        candidate.name, other.name
                    ));
                    continue 'candidates;
                }
            }

            survivors.push(candidate);
        }

        self.visiting.remove(cap);

        let Some(&chosen) = survivors
            .iter()
            .min_by(|a, b| compare_skills(a, b))
        else {
            return Ok(false);
        };

        self.select(chosen, cap);
        Ok(true)
    }

    fn select(&mut self, skill: &'a Skill, cap: &str) {
        tracing::debug!(skill = %skill.name, capability = %cap, "selected provider");
        self.selected.push(skill);
        self.chain.push(skill.name.clone());
        self.explanations.push(Explanation {
            skill: skill.name.clone(),
            reason: format!("Provides \"{cap}\""),
            provides: skill.provides.clone(),
            requires: skill.requires.clone(),
        });
        for (intent, rule) in &skill.tool_policy.deny_until {
            self.blocked_intents
                .entry(intent.clone())
                .or_insert_with(|| rule.reason.clone());
        }
        for provided in &skill.provides {
            self.satisfied.insert(provided.clone());
        }
    }

    /// Topologically reorder the chosen chain; on a cycle, keep selection
    /// order and warn.
    fn finish(mut self) -> ResolutionResult {
        let chosen: Vec<Skill> = self
            .chain
            .iter()
            .filter_map(|name| self.by_name.get(name.as_str()).map(|&s| s.clone()))
            .collect();
        let graph = CapabilityGraph::new(&chosen);

        if let Some(sorted) = graph.topological_sort() {
            let by_skill: HashMap<String, Explanation> = self
                .explanations
                .into_iter()
                .map(|e| (e.skill.clone(), e))
                .collect();
            self.explanations = sorted
                .iter()
                .filter_map(|name| by_skill.get(name).cloned())
                .collect();
            self.chain = sorted;
        } else {
            self.warnings
                .push("Cycle detected in resolved chain".to_string());
        }

        ResolutionResult {
            chain: self.chain,
            explanations: self.explanations,
            blocked_intents: self.blocked_intents,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Cost, DenyRule, Risk};
    use crate::test_utils::{profile, skill};

    #[test]
    fn linear_chain_with_blocked_intents() {
        let mut tdd = skill("tdd", &["test_written", "test_green"]);
        tdd.tool_policy.deny_until.insert(
            "write_impl".to_string(),
            DenyRule {
                until: "test_written".to_string(),
                reason: "Write test first".to_string(),
            },
        );
        tdd.tool_policy.deny_until.insert(
            "commit".to_string(),
            DenyRule {
                until: "test_green".to_string(),
                reason: "Tests must pass".to_string(),
            },
        );
        let mut docs = skill("doc-maintenance", &["docs_updated"]);
        docs.requires = vec!["test_green".to_string()];

        let result = resolve(
            &profile("bug-fix", &["test_written", "test_green"]),
            &[tdd, docs],
            ResolveOptions::default(),
        )
        .unwrap();

        assert_eq!(result.chain, vec!["tdd"]);
        assert_eq!(result.blocked_intents["write_impl"], "Write test first");
        assert_eq!(result.blocked_intents["commit"], "Tests must pass");
        assert!(result.warnings.is_empty());
        assert_eq!(result.explanations[0].reason, "Provides \"test_written\"");
    }

    #[test]
    fn alphabetical_tie_break() {
        let alpha = skill("alpha", &["a"]);
        let zebra = skill("zebra", &["a"]);
        let result = resolve(
            &profile("p", &["a"]),
            &[zebra, alpha],
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.chain, vec!["alpha"]);
    }

    #[test]
    fn cost_tie_break() {
        let mut high = skill("high-cost", &["a"]);
        high.cost = Cost::High;
        let low = skill("low-cost", &["a"]);
        let result = resolve(
            &profile("p", &["a"]),
            &[high, low],
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.chain, vec!["low-cost"]);
    }

    #[test]
    fn risk_outranks_cost() {
        let mut risky_cheap = skill("risky-cheap", &["a"]);
        risky_cheap.risk = Risk::High;
        let mut safe_dear = skill("safe-dear", &["a"]);
        safe_dear.cost = Cost::High;
        let result = resolve(
            &profile("p", &["a"]),
            &[risky_cheap, safe_dear],
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.chain, vec!["safe-dear"]);
    }

    #[test]
    fn conflict_fails_fast() {
        let mut a = skill("A", &["x"]);
        a.conflicts = vec!["B".to_string()];
        let b = skill("B", &["y"]);
        let err = resolve(
            &profile("p", &["x", "y"]),
            &[a, b],
            ResolveOptions { fail_fast: true },
        )
        .unwrap_err();
        assert!(matches!(err, ChainError::SkillConflict { .. }));
    }

    #[test]
    fn conflict_skips_and_warns_without_fail_fast() {
        let mut a = skill("A", &["x"]);
        a.conflicts = vec!["B".to_string()];
        let b = skill("B", &["y"]);
        let result = resolve(
            &profile("p", &["x", "y"]),
            &[a, b],
            ResolveOptions { fail_fast: false },
        )
        .unwrap();
        assert_eq!(result.chain, vec!["A"]);
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.contains("conflicts with selected skill"))
        );
    }

    #[test]
    fn mutual_require_cycle_warns_once_and_selects_nothing() {
        let mut a = skill("A", &["a"]);
        a.requires = vec!["b".to_string()];
        let mut b = skill("B", &["b"]);
        b.requires = vec!["a".to_string()];
        let result = resolve(
            &profile("p", &["a"]),
            &[a, b],
            ResolveOptions::default(),
        )
        .unwrap();
        assert!(result.chain.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Unable to satisfy required capability \"a\""]
        );
    }

    #[test]
    fn missing_provider_warns_root_and_provider_level() {
        let mut a = skill("A", &["x"]);
        a.requires = vec!["ghost".to_string()];
        let result = resolve(&profile("p", &["x"]), &[a], ResolveOptions::default()).unwrap();
        assert!(result.chain.is_empty());
        assert_eq!(
            result.warnings,
            vec![
                "No skill provides capability \"ghost\"".to_string(),
                "Unable to satisfy required capability \"x\"".to_string(),
            ]
        );
    }

    #[test]
    fn transitive_requirement_pulls_in_provider_in_topological_order() {
        let mut deploy = skill("deploy", &["deployed"]);
        deploy.requires = vec!["built".to_string()];
        let build = skill("build", &["built"]);
        let result = resolve(
            &profile("ship", &["deployed"]),
            &[deploy, build],
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.chain, vec!["build", "deploy"]);
        // explanations stay aligned with the re-ordered chain
        assert_eq!(result.explanations[0].skill, "build");
        assert_eq!(result.explanations[1].skill, "deploy");
    }

    #[test]
    fn deny_until_collision_keeps_first_reason() {
        let mut first = skill("a-first", &["x"]);
        first.tool_policy.deny_until.insert(
            "commit".to_string(),
            DenyRule {
                until: "x".to_string(),
                reason: "first reason".to_string(),
            },
        );
        let mut second = skill("b-second", &["y"]);
        second.tool_policy.deny_until.insert(
            "commit".to_string(),
            DenyRule {
                until: "y".to_string(),
                reason: "second reason".to_string(),
            },
        );
        let result = resolve(
            &profile("p", &["x", "y"]),
            &[first, second],
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.blocked_intents["commit"], "first reason");
    }

    #[test]
    fn resolution_is_deterministic_across_runs() {
        let skills = vec![
            skill("gamma", &["c"]),
            skill("beta", &["b", "c"]),
            skill("alpha", &["a"]),
        ];
        let p = profile("p", &["a", "b", "c"]);
        let first = resolve(&p, &skills, ResolveOptions::default()).unwrap();
        let second = resolve(&p, &skills, ResolveOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn already_selected_provider_is_not_duplicated() {
        let multi = skill("multi", &["a", "b"]);
        let result = resolve(
            &profile("p", &["a", "b"]),
            &[multi],
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.chain, vec!["multi"]);
        assert_eq!(result.explanations.len(), 1);
    }
}
