//! Catalog data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Risk level of running a skill. Totally ordered, low to critical.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Cost of running a skill. Totally ordered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Low,
    #[default]
    Medium,
    High,
}

/// Enforcement strength while a skill is the current skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// All blocked intents are enforced.
    #[default]
    Hard,
    /// Only high-impact intents are enforced.
    Soft,
    /// Nothing is enforced.
    None,
}

/// Per-profile denial surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Violations are denied.
    Strict,
    /// Violations are allowed with a warning.
    #[default]
    Advisory,
    /// Everything is allowed.
    Permissive,
}

/// Gate rule: deny an intent until a capability is satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyRule {
    /// Capability whose satisfaction releases the intent.
    pub until: String,
    /// Reason shown verbatim in denial messages.
    pub reason: String,
}

/// Tool-gating policy of a skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPolicy {
    /// Intent name -> deny rule. BTreeMap keeps exported iteration sorted.
    #[serde(default)]
    pub deny_until: BTreeMap<String, DenyRule>,
}

/// How a piece of capability evidence was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    FileExists,
    MarkerFound,
    CommandSuccess,
    Manual,
}

/// Evidence descriptor attached to a skill or a profile's completion
/// requirements. The engine core treats these as opaque; the probe runner
/// interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Capability this artifact proves when present.
    pub capability: String,
    /// Probe kind.
    pub kind: EvidenceType,
    /// Workspace-relative glob (file_exists, marker_found).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Literal marker to search for (marker_found).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Shell command whose success proves the capability (command_success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// A unit of capability provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier.
    pub name: String,
    /// Path to the skill's implementation (opaque to the engine).
    #[serde(default)]
    pub skill_path: String,
    /// Capabilities produced when this skill's work completes.
    #[serde(default)]
    pub provides: Vec<String>,
    /// Capabilities that must be satisfied before this skill is selectable.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Skill names that cannot co-exist with this one in a chain.
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub risk: Risk,
    #[serde(default)]
    pub cost: Cost,
    #[serde(default)]
    pub tier: Tier,
    /// Evidence descriptors consumed by the probe runner.
    #[serde(default)]
    pub artifacts: Vec<ArtifactSpec>,
    #[serde(default)]
    pub tool_policy: ToolPolicy,
}

impl Skill {
    /// Whether this skill produces the given capability.
    #[must_use]
    pub fn provides_capability(&self, capability: &str) -> bool {
        self.provides.iter().any(|c| c == capability)
    }

    /// Bidirectional conflict check.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.conflicts.iter().any(|c| c == &other.name)
            || other.conflicts.iter().any(|c| c == &self.name)
    }
}

/// A workflow request: capabilities demanded in order, plus matching and
/// enforcement metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Patterns used by the prompt matcher (regex or literal).
    #[serde(default, rename = "match")]
    pub match_patterns: Vec<String>,
    /// Ordered list; order controls tie-break-neutral traversal.
    #[serde(default)]
    pub capabilities_required: Vec<String>,
    #[serde(default)]
    pub strictness: Strictness,
    /// Evidence descriptors that declare the workflow done.
    #[serde(default)]
    pub completion_requirements: Vec<ArtifactSpec>,
    /// Higher wins ties during prompt matching.
    #[serde(default)]
    pub priority: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_and_cost_are_totally_ordered() {
        assert!(Risk::Low < Risk::Medium);
        assert!(Risk::Medium < Risk::High);
        assert!(Risk::High < Risk::Critical);
        assert!(Cost::Low < Cost::Medium);
        assert!(Cost::Medium < Cost::High);
    }

    #[test]
    fn defaults_match_catalog_schema() {
        assert_eq!(Risk::default(), Risk::Medium);
        assert_eq!(Cost::default(), Cost::Medium);
        assert_eq!(Tier::default(), Tier::Hard);
        assert_eq!(Strictness::default(), Strictness::Advisory);
    }

    #[test]
    fn conflict_check_is_bidirectional() {
        let a = Skill {
            name: "a".into(),
            skill_path: String::new(),
            provides: vec![],
            requires: vec![],
            conflicts: vec!["b".into()],
            risk: Risk::default(),
            cost: Cost::default(),
            tier: Tier::default(),
            artifacts: vec![],
            tool_policy: ToolPolicy::default(),
        };
        let mut b = a.clone();
        b.name = "b".into();
        b.conflicts = vec![];

        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
    }

    #[test]
    fn evidence_type_wire_names() {
        let json = serde_json::to_string(&EvidenceType::FileExists).unwrap();
        assert_eq!(json, "\"file_exists\"");
        let json = serde_json::to_string(&EvidenceType::CommandSuccess).unwrap();
        assert_eq!(json, "\"command_success\"");
    }
}
