//! Session state model.
//!
//! Satisfaction is monotone: `capabilities_satisfied` never shrinks, a
//! capability appears in it at most once (first evidence wins), and
//! `current_skill_index` always points at the first chain skill providing
//! an unsatisfied required capability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{EvidenceType, Profile, Skill, Strictness};
use crate::resolver::ResolutionResult;

/// Audit record binding a capability to the moment of its satisfaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityEvidence {
    pub capability: String,
    pub satisfied_at: DateTime<Utc>,
    /// Skill credited with the work.
    pub satisfied_by: String,
    pub evidence_type: EvidenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_path: Option<String>,
}

impl CapabilityEvidence {
    /// Manual evidence recorded at the current instant.
    #[must_use]
    pub fn manual(capability: impl Into<String>, satisfied_by: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            satisfied_at: Utc::now(),
            satisfied_by: satisfied_by.into(),
            evidence_type: EvidenceType::Manual,
            evidence_path: None,
        }
    }
}

/// Progress of a session through its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Working on the chain skill at this index.
    Active(usize),
    /// Every required capability is satisfied.
    Complete,
}

/// Persisted per-session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub profile_id: String,
    pub activated_at: DateTime<Utc>,
    /// Resolved chain, topologically ordered.
    pub chain: Vec<String>,
    /// Required capabilities in profile order.
    pub capabilities_required: Vec<String>,
    /// Evidence records, unique by capability.
    pub capabilities_satisfied: Vec<CapabilityEvidence>,
    pub current_skill_index: usize,
    pub strictness: Strictness,
    /// Intent name -> denial reason, from the resolution.
    pub blocked_intents: std::collections::BTreeMap<String, String>,
}

impl SessionState {
    /// Fresh session for a resolved profile. The id is always a UUIDv4.
    #[must_use]
    pub fn new(profile: &Profile, resolution: &ResolutionResult) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            profile_id: profile.name.clone(),
            activated_at: Utc::now(),
            chain: resolution.chain.clone(),
            capabilities_required: profile.capabilities_required.clone(),
            capabilities_satisfied: Vec::new(),
            current_skill_index: 0,
            strictness: profile.strictness,
            blocked_intents: resolution.blocked_intents.clone(),
        }
    }

    /// Whether a capability has evidence.
    #[must_use]
    pub fn is_satisfied(&self, capability: &str) -> bool {
        self.capabilities_satisfied
            .iter()
            .any(|e| e.capability == capability)
    }

    /// Required capabilities without evidence, in `capabilities_required`
    /// order.
    #[must_use]
    pub fn unsatisfied_capabilities(&self) -> Vec<String> {
        self.capabilities_required
            .iter()
            .filter(|c| !self.is_satisfied(c))
            .cloned()
            .collect()
    }

    /// How many required capabilities are satisfied.
    #[must_use]
    pub fn satisfied_count(&self) -> usize {
        self.capabilities_required
            .iter()
            .filter(|c| self.is_satisfied(c))
            .count()
    }

    /// Every required capability is satisfied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.capabilities_required
            .iter()
            .all(|c| self.is_satisfied(c))
    }

    /// Progress view derived from `current_skill_index`. A past-the-end
    /// index reads as complete; on a partial chain that means "nothing
    /// left this chain can do", not that every requirement is satisfied.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.current_skill_index >= self.chain.len() {
            SessionPhase::Complete
        } else {
            SessionPhase::Active(self.current_skill_index)
        }
    }

    /// First required capability without evidence.
    #[must_use]
    pub fn current_capability(&self) -> Option<&str> {
        self.capabilities_required
            .iter()
            .find(|c| !self.is_satisfied(c))
            .map(String::as_str)
    }

    /// The skill the session is currently on: the first chain skill whose
    /// `provides` contains the first unsatisfied required capability.
    #[must_use]
    pub fn current_skill<'a>(&self, skills: &'a [Skill]) -> Option<(&'a Skill, String)> {
        let capability = self.current_capability()?;
        self.chain.iter().find_map(|name| {
            skills
                .iter()
                .find(|s| s.name == *name && s.provides_capability(capability))
                .map(|s| (s, capability.to_string()))
        })
    }

    /// Append evidence unless the capability already has some (first
    /// evidence wins, including its payload). Returns whether the record
    /// was appended.
    pub fn record_evidence(&mut self, evidence: CapabilityEvidence) -> bool {
        if self.is_satisfied(&evidence.capability) {
            return false;
        }
        self.capabilities_satisfied.push(evidence);
        true
    }

    /// Re-derive `current_skill_index`: the first chain skill with an
    /// unsatisfied provided capability appearing in
    /// `capabilities_required`, or past the end when complete.
    pub fn recompute_current_index(&mut self, skills: &[Skill]) {
        self.current_skill_index = self
            .chain
            .iter()
            .position(|name| {
                skills.iter().any(|s| {
                    s.name == *name
                        && s.provides.iter().any(|cap| {
                            self.capabilities_required.contains(cap) && !self.is_satisfied(cap)
                        })
                })
            })
            .unwrap_or(self.chain.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ResolveOptions, resolve};
    use crate::test_utils::{profile, skill};

    fn fixture() -> (SessionState, Vec<Skill>) {
        let tdd = skill("tdd", &["test_written", "test_green"]);
        let mut docs = skill("doc-maintenance", &["docs_updated"]);
        docs.requires = vec!["test_green".to_string()];
        let skills = vec![tdd, docs];
        let p = profile("bug-fix", &["test_written", "test_green", "docs_updated"]);
        let resolution = resolve(&p, &skills, ResolveOptions::default()).unwrap();
        (SessionState::new(&p, &resolution), skills)
    }

    #[test]
    fn new_session_starts_at_index_zero() {
        let (state, _) = fixture();
        assert_eq!(state.current_skill_index, 0);
        assert_eq!(state.phase(), SessionPhase::Active(0));
        assert!(!state.is_complete());
        assert_eq!(state.chain, vec!["tdd", "doc-maintenance"]);
    }

    #[test]
    fn evidence_is_idempotent_first_wins() {
        let (mut state, _) = fixture();
        let mut first = CapabilityEvidence::manual("test_written", "tdd");
        first.evidence_path = Some("tests/foo.rs".to_string());
        assert!(state.record_evidence(first));
        assert!(!state.record_evidence(CapabilityEvidence::manual("test_written", "other")));

        assert_eq!(state.capabilities_satisfied.len(), 1);
        assert_eq!(state.capabilities_satisfied[0].satisfied_by, "tdd");
        assert_eq!(
            state.capabilities_satisfied[0].evidence_path.as_deref(),
            Some("tests/foo.rs")
        );
    }

    #[test]
    fn current_skill_tracks_first_unsatisfied_capability() {
        let (mut state, skills) = fixture();
        let (current, capability) = state.current_skill(&skills).unwrap();
        assert_eq!(current.name, "tdd");
        assert_eq!(capability, "test_written");

        state.record_evidence(CapabilityEvidence::manual("test_written", "tdd"));
        let (current, capability) = state.current_skill(&skills).unwrap();
        assert_eq!(current.name, "tdd");
        assert_eq!(capability, "test_green");
    }

    #[test]
    fn index_advances_when_a_skills_capabilities_are_done() {
        let (mut state, skills) = fixture();
        state.record_evidence(CapabilityEvidence::manual("test_written", "tdd"));
        state.record_evidence(CapabilityEvidence::manual("test_green", "tdd"));
        state.recompute_current_index(&skills);
        assert_eq!(state.current_skill_index, 1);
        assert_eq!(state.phase(), SessionPhase::Active(1));

        state.record_evidence(CapabilityEvidence::manual("docs_updated", "doc-maintenance"));
        state.recompute_current_index(&skills);
        assert_eq!(state.current_skill_index, 2);
        assert_eq!(state.phase(), SessionPhase::Complete);
        assert!(state.is_complete());
    }

    #[test]
    fn unsatisfied_preserves_required_order() {
        let (mut state, _) = fixture();
        state.record_evidence(CapabilityEvidence::manual("test_green", "tdd"));
        assert_eq!(
            state.unsatisfied_capabilities(),
            vec!["test_written", "docs_updated"]
        );
        assert_eq!(state.satisfied_count(), 1);
    }

    #[test]
    fn evidence_outside_required_set_does_not_complete() {
        let (mut state, skills) = fixture();
        state.record_evidence(CapabilityEvidence::manual("unrelated", "tdd"));
        state.recompute_current_index(&skills);
        assert_eq!(state.current_skill_index, 0);
        assert!(!state.is_complete());
    }

    #[test]
    fn session_ids_are_uuids() {
        let (state, _) = fixture();
        assert!(uuid::Uuid::parse_str(&state.session_id).is_ok());
    }

    #[test]
    fn state_round_trips_through_json() {
        let (mut state, _) = fixture();
        state.record_evidence(CapabilityEvidence::manual("test_written", "tdd"));
        let json = serde_json::to_string_pretty(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
