//! Evidence probes.
//!
//! Probes turn artifact descriptors into capability evidence by looking at
//! the workspace: a glob that matches, a marker found in a matched file, a
//! command that exits zero. Probe failures (unreadable files, spawn
//! errors) are logged and skipped; probing never fails an operation.

use std::path::Path;

use chrono::Utc;

use crate::catalog::{ArtifactSpec, EvidenceType, Profile, Skill};
use crate::session::{CapabilityEvidence, SessionState};

/// Evaluate one artifact spec against the workspace. Returns evidence when
/// the artifact is present. `Manual` specs never probe.
#[must_use]
pub fn evaluate(
    spec: &ArtifactSpec,
    workspace: &Path,
    satisfied_by: &str,
) -> Option<CapabilityEvidence> {
    match spec.kind {
        EvidenceType::Manual => None,
        EvidenceType::FileExists => {
            let path = first_match(spec.path.as_deref()?, workspace)?;
            Some(evidence(spec, satisfied_by, Some(path)))
        }
        EvidenceType::MarkerFound => {
            let path = find_marker(spec.path.as_deref()?, spec.marker.as_deref()?, workspace)?;
            Some(evidence(spec, satisfied_by, Some(path)))
        }
        EvidenceType::CommandSuccess => command_succeeds(spec.command.as_deref()?, workspace)
            .then(|| evidence(spec, satisfied_by, None)),
    }
}

fn evidence(
    spec: &ArtifactSpec,
    satisfied_by: &str,
    evidence_path: Option<String>,
) -> CapabilityEvidence {
    CapabilityEvidence {
        capability: spec.capability.clone(),
        satisfied_at: Utc::now(),
        satisfied_by: satisfied_by.to_string(),
        evidence_type: spec.kind,
        evidence_path,
    }
}

/// First glob match relative to the workspace, alphabetical.
fn first_match(pattern: &str, workspace: &Path) -> Option<String> {
    let full = workspace.join(pattern);
    let paths = glob::glob(&full.to_string_lossy()).ok()?;
    paths
        .filter_map(std::result::Result::ok)
        .find(|p| p.is_file())
        .map(|p| relative_display(&p, workspace))
}

/// First glob match whose contents contain the marker.
fn find_marker(pattern: &str, marker: &str, workspace: &Path) -> Option<String> {
    let full = workspace.join(pattern);
    let paths = glob::glob(&full.to_string_lossy()).ok()?;
    for path in paths.filter_map(std::result::Result::ok) {
        match std::fs::read_to_string(&path) {
            Ok(contents) if contents.contains(marker) => {
                return Some(relative_display(&path, workspace));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable probe target");
            }
        }
    }
    None
}

fn command_succeeds(command: &str, workspace: &Path) -> bool {
    match std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(workspace)
        .output()
    {
        Ok(output) => output.status.success(),
        Err(err) => {
            tracing::warn!(%command, %err, "probe command failed to spawn");
            false
        }
    }
}

fn relative_display(path: &Path, workspace: &Path) -> String {
    path.strip_prefix(workspace)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Probe the session forward: evaluate the current skill's artifacts for
/// unsatisfied capabilities, record what holds, and repeat until the chain
/// stops advancing. Profile completion requirements are probed last.
/// Returns the newly satisfied capability names; the caller persists the
/// state.
pub fn run_session_probes(
    workspace: &Path,
    state: &mut SessionState,
    skills: &[Skill],
    profile: Option<&Profile>,
) -> Vec<String> {
    let mut newly_satisfied = Vec::new();

    loop {
        let Some((skill, _)) = state.current_skill(skills) else {
            break;
        };
        let name = skill.name.clone();
        let specs: Vec<ArtifactSpec> = skill
            .artifacts
            .iter()
            .filter(|a| !state.is_satisfied(&a.capability))
            .cloned()
            .collect();

        let mut advanced = false;
        for spec in &specs {
            if state.is_satisfied(&spec.capability) {
                continue;
            }
            if let Some(evidence) = evaluate(spec, workspace, &name) {
                tracing::info!(capability = %evidence.capability, skill = %name, "probe satisfied capability");
                newly_satisfied.push(evidence.capability.clone());
                state.record_evidence(evidence);
                advanced = true;
            }
        }
        if !advanced {
            break;
        }
    }

    if let Some(profile) = profile {
        for spec in &profile.completion_requirements {
            if state.is_satisfied(&spec.capability) {
                continue;
            }
            if let Some(evidence) = evaluate(spec, workspace, "completion") {
                newly_satisfied.push(evidence.capability.clone());
                state.record_evidence(evidence);
            }
        }
    }

    state.recompute_current_index(skills);
    newly_satisfied
}
