//! YAML catalog loading and validation.
//!
//! An absent catalog file is an empty catalog (a workspace without
//! skillchain set up gates nothing); a malformed or invalid one is a hard
//! error, and the process refuses to operate on it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::types::{Profile, Skill};
use crate::error::{ChainError, Result};
use crate::intent::Intent;

/// Top-level skills catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsCatalog {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// Top-level profiles catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesCatalog {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub default_profile: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Load and validate the skills catalog.
pub fn load_skills(path: &Path) -> Result<SkillsCatalog> {
    let Some(raw) = crate::utils::fs::read_optional(path)? else {
        tracing::debug!(path = %path.display(), "skills catalog absent, using empty catalog");
        return Ok(SkillsCatalog::default());
    };
    let catalog: SkillsCatalog = serde_yaml::from_str(&raw)
        .map_err(|err| ChainError::CatalogInvalid(format!("{}: {err}", path.display())))?;
    validate_skills(&catalog.skills)?;
    Ok(catalog)
}

/// Load and validate the profiles catalog.
pub fn load_profiles(path: &Path) -> Result<ProfilesCatalog> {
    let Some(raw) = crate::utils::fs::read_optional(path)? else {
        tracing::debug!(path = %path.display(), "profiles catalog absent, using empty catalog");
        return Ok(ProfilesCatalog::default());
    };
    let catalog: ProfilesCatalog = serde_yaml::from_str(&raw)
        .map_err(|err| ChainError::CatalogInvalid(format!("{}: {err}", path.display())))?;
    validate_profiles(&catalog)?;
    Ok(catalog)
}

fn validate_skills(skills: &[Skill]) -> Result<()> {
    let mut seen = HashSet::new();
    for skill in skills {
        if skill.name.is_empty() {
            return Err(ChainError::CatalogInvalid(
                "skill with empty name".to_string(),
            ));
        }
        if !seen.insert(skill.name.as_str()) {
            return Err(ChainError::CatalogInvalid(format!(
                "duplicate skill name \"{}\"",
                skill.name
            )));
        }
        for (intent, rule) in &skill.tool_policy.deny_until {
            if Intent::from_name(intent).is_none() {
                return Err(ChainError::UnknownIntent {
                    skill: skill.name.clone(),
                    intent: intent.clone(),
                });
            }
            if rule.until.is_empty() {
                return Err(ChainError::CatalogInvalid(format!(
                    "skill \"{}\": deny_until.{intent} has an empty \"until\" capability",
                    skill.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_profiles(catalog: &ProfilesCatalog) -> Result<()> {
    let mut seen = HashSet::new();
    for profile in &catalog.profiles {
        if profile.name.is_empty() {
            return Err(ChainError::CatalogInvalid(
                "profile with empty name".to_string(),
            ));
        }
        if !seen.insert(profile.name.as_str()) {
            return Err(ChainError::CatalogInvalid(format!(
                "duplicate profile name \"{}\"",
                profile.name
            )));
        }
    }
    if let Some(default) = &catalog.default_profile {
        if !seen.contains(default.as_str()) {
            return Err(ChainError::CatalogInvalid(format!(
                "default_profile \"{default}\" is not a listed profile"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{Risk, Strictness, Tier};

    fn write_temp(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.yaml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_full_skill_entry() {
        let (_dir, path) = write_temp(
            r#"
version: "1.0"
skills:
  - name: tdd
    skill_path: skills/tdd
    provides: [test_written, test_green]
    risk: low
    cost: low
    tier: hard
    tool_policy:
      deny_until:
        write_impl:
          until: test_written
          reason: Write test first
        commit:
          until: test_green
          reason: Tests must pass
"#,
        );
        let catalog = load_skills(&path).unwrap();
        assert_eq!(catalog.version, "1.0");
        assert_eq!(catalog.skills.len(), 1);

        let tdd = &catalog.skills[0];
        assert_eq!(tdd.provides, vec!["test_written", "test_green"]);
        assert_eq!(tdd.risk, Risk::Low);
        assert_eq!(tdd.tier, Tier::Hard);
        assert_eq!(
            tdd.tool_policy.deny_until["write_impl"].reason,
            "Write test first"
        );
    }

    #[test]
    fn defaults_apply_to_sparse_entry() {
        let (_dir, path) = write_temp("skills:\n  - name: bare\n");
        let catalog = load_skills(&path).unwrap();
        let bare = &catalog.skills[0];
        assert_eq!(bare.risk, Risk::Medium);
        assert_eq!(bare.tier, Tier::Hard);
        assert!(bare.provides.is_empty());
        assert!(bare.tool_policy.deny_until.is_empty());
    }

    #[test]
    fn absent_file_is_empty_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let catalog = load_skills(&dir.path().join("missing.yaml")).unwrap();
        assert!(catalog.skills.is_empty());
    }

    #[test]
    fn duplicate_skill_name_is_invalid() {
        let (_dir, path) = write_temp("skills:\n  - name: a\n  - name: a\n");
        let err = load_skills(&path).unwrap_err();
        assert!(err.to_string().contains("duplicate skill name"));
    }

    #[test]
    fn unknown_intent_is_invalid() {
        let (_dir, path) = write_temp(
            r#"
skills:
  - name: tdd
    tool_policy:
      deny_until:
        write_implz:
          until: test_written
          reason: typo
"#,
        );
        let err = load_skills(&path).unwrap_err();
        assert!(matches!(err, ChainError::UnknownIntent { .. }));
    }

    #[test]
    fn parses_profiles_with_defaults() {
        let (_dir, path) = write_temp(
            r#"
profiles:
  - name: bug-fix
    description: Fix a bug test-first
    match: ["fix.*bug", "regression"]
    capabilities_required: [test_written, test_green]
    strictness: strict
  - name: docs
    capabilities_required: [docs_updated]
default_profile: bug-fix
"#,
        );
        let catalog = load_profiles(&path).unwrap();
        assert_eq!(catalog.profiles.len(), 2);
        assert_eq!(catalog.profiles[0].strictness, Strictness::Strict);
        assert_eq!(catalog.profiles[1].strictness, Strictness::Advisory);
        assert_eq!(catalog.profiles[1].priority, 0);
        assert_eq!(catalog.default_profile.as_deref(), Some("bug-fix"));
    }

    #[test]
    fn default_profile_must_exist() {
        let (_dir, path) = write_temp("profiles: []\ndefault_profile: ghost\n");
        let err = load_profiles(&path).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
