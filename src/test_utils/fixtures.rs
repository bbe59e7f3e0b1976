//! Catalog builders and an isolated workspace fixture.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::catalog::{Cost, Profile, Risk, Skill, Strictness, Tier, ToolPolicy};

/// Build a low-risk, low-cost skill providing the given capabilities.
#[must_use]
pub fn skill(name: &str, provides: &[&str]) -> Skill {
    Skill {
        name: name.to_string(),
        skill_path: format!("skills/{name}"),
        provides: provides.iter().map(|&c| c.to_string()).collect(),
        requires: Vec::new(),
        conflicts: Vec::new(),
        risk: Risk::Low,
        cost: Cost::Low,
        tier: Tier::Hard,
        artifacts: Vec::new(),
        tool_policy: ToolPolicy::default(),
    }
}

/// Build an advisory profile requiring the given capabilities in order.
#[must_use]
pub fn profile(name: &str, capabilities: &[&str]) -> Profile {
    Profile {
        name: name.to_string(),
        description: String::new(),
        match_patterns: Vec::new(),
        capabilities_required: capabilities.iter().map(|&c| c.to_string()).collect(),
        strictness: Strictness::Advisory,
        completion_requirements: Vec::new(),
        priority: 0,
    }
}

/// Isolated workspace rooted in a temp directory.
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp workspace"),
        }
    }

    /// Workspace root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file relative to the workspace root, creating parents.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// Write the skills catalog to its default location.
    pub fn write_skills_yaml(&self, contents: &str) -> PathBuf {
        self.write(".claude/skills.yaml", contents)
    }

    /// Write the profiles catalog to its default location.
    pub fn write_profiles_yaml(&self, contents: &str) -> PathBuf {
        self.write(".claude/profiles.yaml", contents)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
