//! Application context: config, catalogs, store, and telemetry wired once
//! per process.

use std::path::{Path, PathBuf};

use crate::activation::Activator;
use crate::catalog::{
    Profile, ProfilesCatalog, SkillsCatalog, load_profiles, load_skills,
};
use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::gate::Gate;
use crate::matcher::PatternMatcher;
use crate::session::SessionStore;
use crate::telemetry::UsageLog;

/// Everything a command needs, loaded once.
pub struct AppContext {
    pub workspace: PathBuf,
    pub config: Config,
    pub skills: SkillsCatalog,
    pub profiles: ProfilesCatalog,
    pub store: SessionStore,
    pub usage: UsageLog,
    pub matcher: PatternMatcher,
    pub activator: Activator,
}

impl AppContext {
    /// Build a context from CLI globals.
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let workspace = match &cli.workspace {
            Some(path) => path.clone(),
            None => std::env::current_dir()?,
        };
        Self::load(workspace, cli.config.as_deref())
    }

    /// Build a context for a workspace.
    pub fn load(workspace: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path, &workspace)?;

        let skills = load_skills(&workspace.join(&config.catalogs.skills))?;
        let profiles = load_profiles(&workspace.join(&config.catalogs.profiles))?;
        let store = SessionStore::new(workspace.join(&config.state.dir));
        let usage = UsageLog::for_workspace(&workspace, config.telemetry.enabled);

        tracing::debug!(
            workspace = %workspace.display(),
            skills = skills.skills.len(),
            profiles = profiles.profiles.len(),
            "context loaded"
        );

        Ok(Self {
            workspace,
            config,
            skills,
            profiles,
            store,
            usage,
            matcher: PatternMatcher,
            activator: Activator::new(),
        })
    }

    /// The enforcement gate over this context.
    #[must_use]
    pub fn gate(&self) -> Gate<'_> {
        Gate::new(
            &self.skills,
            &self.profiles,
            &self.store,
            &self.usage,
            &self.matcher,
            &self.activator,
        )
    }

    /// Look up a profile by name.
    pub fn find_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ChainError::ProfileNotFound(name.to_string()))
    }
}
