//! Engine configuration.
//!
//! Defaults, overlaid by an optional TOML file at
//! `<workspace>/.claude/chain.toml` (or an explicit `--config` path, or
//! `SC_CONFIG`), then by `SC_*` environment variables. Relative paths are
//! resolved against the workspace root by the app context.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};

/// Default config file location, relative to the workspace.
pub const CONFIG_FILE: &str = ".claude/chain.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalogs: CatalogsConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalogs: CatalogsConfig::default(),
            state: StateConfig::default(),
            telemetry: TelemetryConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

/// Catalog file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogsConfig {
    pub skills: PathBuf,
    pub profiles: PathBuf,
}

impl Default for CatalogsConfig {
    fn default() -> Self {
        Self {
            skills: PathBuf::from(".claude/skills.yaml"),
            profiles: PathBuf::from(".claude/profiles.yaml"),
        }
    }
}

/// Session state directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    pub dir: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(crate::session::STATE_DIR),
        }
    }
}

/// Usage telemetry switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Gate behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Auto-activate a profile from the prompt when no session exists.
    pub auto_select: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { auto_select: true }
    }
}

impl Config {
    /// Load config for a workspace. An explicit path (flag or `SC_CONFIG`)
    /// is used alone; otherwise the global config is merged first, then
    /// the workspace one, then `SC_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>, workspace: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SC_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(dir) = dirs::config_dir() {
                if let Some(patch) = Self::load_patch(&dir.join("sc/config.toml"))? {
                    config.merge_patch(patch);
                }
            }
            if let Some(patch) = Self::load_patch(&workspace.join(CONFIG_FILE))? {
                config.merge_patch(patch);
            }
        }
        config.apply_env_overrides();

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        let Some(raw) = crate::utils::fs::read_optional(path)? else {
            return Ok(None);
        };
        let patch = toml::from_str(&raw)
            .map_err(|err| ChainError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalogs) = patch.catalogs {
            if let Some(skills) = catalogs.skills {
                self.catalogs.skills = skills;
            }
            if let Some(profiles) = catalogs.profiles {
                self.catalogs.profiles = profiles;
            }
        }
        if let Some(state) = patch.state {
            if let Some(dir) = state.dir {
                self.state.dir = dir;
            }
        }
        if let Some(telemetry) = patch.telemetry {
            if let Some(enabled) = telemetry.enabled {
                self.telemetry.enabled = enabled;
            }
        }
        if let Some(gate) = patch.gate {
            if let Some(auto_select) = gate.auto_select {
                self.gate.auto_select = auto_select;
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SC_SKILLS_CATALOG") {
            self.catalogs.skills = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("SC_PROFILES_CATALOG") {
            self.catalogs.profiles = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("SC_STATE_DIR") {
            self.state.dir = PathBuf::from(dir);
        }
        if std::env::var("SC_TELEMETRY_DISABLED").is_ok_and(|v| v != "0" && !v.is_empty()) {
            self.telemetry.enabled = false;
        }
    }
}

/// Partial config as read from disk; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    catalogs: Option<CatalogsPatch>,
    state: Option<StatePatch>,
    telemetry: Option<TelemetryPatch>,
    gate: Option<GatePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogsPatch {
    skills: Option<PathBuf>,
    profiles: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StatePatch {
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TelemetryPatch {
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GatePatch {
    auto_select: Option<bool>,
}
