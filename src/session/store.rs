//! On-disk session store.
//!
//! Layout: a workspace-rooted state directory holding one pretty-printed
//! JSON file per session plus a `current_session` pointer file with the
//! active UUID. `CLAUDE_SESSION_ID` in the environment overrides the
//! pointer. Every save goes through a temp-file rename, so a reader never
//! observes a partial file; mutations additionally serialize through an
//! fs2 advisory lock within the workspace.

use std::fs::File;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::catalog::Skill;
use crate::error::{ChainError, Result};
use crate::session::state::{CapabilityEvidence, SessionState};
use crate::utils::fs::{ensure_dir, read_optional, write_atomic};

/// Default state directory, relative to the workspace root.
pub const STATE_DIR: &str = ".claude/chain_state";

/// Pointer file holding the active session id.
pub const CURRENT_SESSION_FILE: &str = "current_session";

/// Environment override for the active session id.
pub const SESSION_ID_ENV: &str = "CLAUDE_SESSION_ID";

/// Store rooted at a state directory; exclusively owns the files in it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
    env_override: bool,
}

impl SessionStore {
    /// Store over an explicit state directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            env_override: true,
        }
    }

    /// Ignore `CLAUDE_SESSION_ID`; the pointer file alone names the active
    /// session. Used by tests and tools that must not inherit the caller's
    /// session.
    #[must_use]
    pub fn without_env_override(mut self) -> Self {
        self.env_override = false;
        self
    }

    /// Store at the default location under a workspace.
    #[must_use]
    pub fn for_workspace(workspace: &Path) -> Self {
        Self::new(workspace.join(STATE_DIR))
    }

    /// The state directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn pointer_path(&self) -> PathBuf {
        self.root.join(CURRENT_SESSION_FILE)
    }

    /// Acquire the store's advisory lock. Held for the duration of a
    /// mutation; released on drop.
    fn lock(&self) -> Result<File> {
        ensure_dir(&self.root)?;
        let file = File::create(self.root.join(".lock"))?;
        file.lock_exclusive()
            .map_err(|err| ChainError::LockFailed(err.to_string()))?;
        Ok(file)
    }

    /// Persist a new session and point `current_session` at it.
    pub fn create(&self, state: &SessionState) -> Result<()> {
        let _guard = self.lock()?;
        self.write_state(state)?;
        write_atomic(self.pointer_path(), &state.session_id)?;
        tracing::info!(session_id = %state.session_id, profile = %state.profile_id, "session created");
        Ok(())
    }

    /// Overwrite an existing session file.
    pub fn save(&self, state: &SessionState) -> Result<()> {
        let _guard = self.lock()?;
        self.write_state(state)
    }

    fn write_state(&self, state: &SessionState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(self.session_path(&state.session_id), &json)
    }

    /// Load a session by id. Read, parse, or validation failures all read
    /// as absent; a corrupt session never takes the engine down.
    #[must_use]
    pub fn load(&self, id: &str) -> Option<SessionState> {
        let path = self.session_path(id);
        let raw = read_optional(&path).ok().flatten()?;
        match serde_json::from_str::<SessionState>(&raw) {
            Ok(state) => Some(state),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "corrupt session file, treating as absent");
                None
            }
        }
    }

    /// The active session id: `CLAUDE_SESSION_ID` when set, else the
    /// pointer file.
    #[must_use]
    pub fn current_session_id(&self) -> Option<String> {
        let env_value = if self.env_override {
            std::env::var(SESSION_ID_ENV).ok()
        } else {
            None
        };
        Self::pick_current(env_value, read_optional(self.pointer_path()).ok().flatten())
    }

    fn pick_current(env_value: Option<String>, pointer: Option<String>) -> Option<String> {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or(pointer)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Load the active session.
    #[must_use]
    pub fn load_current(&self) -> Option<SessionState> {
        self.load(&self.current_session_id()?)
    }

    /// Delete a session file. Returns whether a file was removed.
    pub fn clear(&self, id: &str) -> Result<bool> {
        let _guard = self.lock()?;
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        // Drop a dangling pointer too.
        if read_optional(self.pointer_path())?.is_some_and(|p| p.trim() == id) {
            let _ = std::fs::remove_file(self.pointer_path());
        }
        Ok(true)
    }

    /// Delete the active session.
    pub fn clear_current(&self) -> Result<bool> {
        match self.current_session_id() {
            Some(id) => self.clear(&id),
            None => Ok(false),
        }
    }

    /// Known session ids, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".json").map(String::from)
            })
            .collect();
        ids.sort();
        ids
    }

    /// Record evidence for a capability. Idempotent: if the capability
    /// already has evidence, the first record wins and the call still
    /// succeeds. Recomputes `current_skill_index` against the catalog
    /// before saving.
    pub fn satisfy_capability(
        &self,
        id: &str,
        evidence: CapabilityEvidence,
        skills: &[Skill],
    ) -> Result<bool> {
        let _guard = self.lock()?;
        let Some(mut state) = self.load(id) else {
            return Ok(false);
        };
        let appended = state.record_evidence(evidence);
        if appended {
            state.recompute_current_index(skills);
            self.write_state(&state)?;
        }
        Ok(true)
    }

    /// Whether a capability has evidence in a session.
    #[must_use]
    pub fn is_capability_satisfied(&self, id: &str, capability: &str) -> bool {
        self.load(id).is_some_and(|s| s.is_satisfied(capability))
    }

    /// Required capabilities without evidence, preserving profile order.
    #[must_use]
    pub fn unsatisfied_capabilities(&self, id: &str) -> Vec<String> {
        self.load(id)
            .map(|s| s.unsatisfied_capabilities())
            .unwrap_or_default()
    }

    /// The session's current skill and the capability it is working
    /// toward.
    #[must_use]
    pub fn current_skill(&self, id: &str, skills: &[Skill]) -> Option<(Skill, String)> {
        let state = self.load(id)?;
        state
            .current_skill(skills)
            .map(|(skill, cap)| (skill.clone(), cap))
    }
}
