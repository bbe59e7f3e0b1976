//! Session activation.
//!
//! Resolving a profile and persisting the fresh session is one operation
//! here, with replay protection: activation requests may carry a
//! `request_id`, and a repeated id returns the original session instead of
//! creating a new one.

use chrono::Utc;
use lru::LruCache;
use parking_lot::Mutex;

use crate::catalog::{ProfilesCatalog, SkillsCatalog};
use crate::error::{ChainError, Result};
use crate::resolver::{ResolveOptions, resolve};
use crate::session::{SessionState, SessionStore};
use crate::telemetry::{UsageEvent, UsageLog};

const REQUEST_CACHE_SIZE: usize = 256;

/// Options for one activation request.
#[derive(Debug, Clone, Default)]
pub struct ActivationOptions {
    /// Replay key: the same id always returns the same session.
    pub request_id: Option<String>,
    /// Passed through to the resolver.
    pub resolve: ResolveOptions,
    /// Whether the gate triggered this activation (telemetry only).
    pub auto_activated: bool,
}

/// Outcome of an activation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ActivationResult {
    pub session_id: String,
    pub profile: String,
    pub chain: Vec<String>,
    pub warnings: Vec<String>,
    /// False when this result replays an earlier request.
    pub is_new: bool,
    /// True when a request_id replay short-circuited the activation.
    pub idempotent: bool,
}

/// Activates sessions; holds the request-replay cache.
pub struct Activator {
    requests: Mutex<LruCache<String, String>>,
}

impl Activator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(LruCache::new(
                std::num::NonZeroUsize::new(REQUEST_CACHE_SIZE).expect("nonzero cache size"),
            )),
        }
    }

    /// Resolve `profile_name` and create a session for it.
    ///
    /// Unsatisfiable capabilities surface as warnings on the result, not
    /// errors; the session is still created (callers inspect warnings).
    /// A replayed `request_id` returns the original session with
    /// `is_new=false, idempotent=true`.
    pub fn activate(
        &self,
        profile_name: &str,
        skills: &SkillsCatalog,
        profiles: &ProfilesCatalog,
        store: &SessionStore,
        usage: &UsageLog,
        options: &ActivationOptions,
    ) -> Result<ActivationResult> {
        if let Some(request_id) = &options.request_id {
            let replayed = self.requests.lock().get(request_id).cloned();
            if let Some(session_id) = replayed {
                if let Some(state) = store.load(&session_id) {
                    tracing::debug!(%request_id, %session_id, "replaying activation");
                    return Ok(ActivationResult {
                        session_id: state.session_id,
                        profile: state.profile_id,
                        chain: state.chain,
                        warnings: Vec::new(),
                        is_new: false,
                        idempotent: true,
                    });
                }
                // Session file was cleared since; fall through and
                // activate fresh under the same request id.
            }
        }

        let profile = profiles
            .profiles
            .iter()
            .find(|p| p.name == profile_name)
            .ok_or_else(|| ChainError::ProfileNotFound(profile_name.to_string()))?;

        let resolution = resolve(profile, &skills.skills, options.resolve)?;
        let state = SessionState::new(profile, &resolution);
        store.create(&state)?;

        usage.record(&UsageEvent::Activation {
            session_id: state.session_id.clone(),
            timestamp: Utc::now(),
            profile: profile.name.clone(),
            chain: state.chain.clone(),
            auto_activated: options.auto_activated,
        });

        if let Some(request_id) = &options.request_id {
            self.requests
                .lock()
                .put(request_id.clone(), state.session_id.clone());
        }

        Ok(ActivationResult {
            session_id: state.session_id,
            profile: profile.name.clone(),
            chain: resolution.chain,
            warnings: resolution.warnings,
            is_new: true,
            idempotent: false,
        })
    }
}

impl Default for Activator {
    fn default() -> Self {
        Self::new()
    }
}
