//! Per-session state: the resolved chain, satisfied capabilities with
//! evidence, and the blocked-intent set, persisted one JSON file per
//! session under the workspace state directory.

mod state;
mod store;

pub use state::{CapabilityEvidence, SessionPhase, SessionState};
pub use store::{CURRENT_SESSION_FILE, SESSION_ID_ENV, SessionStore, STATE_DIR};
