//! Usage telemetry.
//!
//! Append-only JSONL sink at `<workspace>/.chain-usage.jsonl`. Telemetry
//! must never break enforcement: write failures are logged and swallowed.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::intent::Intent;

/// Telemetry file name, relative to the workspace root.
pub const USAGE_FILE: &str = ".chain-usage.jsonl";

/// One usage record. Every kind carries `type`, `session_id` and an
/// ISO-8601 UTC `timestamp` on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UsageEvent {
    Activation {
        session_id: String,
        timestamp: DateTime<Utc>,
        profile: String,
        chain: Vec<String>,
        auto_activated: bool,
    },
    Decision {
        session_id: String,
        timestamp: DateTime<Utc>,
        tool: String,
        intents: Vec<Intent>,
        allowed: bool,
    },
    Block {
        session_id: String,
        timestamp: DateTime<Utc>,
        intent: Intent,
        reason: String,
        capability: String,
    },
    Retry {
        session_id: String,
        timestamp: DateTime<Utc>,
        intent: Intent,
    },
    Completion {
        session_id: String,
        timestamp: DateTime<Utc>,
        profile: String,
        capabilities_satisfied: usize,
    },
}

/// JSONL appender.
#[derive(Debug, Clone)]
pub struct UsageLog {
    path: PathBuf,
    enabled: bool,
}

impl UsageLog {
    /// Sink at the default location under a workspace.
    #[must_use]
    pub fn for_workspace(workspace: &Path, enabled: bool) -> Self {
        Self {
            path: workspace.join(USAGE_FILE),
            enabled,
        }
    }

    /// A sink that drops everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
        }
    }

    /// Append one event. Failures are logged at warn and swallowed.
    pub fn record(&self, event: &UsageEvent) {
        if !self.enabled {
            return;
        }
        if let Err(err) = self.append(event) {
            tracing::warn!(path = %self.path.display(), %err, "failed to write usage event");
        }
    }

    fn append(&self, event: &UsageEvent) -> std::io::Result<()> {
        let mut line = serde_json::to_string(event)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        line.push('\n');
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}
