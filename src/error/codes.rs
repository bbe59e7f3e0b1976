//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Catalog errors
//! - 2xx: Resolution errors
//! - 3xx: Config errors
//! - 4xx: Session errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `ProfileNotFound` -> E102).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Catalog errors (1xx)
    // ========================================
    /// E101: Requested skill was not found in the catalog
    SkillNotFound,
    /// E102: Requested profile was not found in the catalog
    ProfileNotFound,
    /// E103: Catalog file is malformed or fails validation
    CatalogInvalid,

    // ========================================
    // Resolution errors (2xx)
    // ========================================
    /// E201: Two selected skills declare mutual incompatibility
    SkillConflict,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,

    // ========================================
    // Session errors (4xx)
    // ========================================
    /// E401: Session id does not exist in the state directory
    SessionNotFound,
    /// E402: No current session pointer is set
    NoActiveSession,
    /// E403: Failed to acquire the state-directory lock
    LockFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Serialization/deserialization failed
    SerializationError,
    /// E902: IO operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `ProfileNotFound` -> 102).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::SkillNotFound => 101,
            Self::ProfileNotFound => 102,
            Self::CatalogInvalid => 103,
            Self::SkillConflict => 201,
            Self::ConfigInvalid => 301,
            Self::SessionNotFound => 401,
            Self::NoActiveSession => 402,
            Self::LockFailed => 403,
            Self::SerializationError => 901,
            Self::IoError => 902,
        }
    }

    /// Get the error code as a formatted string (e.g., "E102").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::SkillNotFound => {
                "Check the skills catalog for the exact name, or add the skill to .claude/skills.yaml"
            }
            Self::ProfileNotFound => {
                "Run `sc resolve --help` to see how profiles are named, or add the profile to .claude/profiles.yaml"
            }
            Self::CatalogInvalid => {
                "Fix the reported catalog entry; `sc resolve <profile>` will re-validate on the next run"
            }
            Self::SkillConflict => {
                "Remove one of the conflicting skills from the profile, or resolve with --no-fail-fast to skip it"
            }
            Self::ConfigInvalid => "Check .claude/chain.toml for syntax errors",
            Self::SessionNotFound => "Run `sc sessions list` to see known session ids",
            Self::NoActiveSession => "Run `sc activate <profile>` to start a session",
            Self::LockFailed => "Another sc process holds the state lock; retry once it exits",
            Self::SerializationError => "The file being read is malformed; regenerate it or clear the session",
            Self::IoError => "Check filesystem permissions for the workspace .claude directory",
        }
    }

    /// Whether this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SerializationError | Self::IoError)
    }

    /// Error category (e.g., "catalog", "session").
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::SkillNotFound | Self::ProfileNotFound | Self::CatalogInvalid => "catalog",
            Self::SkillConflict => "resolution",
            Self::ConfigInvalid => "config",
            Self::SessionNotFound | Self::NoActiveSession | Self::LockFailed => "session",
            Self::SerializationError | Self::IoError => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
