//! Error handling for skillchain.
//!
//! This module provides:
//! - [`ChainError`]: The main error enum for all sc operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//!
//! Operational faults (unsatisfiable capabilities, cycles, corrupt session
//! files) are surfaced as warnings or `None` returns per the enforcement
//! contract; only faults that make an operation impossible become errors.

mod codes;

use std::io;

use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for skillchain operations.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Skill \"{skill}\" conflicts with selected skill \"{other}\"")]
    SkillConflict { skill: String, other: String },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Unknown intent \"{intent}\" in tool_policy of skill \"{skill}\"")]
    UnknownIntent { skill: String, intent: String },

    #[error("Lock failed: {0}")]
    LockFailed(String),
}

impl ChainError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::CatalogInvalid(_) | Self::UnknownIntent { .. } => ErrorCode::CatalogInvalid,
            Self::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            Self::SkillNotFound(_) => ErrorCode::SkillNotFound,
            Self::SkillConflict { .. } => ErrorCode::SkillConflict,
            Self::SessionNotFound(_) => ErrorCode::SessionNotFound,
            Self::NoActiveSession => ErrorCode::NoActiveSession,
            Self::LockFailed(_) => ErrorCode::LockFailed,
        }
    }
}

/// Result type alias using ChainError.
pub type Result<T> = std::result::Result<T, ChainError>;
