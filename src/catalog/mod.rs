//! Skill and profile catalogs.
//!
//! The catalogs are the declarative inputs to the engine: skills declare
//! what they provide, require, conflict with, and which tool intents they
//! gate; profiles declare the capabilities a workflow demands. Both are
//! immutable after load.

mod loader;
mod types;

pub use loader::{ProfilesCatalog, SkillsCatalog, load_profiles, load_skills};
pub use types::{
    ArtifactSpec, Cost, DenyRule, EvidenceType, Profile, Risk, Skill, Strictness, Tier,
    ToolPolicy,
};
