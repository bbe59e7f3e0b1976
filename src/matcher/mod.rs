//! Prompt-to-profile matching.
//!
//! Used only when the gate runs with no session: the prompt that triggered
//! the tool call picks the profile to auto-activate. The trait is the seam
//! for richer (semantic) matchers; the shipped implementation scores
//! literal/regex patterns.

use regex::RegexBuilder;

use crate::catalog::{Profile, ProfilesCatalog};

/// Chooses a profile for a free-form prompt.
pub trait ProfileMatcher {
    /// Pick the best-matching profile, or `None` when nothing applies.
    fn match_profile<'a>(&self, prompt: &str, catalog: &'a ProfilesCatalog)
    -> Option<&'a Profile>;
}

/// Pattern-count scorer.
///
/// Each profile scores one point per `match` pattern that hits the prompt;
/// a pattern is tried as a case-insensitive regex and falls back to a
/// case-insensitive substring when it does not compile. The highest score
/// wins; ties break on higher `priority`, then lexicographic name. With no
/// scoring profile, the catalog's `default_profile` applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    fn score(prompt: &str, profile: &Profile) -> usize {
        profile
            .match_patterns
            .iter()
            .filter(|pattern| Self::pattern_hits(prompt, pattern))
            .count()
    }

    fn pattern_hits(prompt: &str, pattern: &str) -> bool {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_or_else(
                |_| prompt.to_lowercase().contains(&pattern.to_lowercase()),
                |re| re.is_match(prompt),
            )
    }
}

impl ProfileMatcher for PatternMatcher {
    fn match_profile<'a>(
        &self,
        prompt: &str,
        catalog: &'a ProfilesCatalog,
    ) -> Option<&'a Profile> {
        let best = catalog
            .profiles
            .iter()
            .map(|p| (Self::score(prompt, p), p))
            .filter(|(score, _)| *score > 0)
            .max_by(|(sa, a), (sb, b)| {
                sa.cmp(sb)
                    .then_with(|| a.priority.cmp(&b.priority))
                    // Lexicographically smaller name wins the final tie, so
                    // it must compare as the max here.
                    .then_with(|| b.name.cmp(&a.name))
            })
            .map(|(_, p)| p);

        best.or_else(|| {
            let default = catalog.default_profile.as_deref()?;
            catalog.profiles.iter().find(|p| p.name == default)
        })
    }
}
