//! Filename pattern matching.
//!
//! Decides which schema reference governs a concrete filename: the first
//! pattern (in declaration order) that matches the entire filename wins,
//! otherwise the profile's fallback applies. The dataset-root schema is
//! requested by passing no filename at all.

use regex::{Regex, RegexBuilder};

use super::error::ConfigurationError;
use super::{Profile, SchemaRef};

/// Compiled pattern list of one profile.
///
/// Compilation happens once at profile load, so a malformed pattern is a
/// [`ConfigurationError`] at startup and never a per-request failure.
pub struct PatternMatcher {
    root_schema: SchemaRef,
    fallback_schema: SchemaRef,
    patterns: Vec<(Regex, SchemaRef)>,
}

impl PatternMatcher {
    pub fn compile(profile: &Profile, case_insensitive: bool) -> Result<Self, ConfigurationError> {
        let mut patterns = Vec::with_capacity(profile.patterns.len());
        for entry in &profile.patterns {
            let regex = compile_pattern(&entry.pattern, case_insensitive)?;
            patterns.push((regex, entry.use_schema.clone()));
        }
        Ok(Self {
            root_schema: profile.root_schema.clone(),
            fallback_schema: profile.fallback_schema.clone(),
            patterns,
        })
    }

    /// Return the schema reference applicable to a filename.
    ///
    /// `None` requests the dataset-root schema; patterns are never consulted
    /// for it. Pure and infallible.
    pub fn schema_name_for(&self, filename: Option<&str>) -> &SchemaRef {
        let filename = match filename {
            Some(filename) => filename,
            None => return &self.root_schema,
        };
        for (regex, use_schema) in &self.patterns {
            if regex.is_match(filename) {
                return use_schema;
            }
        }
        &self.fallback_schema
    }
}

/// Anchor a pattern at both ends: it must match the whole filename, not a
/// substring somewhere in the path.
fn compile_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex, ConfigurationError> {
    RegexBuilder::new(&format!(r"\A(?:{})\z", pattern))
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
