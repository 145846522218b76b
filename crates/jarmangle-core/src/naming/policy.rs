//! Skip patterns that exempt libraries from renaming.

use crate::error::Error;
use regex::Regex;
use tracing::{debug, warn};

/// Immutable set of compiled skip patterns.
///
/// Each pattern must match the whole base name. Patterns that fail to compile
/// are dropped and kept as recoverable errors in [`RenamePolicy::rejected`].
#[derive(Debug, Default)]
pub struct RenamePolicy {
    patterns: Vec<Regex>,
    sources: Vec<String>,
    rejected: Vec<Error>,
}

impl RenamePolicy {
    /// A policy that renames every library
    pub fn rename_all() -> Self {
        Self::default()
    }

    /// Compiles `patterns`, dropping any that are malformed
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Regex::new(&format!("^(?:{})$", pattern)) {
                Ok(compiled) => {
                    debug!("Compiled skip pattern: {}", pattern);
                    policy.patterns.push(compiled);
                    policy.sources.push(pattern.to_string());
                }
                Err(e) => {
                    let error = Error::invalid_pattern(pattern, e);
                    warn!("Dropping skip pattern: {}", error);
                    policy.rejected.push(error);
                }
            }
        }

        policy
    }

    /// True if `base_name` fully matches any active pattern
    pub fn should_skip(&self, base_name: &str) -> bool {
        match self
            .patterns
            .iter()
            .position(|pattern| pattern.is_match(base_name))
        {
            Some(index) => {
                debug!(
                    "File '{}' matches skip pattern: {}",
                    base_name, self.sources[index]
                );
                true
            }
            None => false,
        }
    }

    /// The patterns that compiled, as supplied
    pub fn active_patterns(&self) -> &[String] {
        &self.sources
    }

    /// Patterns dropped at construction
    pub fn rejected(&self) -> &[Error] {
        &self.rejected
    }

    /// True when no pattern is active
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
