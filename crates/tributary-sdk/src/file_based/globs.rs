//! Glob matching over object keys.
//!
//! `*` stays within one path segment and `**` spans segments, so
//! `data/*.csv` does not match `data/2024/a.csv` but `data/**/*.csv` does.

use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled set of glob patterns; a key matches if any pattern does.
#[derive(Debug, Clone)]
pub struct GlobSet {
    patterns: Vec<Pattern>,
}

impl GlobSet {
    pub fn new(globs: &[String]) -> Result<Self, glob::PatternError> {
        let patterns = globs
            .iter()
            .map(|g| Pattern::new(g))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(key, MATCH_OPTIONS))
    }
}

/// Literal text before the first wildcard of `glob`.
#[must_use]
pub fn literal_prefix(glob: &str) -> &str {
    let end = glob.find(['*', '?', '[', '{']).unwrap_or(glob.len());
    &glob[..end]
}

/// Listing prefixes that together cover every key `globs` can match.
///
/// Prefixes already covered by a shorter prefix are dropped. An empty
/// string means the whole store must be listed.
#[must_use]
pub fn listing_prefixes(globs: &[String]) -> Vec<String> {
    let mut prefixes: Vec<String> = globs.iter().map(|g| literal_prefix(g).to_string()).collect();
    prefixes.sort();
    prefixes.dedup();

    let mut minimal: Vec<String> = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        if !minimal.iter().any(|kept| prefix.starts_with(kept.as_str())) {
            minimal.push(prefix);
        }
    }
    minimal
}
