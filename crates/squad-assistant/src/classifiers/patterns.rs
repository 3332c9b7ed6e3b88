//! Generic "first match wins" scanner shared by the cascading classifiers.
//!
//! Each classifier declares its precedence as an ordered list of
//! `(pattern, tag)` pairs instead of duplicating the scan loop, so rules like
//! personal-before-admin stay visible as data.

use regex::Regex;

/// A named, ordered list of `(pattern, tag)` pairs.
pub struct PatternSet<T: Copy> {
    name: &'static str,
    patterns: Vec<(Regex, T)>,
}

impl<T: Copy> PatternSet<T> {
    pub fn new(name: &'static str, pairs: Vec<(&str, T)>) -> Self {
        let patterns = pairs
            .into_iter()
            .filter_map(|(source, tag)| match Regex::new(source) {
                Ok(regex) => Some((regex, tag)),
                Err(e) => {
                    tracing::error!("Invalid pattern in set '{}': {}", name, e);
                    None
                }
            })
            .collect();
        Self { name, patterns }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Scan in declaration order; the first matching pattern's tag wins.
    pub fn first_match(&self, input: &str) -> Option<T> {
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(input))
            .map(|(_, tag)| *tag)
    }

    pub fn matches(&self, input: &str) -> bool {
        self.first_match(input).is_some()
    }
}
