//! # Topic pattern matching.
//!
//! A subscription pattern is a plain topic string with at most one `*`
//! wildcard. The wildcard matches any run of characters at its position:
//!
//! | Pattern     | Matches                          | Does not match |
//! |-------------|----------------------------------|----------------|
//! | `note.42`   | `note.42`                        | `note.421`     |
//! | `note.*`    | `note.42`, `note.`               | `thing.42`     |
//! | `*`         | every topic                      | —              |
//! | `` (empty)  | nothing (fails closed)           | everything     |
//!
//! Matching is case-sensitive and byte-oriented; there is no segment
//! structure — `note.*` matches `note.42.saved` too.
//!
//! [`topic_matches`] is the fail-closed workhorse used on every publish.
//! [`Pattern`] is an optional validated wrapper for hosts that prefer to
//! reject malformed patterns at subscription-setup time instead.

use std::fmt;
use std::sync::Arc;

use crate::error::PatternError;

/// The single supported wildcard character.
pub const WILDCARD: char = '*';

/// Tests a concrete topic against a subscription pattern.
///
/// Pure and total: `O(len(topic) + len(pattern))`, no allocation, never
/// panics. Malformed patterns (empty, more than one wildcard) fail closed
/// and match nothing.
///
/// # Example
/// ```
/// use topicbus::topic_matches;
///
/// assert!(topic_matches("note.42", "note.*"));
/// assert!(topic_matches("note.42", "*"));
/// assert!(topic_matches("note.42", "note.42"));
/// assert!(!topic_matches("thing.42", "note.*"));
/// assert!(!topic_matches("note.42", ""));
/// ```
pub fn topic_matches(topic: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    match pattern.split_once(WILDCARD) {
        // No wildcard: exact, case-sensitive equality.
        None => topic == pattern,
        Some((prefix, suffix)) => {
            if suffix.contains(WILDCARD) {
                // Two or more wildcards: malformed, fail closed.
                return false;
            }
            topic.len() >= prefix.len() + suffix.len()
                && topic.starts_with(prefix)
                && topic.ends_with(suffix)
        }
    }
}

/// A validated subscription pattern.
///
/// The bus accepts raw `&str` patterns and relies on fail-closed matching,
/// so `Pattern` is never required. It exists for hosts that would rather
/// surface a typo like `"note.*.*"` as an error when the subscription is
/// configured than debug a subscriber that silently receives nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern(Arc<str>);

impl Pattern {
    /// Validates and wraps a pattern string.
    ///
    /// # Errors
    /// - [`PatternError::Empty`] for `""`.
    /// - [`PatternError::MultipleWildcards`] when more than one `*` occurs.
    ///
    /// # Example
    /// ```
    /// use topicbus::{Pattern, PatternError};
    ///
    /// let p = Pattern::new("note.*").unwrap();
    /// assert!(p.matches("note.42"));
    ///
    /// assert_eq!(Pattern::new(""), Err(PatternError::Empty));
    /// ```
    pub fn new(pattern: impl AsRef<str>) -> Result<Self, PatternError> {
        let pattern = pattern.as_ref();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        let wildcards = pattern.matches(WILDCARD).count();
        if wildcards > 1 {
            return Err(PatternError::MultipleWildcards { found: wildcards });
        }
        Ok(Self(Arc::from(pattern)))
    }

    /// The pattern as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tests a topic against this pattern.
    pub fn matches(&self, topic: &str) -> bool {
        topic_matches(topic, &self.0)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_without_wildcard() {
        assert!(topic_matches("note.42", "note.42"));
        assert!(!topic_matches("note.42", "note.421"));
        assert!(!topic_matches("note.421", "note.42"));
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        assert!(!topic_matches("Note.42", "note.42"));
    }

    #[test]
    fn test_lone_wildcard_matches_everything() {
        assert!(topic_matches("note.42", "*"));
        assert!(topic_matches("", "*"));
        assert!(topic_matches("*", "*"));
    }

    #[test]
    fn test_trailing_wildcard_matches_any_suffix() {
        assert!(topic_matches("note.42", "note.*"));
        assert!(topic_matches("note.", "note.*"));
        assert!(topic_matches("note.42.saved", "note.*"));
        assert!(!topic_matches("note", "note.*"));
        assert!(!topic_matches("thing.42", "note.*"));
    }

    #[test]
    fn test_embedded_wildcard_matches_middle() {
        assert!(topic_matches("note.42.saved", "note.*.saved"));
        assert!(topic_matches("note..saved", "note.*.saved"));
        assert!(!topic_matches("note.42.deleted", "note.*.saved"));
        // Prefix and suffix may not overlap the same bytes.
        assert!(!topic_matches("note.saved", "note.*.saved"));
    }

    #[test]
    fn test_empty_pattern_fails_closed() {
        assert!(!topic_matches("", ""));
        assert!(!topic_matches("note.42", ""));
    }

    #[test]
    fn test_multiple_wildcards_fail_closed() {
        assert!(!topic_matches("note.42.saved", "note.*.*"));
        assert!(!topic_matches("anything", "**"));
    }

    #[test]
    fn test_pattern_validation() {
        assert!(Pattern::new("note.*").is_ok());
        assert!(Pattern::new("note.42").is_ok());
        assert!(Pattern::new("*").is_ok());
        assert_eq!(Pattern::new(""), Err(PatternError::Empty));
        assert_eq!(
            Pattern::new("*.*"),
            Err(PatternError::MultipleWildcards { found: 2 })
        );
    }

    #[test]
    fn test_pattern_matches_delegates() {
        let p = Pattern::new("thing.*").unwrap();
        assert!(p.matches("thing.1"));
        assert!(!p.matches("note.1"));
        assert_eq!(p.as_str(), "thing.*");
    }
}
