//! Error types used by the bus.
//!
//! The bus API itself is infallible by design: registration never fails,
//! publishing to zero subscribers is a no-op, and malformed patterns fail
//! closed (they never match) instead of raising. The only error surface is
//! [`PatternError`], returned by the opt-in [`Pattern`](crate::Pattern)
//! validator for hosts that want malformed patterns rejected up-front.

use thiserror::Error;

/// # Errors produced by pattern validation.
///
/// Raised only by [`Pattern::new`](crate::Pattern::new). The matcher itself
/// ([`topic_matches`](crate::topic_matches)) never raises; it treats these
/// same shapes as "matches nothing".
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern string was empty.
    #[error("empty pattern matches nothing")]
    Empty,

    /// The pattern contained more than one wildcard.
    #[error("pattern contains {found} wildcards; at most one is supported")]
    MultipleWildcards {
        /// Number of `*` characters found.
        found: usize,
    },
}

impl PatternError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use topicbus::PatternError;
    ///
    /// assert_eq!(PatternError::Empty.as_label(), "pattern_empty");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PatternError::Empty => "pattern_empty",
            PatternError::MultipleWildcards { .. } => "pattern_multiple_wildcards",
        }
    }
}
