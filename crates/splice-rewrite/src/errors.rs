//! Error types for pattern construction and registration.

use derive_more::{Display, From};
use splice_ir::ParseError;

/// Definitional error raised while building a [`crate::Pattern`].
#[derive(Clone, Debug, Display, PartialEq)]
pub enum PatternError {
    #[display("pattern `{pattern}` has an empty target sequence")]
    EmptyTarget { pattern: String },
}

impl std::error::Error for PatternError {}

#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum RewriteError {
    #[display("{_0}")]
    #[from]
    Pattern(PatternError),

    #[display(
        "patterns `{first}` and `{second}` can complete with equal length at the same position"
    )]
    AmbiguousPatterns { first: String, second: String },

    #[display("{_0}")]
    #[from]
    Parse(ParseError),
}

impl RewriteError {
    pub fn ambiguous(first: impl Into<String>, second: impl Into<String>) -> Self {
        RewriteError::AmbiguousPatterns {
            first: first.into(),
            second: second.into(),
        }
    }
}

impl std::error::Error for RewriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RewriteError::Pattern(e) => Some(e),
            RewriteError::Parse(e) => Some(e),
            RewriteError::AmbiguousPatterns { .. } => None,
        }
    }
}
