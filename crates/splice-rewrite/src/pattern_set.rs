//! Ordered pattern registration.

use std::sync::Arc;

use splice_ir::Token;
use tracing::debug;

use crate::engine::Rewrite;
use crate::errors::RewriteError;
use crate::pattern::Pattern;

/// How to treat patterns that could complete on the same span with equal
/// length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Accept them. At runtime the earliest-registered pattern wins and a
    /// warning is logged.
    #[default]
    FirstRegistered,
    /// Refuse to register a pattern that is ambiguous with an earlier one.
    Reject,
}

/// An ordered, immutable-during-a-pass list of patterns.
///
/// The set holds pattern definitions only. Each call to [`PatternSet::rewrite`]
/// builds its own trackers, so one set can drive any number of rewrites,
/// including on different threads.
///
/// # Example
///
/// ```
/// use splice_ir::{parse_listing, print_listing};
/// use splice_rewrite::{Pattern, PatternSet, TargetMatcher};
///
/// let pattern = Pattern::new(
///     "drop-clamp",
///     vec![TargetMatcher::new("ldc.i4"), TargetMatcher::new("call")],
///     vec![],
/// )
/// .unwrap();
/// let patterns = PatternSet::new().add_pattern(pattern);
///
/// let body = parse_listing("ldarg.1\nldc.i4 180\ncall method MyUtils::GetClampInt\nret\n").unwrap();
/// let output: Vec<_> = patterns.rewrite(body).collect();
/// assert_eq!(print_listing(&output), "ldarg.1\nnop\nret\n");
/// ```
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Arc<Pattern>>,
    policy: AmbiguityPolicy,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ambiguity policy applied by [`PatternSet::try_add_pattern`].
    pub fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> AmbiguityPolicy {
        self.policy
    }

    /// Add a pattern unconditionally.
    pub fn add_pattern(mut self, pattern: impl Into<Arc<Pattern>>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add a pattern, honouring the ambiguity policy.
    ///
    /// # Errors
    ///
    /// Under [`AmbiguityPolicy::Reject`], returns
    /// [`RewriteError::AmbiguousPatterns`] if `pattern` could complete on the
    /// same span as an already registered pattern.
    pub fn try_add_pattern(self, pattern: impl Into<Arc<Pattern>>) -> Result<Self, RewriteError> {
        let pattern = pattern.into();
        if self.policy == AmbiguityPolicy::Reject {
            if let Some(existing) = self.patterns.iter().find(|p| p.is_ambiguous_with(&pattern)) {
                return Err(RewriteError::ambiguous(existing.name(), pattern.name()));
            }
        }
        Ok(self.add_pattern(pattern))
    }

    /// Build a set from patterns in registration order.
    pub fn try_from_patterns(
        policy: AmbiguityPolicy,
        patterns: impl IntoIterator<Item = Pattern>,
    ) -> Result<Self, RewriteError> {
        patterns
            .into_iter()
            .try_fold(Self::new().with_policy(policy), |set, pattern| {
                set.try_add_pattern(pattern)
            })
    }

    pub fn patterns(&self) -> &[Arc<Pattern>] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Start a rewrite of one token sequence.
    ///
    /// The returned iterator consumes `input` lazily, in order, exactly once.
    pub fn rewrite<I>(&self, input: I) -> Rewrite<I::IntoIter>
    where
        I: IntoIterator<Item = Token>,
    {
        debug!(patterns = self.patterns.len(), "starting rewrite");
        Rewrite::new(input.into_iter(), &self.patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::TargetMatcher;

    fn pattern(name: &str, target: Vec<TargetMatcher>) -> Pattern {
        Pattern::new(name, target, vec![]).unwrap()
    }

    #[test]
    fn test_registration_order_is_kept() {
        let set = PatternSet::new()
            .add_pattern(pattern("a", vec![TargetMatcher::new("pop")]))
            .add_pattern(pattern("b", vec![TargetMatcher::new("dup")]));
        let names: Vec<_> = set.patterns().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_default_policy_accepts_ambiguous_patterns() {
        let set = PatternSet::new()
            .try_add_pattern(pattern("a", vec![TargetMatcher::new("pop")]))
            .and_then(|set| set.try_add_pattern(pattern("b", vec![TargetMatcher::new("pop")])))
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_reject_policy_refuses_ambiguous_pattern() {
        let err = PatternSet::try_from_patterns(
            AmbiguityPolicy::Reject,
            [
                pattern("clamp", vec![TargetMatcher::new("ldc.i4").with_operand(180)]),
                pattern("any-ldc", vec![TargetMatcher::new("ldc.i4")]),
            ],
        )
        .unwrap_err();
        assert_eq!(err, RewriteError::ambiguous("clamp", "any-ldc"));
    }

    #[test]
    fn test_reject_policy_accepts_distinct_patterns() {
        let set = PatternSet::try_from_patterns(
            AmbiguityPolicy::Reject,
            [
                pattern("clamp", vec![TargetMatcher::new("ldc.i4").with_operand(180)]),
                pattern("min", vec![TargetMatcher::new("ldc.i4").with_operand(90)]),
                pattern(
                    "pair",
                    vec![TargetMatcher::new("ldc.i4"), TargetMatcher::new("call")],
                ),
            ],
        )
        .unwrap();
        assert_eq!(set.len(), 3);
    }
}
