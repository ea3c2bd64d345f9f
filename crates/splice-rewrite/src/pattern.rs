//! Replacement patterns.
//!
//! A [`Pattern`] pairs a target sequence of [`TargetMatcher`]s with the tokens
//! that replace a matched span. Patterns are immutable once built and are
//! shared between rewrites through `Arc`.

use splice_ir::{Opcode, Operand, Token};

use crate::errors::PatternError;

/// One element of a target sequence.
///
/// The opcode must be identical. When `operand` is `None` any operand
/// (including none) matches; otherwise the token's operand must be
/// semantically equal (see [`Operand::matches`]).
#[derive(Clone, Debug, PartialEq)]
pub struct TargetMatcher {
    pub opcode: Opcode,
    pub operand: Option<Operand>,
}

impl TargetMatcher {
    /// Matcher on opcode only.
    pub fn new(opcode: impl Into<Opcode>) -> Self {
        Self {
            opcode: opcode.into(),
            operand: None,
        }
    }

    pub fn with_operand(mut self, operand: impl Into<Operand>) -> Self {
        self.operand = Some(operand.into());
        self
    }

    pub fn matches(&self, token: &Token) -> bool {
        if self.opcode != token.opcode {
            return false;
        }
        match (&self.operand, &token.operand) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected.matches(actual),
            (Some(_), None) => false,
        }
    }

    /// Whether some token could satisfy both matchers.
    pub fn overlaps(&self, other: &TargetMatcher) -> bool {
        if self.opcode != other.opcode {
            return false;
        }
        match (&self.operand, &other.operand) {
            (Some(a), Some(b)) => a.matches(b),
            _ => true,
        }
    }
}

/// Takes the token's opcode and operand. Jump markers and region tags are
/// not part of a matcher.
impl From<&Token> for TargetMatcher {
    fn from(token: &Token) -> Self {
        Self {
            opcode: token.opcode,
            operand: token.operand.clone(),
        }
    }
}

/// A target sequence and its replacement.
#[derive(Clone, Debug)]
pub struct Pattern {
    name: String,
    target: Vec<TargetMatcher>,
    replacement: Vec<Token>,
}

impl Pattern {
    /// Build a pattern.
    ///
    /// An empty `replacement` is normalized to a single `nop` so that a
    /// deletion still has a token to carry displaced jump markers and the
    /// region tag.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::EmptyTarget`] if `target` is empty.
    pub fn new(
        name: impl Into<String>,
        target: Vec<TargetMatcher>,
        mut replacement: Vec<Token>,
    ) -> Result<Self, PatternError> {
        let name = name.into();
        if target.is_empty() {
            return Err(PatternError::EmptyTarget { pattern: name });
        }
        if replacement.is_empty() {
            replacement.push(Token::nop());
        }
        Ok(Self {
            name,
            target,
            replacement,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &[TargetMatcher] {
        &self.target
    }

    pub fn replacement(&self) -> &[Token] {
        &self.replacement
    }

    /// Number of tokens a match spans.
    pub fn total_count(&self) -> usize {
        self.target.len()
    }

    /// Whether both patterns could complete on the same span.
    ///
    /// True when the targets have equal length and every position overlaps.
    pub fn is_ambiguous_with(&self, other: &Pattern) -> bool {
        self.total_count() == other.total_count()
            && self
                .target
                .iter()
                .zip(&other.target)
                .all(|(a, b)| a.overlaps(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_ir::parser::parse_token;

    #[test]
    fn test_empty_target_rejected() {
        let err = Pattern::new("empty", vec![], vec![Token::nop()]).unwrap_err();
        assert_eq!(
            err,
            PatternError::EmptyTarget {
                pattern: "empty".into()
            }
        );
        assert_eq!(err.to_string(), "pattern `empty` has an empty target sequence");
    }

    #[test]
    fn test_empty_replacement_becomes_nop() {
        let pattern = Pattern::new("drop", vec![TargetMatcher::new("pop")], vec![]).unwrap();
        assert_eq!(pattern.replacement(), &[Token::nop()]);
    }

    #[test]
    fn test_matcher_without_operand_matches_any() {
        let matcher = TargetMatcher::new("ldc.i4");
        assert!(matcher.matches(&parse_token("ldc.i4 180")));
        assert!(matcher.matches(&Token::new("ldc.i4")));
        assert!(!matcher.matches(&parse_token("ldc.i4.s 91")));
    }

    #[test]
    fn test_matcher_with_operand_requires_operand() {
        let matcher = TargetMatcher::new("ldc.i4.s").with_operand(91);
        assert!(matcher.matches(&parse_token("#2: ldc.i4.s 91")));
        assert!(!matcher.matches(&parse_token("ldc.i4.s 90")));
        assert!(!matcher.matches(&Token::new("ldc.i4.s")));
    }

    #[test]
    fn test_ambiguity_detection() {
        let exact = Pattern::new(
            "exact",
            vec![TargetMatcher::from(&parse_token("ldc.i4 180")), TargetMatcher::new("call")],
            vec![],
        )
        .unwrap();
        let loose = Pattern::new(
            "loose",
            vec![TargetMatcher::new("ldc.i4"), TargetMatcher::new("call")],
            vec![],
        )
        .unwrap();
        let other = Pattern::new(
            "other",
            vec![TargetMatcher::new("ldc.i4").with_operand(90), TargetMatcher::new("call")],
            vec![],
        )
        .unwrap();
        let shorter = Pattern::new("shorter", vec![TargetMatcher::new("ldc.i4")], vec![]).unwrap();

        assert!(exact.is_ambiguous_with(&loose));
        assert!(loose.is_ambiguous_with(&other));
        assert!(!exact.is_ambiguous_with(&other));
        assert!(!loose.is_ambiguous_with(&shorter));
    }
}
