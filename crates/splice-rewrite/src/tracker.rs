//! Per-rewrite matching progress for one pattern.

use std::sync::Arc;

use splice_ir::Token;
use tracing::trace;

use crate::pattern::Pattern;

/// A finished match, expressed against the engine's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Registration index of the pattern that matched.
    pub pattern: usize,
    /// Buffer index of the first matched token.
    pub start: usize,
    /// Number of matched tokens.
    pub len: usize,
}

/// Result of feeding one token to a tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// The token extended a match that is not complete yet.
    Matching,
    /// The token did not match; any partial match was dropped.
    Reset,
    Completed(Completion),
}

/// Live matching state of one [`Pattern`] during one rewrite pass.
///
/// Trackers are never shared between rewrites. The engine creates a fresh
/// set for every input sequence.
#[derive(Debug)]
pub struct PatternTracker {
    pattern: Arc<Pattern>,
    index: usize,
    matched_count: usize,
    /// Buffer index of the first matched token, `None` when not mid-match.
    instructions_to_copy_before: Option<usize>,
    /// Set when the pattern fired during the current step.
    spent: bool,
}

impl PatternTracker {
    pub fn new(index: usize, pattern: Arc<Pattern>) -> Self {
        Self {
            pattern,
            index,
            matched_count: 0,
            instructions_to_copy_before: None,
            spent: false,
        }
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    pub fn instructions_to_copy_before(&self) -> Option<usize> {
        self.instructions_to_copy_before
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Feed the token that was just appended to the buffer.
    ///
    /// `buffer_len` is the buffer length including `token`. A tracker that
    /// already fired in this step reports [`Observation::Reset`] without
    /// touching its state.
    pub fn observe(&mut self, token: &Token, buffer_len: usize) -> Observation {
        if self.spent {
            return Observation::Reset;
        }

        let matcher = &self.pattern.target()[self.matched_count];
        if !matcher.matches(token) {
            self.reset();
            return Observation::Reset;
        }

        self.matched_count += 1;
        if self.matched_count == 1 {
            self.instructions_to_copy_before = Some(buffer_len - 1);
        }
        if self.matched_count < self.pattern.total_count() {
            return Observation::Matching;
        }

        let len = self.matched_count;
        let start = self
            .instructions_to_copy_before
            .take()
            .unwrap_or(buffer_len - len);
        self.matched_count = 0;
        self.spent = true;
        Observation::Completed(Completion {
            pattern: self.index,
            start,
            len,
        })
    }

    /// Re-anchor a partial match after the buffer shrank to `new_buffer_len`.
    ///
    /// A partial match longer than the new buffer can no longer be anchored
    /// and is abandoned.
    pub fn resize(&mut self, new_buffer_len: usize) {
        if self.matched_count == 0 {
            return;
        }
        if self.matched_count > new_buffer_len {
            trace!(
                pattern = self.pattern.name(),
                matched = self.matched_count,
                new_buffer_len,
                "partial match lost its anchor"
            );
            self.reset();
        } else {
            self.instructions_to_copy_before = Some(new_buffer_len - self.matched_count);
        }
    }

    /// Make a tracker that fired eligible to match again.
    pub fn rearm(&mut self) {
        self.spent = false;
    }

    fn reset(&mut self) {
        self.matched_count = 0;
        self.instructions_to_copy_before = None;
    }
}
