//! Streaming rewrite engine.
//!
//! [`Rewrite`] drives every registered pattern over one token sequence in a
//! single forward pass and yields the rewritten sequence lazily.
//!
//! Per input token the engine:
//! 1. appends it to the buffer of not-yet-emitted tokens,
//! 2. feeds it to every tracker, collecting completions,
//! 3. defers while any tracker is still mid-match,
//! 4. otherwise splices in every completion not overlapped by a longer one
//!    (earliest-registered on a tie) or, when nothing completed, flushes the
//!    whole buffer,
//! 5. re-arms trackers that fired during the step.
//!
//! A splice emits the buffered prefix before the match, then the replacement.
//! Jump markers of every removed token move onto the first replacement
//! token, and the region tag of the first removed token is applied to every
//! replacement token. Tokens after the span stay buffered with their own
//! markers.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;

use splice_ir::{JumpMarkers, Token};
use tracing::{debug, trace, warn};

use crate::pattern::Pattern;
use crate::tracker::{Completion, Observation, PatternTracker};

/// Counters for one rewrite pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Tokens consumed from the input.
    pub tokens_in: usize,
    /// Tokens yielded so far.
    pub tokens_out: usize,
    /// Number of spans replaced.
    pub replacements: usize,
    /// Replacements per pattern, by registration index.
    pub per_pattern: Vec<usize>,
}

/// Lazy rewrite of one token sequence. Created by
/// [`PatternSet::rewrite`](crate::PatternSet::rewrite).
pub struct Rewrite<I> {
    input: I,
    trackers: Vec<PatternTracker>,
    /// Tokens received but not yet resolved.
    buffer: Vec<Token>,
    /// Completions awaiting resolution.
    ending: Vec<Completion>,
    /// Resolved tokens waiting to be yielded.
    ready: VecDeque<Token>,
    exhausted: bool,
    stats: RewriteStats,
}

impl<I> Rewrite<I>
where
    I: Iterator<Item = Token>,
{
    pub(crate) fn new(input: I, patterns: &[Arc<Pattern>]) -> Self {
        let trackers = patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| PatternTracker::new(index, Arc::clone(pattern)))
            .collect();
        Self {
            input,
            trackers,
            buffer: Vec::new(),
            ending: Vec::new(),
            ready: VecDeque::new(),
            exhausted: false,
            stats: RewriteStats {
                per_pattern: vec![0; patterns.len()],
                ..RewriteStats::default()
            },
        }
    }

    pub fn stats(&self) -> &RewriteStats {
        &self.stats
    }

    /// Number of tokens currently held back.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn step(&mut self, token: Token) {
        self.stats.tokens_in += 1;
        self.buffer.push(token);
        let buffer_len = self.buffer.len();
        let current = &self.buffer[buffer_len - 1];

        let mut any_matching = false;
        for tracker in &mut self.trackers {
            match tracker.observe(current, buffer_len) {
                Observation::Matching => any_matching = true,
                Observation::Completed(completion) => {
                    trace!(
                        pattern = tracker.pattern().name(),
                        start = completion.start,
                        len = completion.len,
                        "pattern completed"
                    );
                    self.ending.push(completion);
                }
                Observation::Reset => {}
            }
        }

        if !any_matching {
            self.resolve();
        }
        for tracker in &mut self.trackers {
            tracker.rearm();
        }
    }

    /// Settle the buffer once no tracker is mid-match.
    ///
    /// Every completion that does not overlap a better one is applied, in
    /// buffer order.
    fn resolve(&mut self) {
        let winners = self.select_winners();
        if winners.is_empty() {
            self.flush();
        } else {
            let mut drained = 0;
            for winner in winners {
                drained += self.splice(Completion {
                    start: winner.start - drained,
                    ..winner
                });
            }
        }
        self.ending.clear();
    }

    /// Greedy non-overlapping selection, best first: longest, then
    /// earliest-registered pattern, then earliest completion. The result is
    /// ordered by start.
    fn select_winners(&self) -> Vec<Completion> {
        let mut candidates: Vec<(usize, Completion)> =
            self.ending.iter().copied().enumerate().collect();
        candidates.sort_by(|(order_a, a), (order_b, b)| {
            b.len
                .cmp(&a.len)
                .then(a.pattern.cmp(&b.pattern))
                .then(order_a.cmp(order_b))
        });

        let mut winners: Vec<Completion> = Vec::new();
        for (_, candidate) in candidates {
            match winners.iter().find(|w| overlaps(w, &candidate)).copied() {
                Some(winner) => {
                    if winner.start == candidate.start
                        && winner.len == candidate.len
                        && winner.pattern != candidate.pattern
                    {
                        warn!(
                            first = self.pattern_name(winner.pattern),
                            second = self.pattern_name(candidate.pattern),
                            start = candidate.start,
                            "ambiguous completion; earliest-registered pattern wins"
                        );
                    }
                }
                None => winners.push(candidate),
            }
        }
        winners.sort_by_key(|w| w.start);
        winners
    }

    /// Replace one span. Returns how many tokens left the buffer.
    fn splice(&mut self, winner: Completion) -> usize {
        let Completion {
            pattern: index,
            start,
            len,
        } = winner;
        let pattern = Arc::clone(self.trackers[index].pattern());

        self.ready.extend(self.buffer.drain(..start));

        let span_len = len.min(self.buffer.len());
        let removed: Vec<Token> = self.buffer.drain(..span_len).collect();
        let region_tag = removed.first().and_then(|token| token.region_tag);
        let mut markers = JumpMarkers::new();
        for token in &removed {
            markers.extend_from(&token.jump_markers);
        }

        let mut replacement = pattern.replacement().to_vec();
        if let Some(first) = replacement.first_mut() {
            first.jump_markers.extend_from(&markers);
        }
        for token in &mut replacement {
            token.region_tag = region_tag;
        }

        debug!(
            pattern = pattern.name(),
            start,
            removed = span_len,
            inserted = replacement.len(),
            carried_markers = markers.len(),
            "replaced span"
        );
        self.ready.extend(replacement);
        self.stats.replacements += 1;
        self.stats.per_pattern[index] += 1;

        let new_len = self.buffer.len();
        for tracker in &mut self.trackers {
            tracker.resize(new_len);
        }
        start + span_len
    }

    fn flush(&mut self) {
        self.ready.extend(self.buffer.drain(..));
    }

    /// End of input: no partial match can grow any further, so pending
    /// completions are resolved before the final flush rather than emitted
    /// verbatim.
    fn finish(&mut self) {
        if !self.ending.is_empty() {
            self.resolve();
        }
        self.flush();
        self.exhausted = true;
        debug!(
            tokens_in = self.stats.tokens_in,
            replacements = self.stats.replacements,
            "input exhausted"
        );
    }

    fn pattern_name(&self, index: usize) -> &str {
        self.trackers[index].pattern().name()
    }
}

fn overlaps(a: &Completion, b: &Completion) -> bool {
    a.start < b.start + b.len && b.start < a.start + a.len
}

impl<I> Iterator for Rewrite<I>
where
    I: Iterator<Item = Token>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                self.stats.tokens_out += 1;
                return Some(token);
            }
            if self.exhausted {
                return None;
            }
            match self.input.next() {
                Some(token) => self.step(token),
                None => self.finish(),
            }
        }
    }
}

impl<I> FusedIterator for Rewrite<I> where I: Iterator<Item = Token> {}
