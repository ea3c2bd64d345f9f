//! Streaming multi-pattern rewriting of instruction sequences.
//!
//! The rewriter scans a token sequence once, tracks any number of
//! [`Pattern`]s concurrently and substitutes matched spans with their
//! replacement tokens, yielding output lazily.
//!
//! # Overview
//!
//! - [`Pattern`]: an immutable target/replacement template
//! - [`PatternTracker`]: live matching progress of one pattern in one pass
//! - [`PatternSet`]: ordered registration, starts rewrites
//! - [`Rewrite`]: the engine, an `Iterator<Item = Token>` over the output
//!
//! # Design Notes
//!
//! The engine holds back only the tokens that some partial match could still
//! claim. When several patterns complete while no other pattern is mid-match
//! the longest one is spliced in; equal lengths go to the pattern registered
//! first. Jump markers and exception-region tags on removed tokens are carried
//! onto the replacement so branch targets are never orphaned.
//!
//! The rewriter is purely syntactic: it knows nothing about stack effects or
//! control-flow validity of what it produces.

mod engine;
mod errors;
mod pattern;
pub mod pattern_file;
mod pattern_set;
mod tracker;

pub use engine::{Rewrite, RewriteStats};
pub use errors::{PatternError, RewriteError};
pub use pattern::{Pattern, TargetMatcher};
pub use pattern_file::parse_patterns;
pub use pattern_set::{AmbiguityPolicy, PatternSet};
pub use tracker::{Completion, Observation, PatternTracker};
