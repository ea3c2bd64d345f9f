//! # splice
//!
//! Rewrites instruction listings with a set of target/replacement patterns.
//! The engine lives in `splice-rewrite`; the token model and listing format
//! in `splice-ir`. This crate ties them to files and the `splice` binary.

pub mod pipeline;

pub use pipeline::{
    PipelineError, PipelineResult, RewriteOutput, format_stats, load_patterns, load_patterns_str,
    rewrite_file, rewrite_listing,
};
pub use splice_ir as ir;
pub use splice_rewrite as rewrite;
