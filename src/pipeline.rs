//! File-level rewrite pipeline.
//!
//! ```text
//! pattern file ─► parse_patterns ─► PatternSet
//!                                       │
//! listing ─► parse_listing ─► tokens ─► PatternSet::rewrite ─► print_listing
//! ```
//!
//! Each listing is one method body. Rewrites share the pattern definitions
//! but nothing else, so bodies can be processed in any order or in parallel.

use std::path::{Path, PathBuf};

use derive_more::{Display, From};
use splice_ir::{ParseError, parse_listing, print_listing};
use splice_rewrite::{AmbiguityPolicy, PatternSet, RewriteError, RewriteStats, parse_patterns};
use tracing::{debug, info};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Display, From)]
pub enum PipelineError {
    #[display("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[display("{_0}")]
    #[from]
    Rewrite(RewriteError),

    #[display("{_0}")]
    #[from]
    Listing(ParseError),
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io { source, .. } => Some(source),
            PipelineError::Rewrite(e) => Some(e),
            PipelineError::Listing(e) => Some(e),
        }
    }
}

/// Rewritten listing together with the pass statistics.
#[derive(Debug)]
pub struct RewriteOutput {
    pub listing: String,
    pub stats: RewriteStats,
}

fn read(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Build a pattern set from pattern file text.
pub fn load_patterns_str(text: &str, policy: AmbiguityPolicy) -> PipelineResult<PatternSet> {
    let patterns = parse_patterns(text)?;
    Ok(PatternSet::try_from_patterns(policy, patterns)?)
}

/// Build a pattern set from a pattern file.
pub fn load_patterns(path: &Path, policy: AmbiguityPolicy) -> PipelineResult<PatternSet> {
    let set = load_patterns_str(&read(path)?, policy)?;
    info!(path = %path.display(), patterns = set.len(), "loaded patterns");
    Ok(set)
}

/// Rewrite one listing.
///
/// The listing is parsed completely before rewriting starts; a parse error
/// means no output at all.
pub fn rewrite_listing(patterns: &PatternSet, text: &str) -> PipelineResult<RewriteOutput> {
    let tokens = parse_listing(text)?;
    let mut rewrite = patterns.rewrite(tokens);
    let output: Vec<_> = rewrite.by_ref().collect();
    let stats = rewrite.stats().clone();
    debug!(
        tokens_in = stats.tokens_in,
        tokens_out = stats.tokens_out,
        replacements = stats.replacements,
        "rewrote listing"
    );
    Ok(RewriteOutput {
        listing: print_listing(&output),
        stats,
    })
}

/// Rewrite the listing stored at `path`.
pub fn rewrite_file(patterns: &PatternSet, path: &Path) -> PipelineResult<RewriteOutput> {
    rewrite_listing(patterns, &read(path)?)
}

/// Human-readable summary of a pass, one line per pattern.
pub fn format_stats(patterns: &PatternSet, stats: &RewriteStats) -> String {
    let mut out = format!(
        "{} tokens in, {} tokens out, {} replacements\n",
        stats.tokens_in, stats.tokens_out, stats.replacements
    );
    for (pattern, count) in patterns.patterns().iter().zip(&stats.per_pattern) {
        out.push_str(&format!("  {}: {count}\n", pattern.name()));
    }
    out
}
