//! Command-line interface for the splice rewriter.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use splice_rewrite::AmbiguityPolicy;

#[derive(Parser)]
#[command(name = "splice")]
#[command(about = "Streaming instruction-sequence rewriter", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct PatternArgs {
    /// Pattern file to load
    #[arg(short, long)]
    pub patterns: PathBuf,

    /// Reject pattern sets where two patterns can tie at the same position
    #[arg(long)]
    pub strict: bool,
}

impl PatternArgs {
    pub fn policy(&self) -> AmbiguityPolicy {
        if self.strict {
            AmbiguityPolicy::Reject
        } else {
            AmbiguityPolicy::FirstRegistered
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Rewrite an instruction listing
    Rewrite {
        #[command(flatten)]
        patterns: PatternArgs,

        /// Print replacement statistics to stderr
        #[arg(long)]
        stats: bool,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Listing to rewrite
        input: PathBuf,
    },
    /// Validate a pattern file without rewriting anything
    Check {
        #[command(flatten)]
        patterns: PatternArgs,
    },
}
