//! splice CLI entry point.

mod cli;
mod logging;

use clap::Parser;
use cli::{Cli, Command};
use splice::pipeline::{format_stats, load_patterns, rewrite_file};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Rewrite {
            patterns,
            stats,
            output,
            input,
        } => {
            let set = load_patterns(&patterns.patterns, patterns.policy())
                .unwrap_or_else(|e| fail(e));
            let result = rewrite_file(&set, &input).unwrap_or_else(|e| fail(e));

            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, &result.listing) {
                        eprintln!("Error writing {}: {e}", path.display());
                        std::process::exit(1);
                    }
                }
                None => print!("{}", result.listing),
            }
            if stats {
                eprint!("{}", format_stats(&set, &result.stats));
            }
        }
        Command::Check { patterns } => {
            let set = load_patterns(&patterns.patterns, patterns.policy())
                .unwrap_or_else(|e| fail(e));
            println!("{}: {} patterns ok", patterns.patterns.display(), set.len());
        }
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}
