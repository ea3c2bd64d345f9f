//! Pattern file parser.
//!
//! A pattern file lists patterns in registration order:
//!
//! ```text
//! // Remove the hard-coded timer clamp.
//! pattern drop-clamp {
//!   ldc.i4.s 91
//!   ldc.i4 180
//!   call method MyUtils::GetClampInt
//! } => {
//! }
//!
//! pattern zero-min {
//!   ldfld field MySessionSettings::GlobalEncounterMinRemovalTimer
//!   ldc.i4.s 90
//! } => {
//!   ldfld field MySessionSettings::GlobalEncounterMinRemovalTimer
//!   ldc.i4.s 0
//! }
//! ```
//!
//! Target lines use the listing syntax of [`splice_ir::parser`]; an omitted
//! operand matches any operand. Replacement lines are full tokens and may
//! carry jump markers.

use splice_ir::{ParseError, Token, parse_line};

use crate::errors::RewriteError;
use crate::pattern::{Pattern, TargetMatcher};

enum State {
    Top,
    Target {
        name: String,
        target: Vec<TargetMatcher>,
    },
    Replacement {
        name: String,
        target: Vec<TargetMatcher>,
        replacement: Vec<Token>,
    },
}

/// Parse a pattern file into patterns, in file order.
pub fn parse_patterns(text: &str) -> Result<Vec<Pattern>, RewriteError> {
    let mut patterns = Vec::new();
    let mut state = State::Top;
    let mut offset = 0;

    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let control = strip_comment(line).trim();

        state = match state {
            State::Top if control.is_empty() => State::Top,
            State::Top => State::Target {
                name: pattern_header(control, offset)?,
                target: Vec::new(),
            },
            State::Target { name, target } if control == "} => {}" => {
                patterns.push(Pattern::new(name, target, Vec::new())?);
                State::Top
            }
            State::Target { name, target } if control == "} => {" => State::Replacement {
                name,
                target,
                replacement: Vec::new(),
            },
            State::Target { name, mut target } => {
                if let Some(token) = parse_line(line, offset)? {
                    target.push(target_matcher(token, offset)?);
                }
                State::Target { name, target }
            }
            State::Replacement {
                name,
                target,
                replacement,
            } if control == "}" => {
                patterns.push(Pattern::new(name, target, replacement)?);
                State::Top
            }
            State::Replacement {
                name,
                target,
                mut replacement,
            } => {
                if let Some(token) = parse_line(line, offset)? {
                    replacement.push(token);
                }
                State::Replacement {
                    name,
                    target,
                    replacement,
                }
            }
        };
        offset += raw_line.len();
    }

    match state {
        State::Top => Ok(patterns),
        State::Target { name, .. } | State::Replacement { name, .. } => Err(ParseError {
            message: format!("pattern `{name}` is not terminated"),
            offset,
        }
        .into()),
    }
}

/// Control lines hold no string literals, so cutting at `//` is safe here.
fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code)
}

/// Parse `pattern NAME {`.
fn pattern_header(control: &str, offset: usize) -> Result<String, ParseError> {
    let name = control
        .strip_prefix("pattern")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .and_then(|rest| rest.strip_suffix('{'))
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.contains(char::is_whitespace));
    name.map(str::to_owned).ok_or_else(|| ParseError {
        message: format!("expected `pattern NAME {{`, found `{control}`"),
        offset,
    })
}

fn target_matcher(token: Token, offset: usize) -> Result<TargetMatcher, ParseError> {
    if !token.jump_markers.is_empty() || token.region_tag.is_some() {
        return Err(ParseError {
            message: "target lines cannot carry jump markers or region tags".to_string(),
            offset,
        });
    }
    Ok(TargetMatcher::from(&token))
}
