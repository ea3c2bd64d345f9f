//! Text listing parser.
//!
//! Reads the format produced by [`super::printer`]: one token per line,
//! optional `#N:` jump markers, an optional `{kind}` region tag, the opcode,
//! and an optional operand. `//` starts a comment. Uses winnow for parsing.

use winnow::ascii;
use winnow::combinator::{alt, delimited, opt, preceded, repeat, separated, terminated};
use winnow::prelude::*;
use winnow::token::{any, one_of, rest, take_till, take_while};

use crate::{Label, LocalRef, MemberRef, Opcode, Operand, RegionKind, RegionTag, Symbol, Token};

// ============================================================================
// Error type
// ============================================================================

/// Parse error for the listing format.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the parsed text.
    pub offset: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// Winnow parsers
// ============================================================================

/// Skip spaces and tabs (never newlines).
fn sp(input: &mut &str) -> ModalResult<()> {
    take_while(0.., [' ', '\t']).void().parse_next(input)
}

fn sp1(input: &mut &str) -> ModalResult<()> {
    take_while(1.., [' ', '\t']).void().parse_next(input)
}

/// Parse a label reference: `#N`
fn label(input: &mut &str) -> ModalResult<Label> {
    preceded('#', ascii::dec_uint).map(Label).parse_next(input)
}

/// Parse a jump-marker definition: `#N:`
fn label_def(input: &mut &str) -> ModalResult<Label> {
    terminated(label, ':').parse_next(input)
}

/// Parse an opcode: [A-Za-z_][A-Za-z0-9_.]*
fn opcode(input: &mut &str) -> ModalResult<Opcode> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
    )
        .take()
        .map(Opcode::from_dynamic)
        .parse_next(input)
}

/// Parse a type or member name. Names stop at whitespace and at `:`, so
/// `Type::member` splits cleanly.
fn name(input: &mut &str) -> ModalResult<Symbol> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, ':' | '{' | '}' | '"' | '`')
    })
    .map(Symbol::from_dynamic)
    .parse_next(input)
}

/// Parse `Type::member`.
fn member_ref(input: &mut &str) -> ModalResult<MemberRef> {
    (name, "::", name)
        .map(|(declaring_type, _, member)| MemberRef {
            declaring_type,
            member,
        })
        .parse_next(input)
}

/// Parse `N` or `N: Type`.
fn local_ref(input: &mut &str) -> ModalResult<LocalRef> {
    (ascii::dec_uint, opt(preceded((':', sp), name)))
        .map(|(index, ty)| LocalRef { index, ty })
        .parse_next(input)
}

/// Parse a region tag: `{try}`, `{catch Type}`, `{finally}`, ...
fn region_tag(input: &mut &str) -> ModalResult<RegionTag> {
    delimited(
        ('{', sp),
        alt((
            preceded(("catch", sp1), name).map(|ty| RegionKind::Catch(Some(ty))),
            "catch".value(RegionKind::Catch(None)),
            "try".value(RegionKind::Try),
            "filter".value(RegionKind::Filter),
            "fault".value(RegionKind::Fault),
            "finally".value(RegionKind::Finally),
            "end".value(RegionKind::End),
        )),
        (sp, '}'),
    )
    .map(RegionTag::new)
    .parse_next(input)
}

/// Parse a signed 64-bit integer literal.
fn integer_lit(input: &mut &str) -> ModalResult<i64> {
    (opt('-'), digits)
        .take()
        .try_map(str::parse::<i64>)
        .parse_next(input)
}

fn digits<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)
}

/// Float operand. The dot is mandatory so that `180` stays an integer;
/// an exponent may follow (`1.0e20`), as written by the printer.
fn float_with_dot(input: &mut &str) -> ModalResult<f64> {
    (
        opt('-'),
        digits,
        '.',
        digits,
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digits)),
    )
        .take()
        .try_map(str::parse::<f64>)
        .parse_next(input)
}

/// Escape sequences understood inside `ldstr` operands. Mirrors the
/// printer; an unknown escape is kept verbatim.
fn unescape(escaped: char, out: &mut String) {
    match escaped {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        '0' => out.push('\0'),
        '"' | '\\' => out.push(escaped),
        other => {
            out.push('\\');
            out.push(other);
        }
    }
}

/// Double-quoted string operand.
fn string_lit(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut text = String::new();
    loop {
        match any.parse_next(input)? {
            '"' => return Ok(text),
            '\\' => unescape(any.parse_next(input)?, &mut text),
            c => text.push(c),
        }
    }
}

/// Parse an operand.
fn operand(input: &mut &str) -> ModalResult<Operand> {
    alt((
        string_lit.map(Operand::Str),
        label.map(Operand::Label),
        delimited(
            ('[', sp),
            separated(0.., delimited(sp, label, sp), ','),
            (sp, ']'),
        )
        .map(Operand::Labels),
        preceded(("method", sp1), member_ref).map(Operand::Method),
        preceded(("field", sp1), member_ref).map(Operand::Field),
        preceded(("type", sp1), name).map(Operand::Type),
        preceded(("local", sp1), local_ref).map(Operand::Local),
        delimited('`', take_till(0.., '`'), '`').map(|raw: &str| Operand::Other(raw.to_owned())),
        "nan".value(Operand::Float(f64::NAN)),
        "inf".value(Operand::Float(f64::INFINITY)),
        "-inf".value(Operand::Float(f64::NEG_INFINITY)),
        float_with_dot.map(Operand::Float),
        integer_lit.map(Operand::Int),
    ))
    .parse_next(input)
}

/// Parse one token (without surrounding whitespace or comments).
fn token(input: &mut &str) -> ModalResult<Token> {
    let labels: Vec<Label> = repeat(0.., terminated(label_def, sp)).parse_next(input)?;
    let region_tag = opt(terminated(region_tag, sp)).parse_next(input)?;
    let opcode = opcode.parse_next(input)?;
    let operand = opt(preceded(sp1, operand)).parse_next(input)?;
    Ok(Token {
        opcode,
        operand,
        jump_markers: labels.into_iter().collect(),
        region_tag,
    })
}

/// Trailing whitespace and an optional `//` comment.
fn line_end(input: &mut &str) -> ModalResult<()> {
    (sp, opt(("//", rest)))
        .void()
        .parse_next(input)
}

// ============================================================================
// Public entry points
// ============================================================================

/// Parse a single listing line.
///
/// Returns `Ok(None)` for blank and comment-only lines. `base_offset` is the
/// byte offset of the line within the enclosing text, used for error
/// positions.
pub fn parse_line(line: &str, base_offset: usize) -> Result<Option<Token>, ParseError> {
    let mut remaining = line;
    let at = |remaining: &str| base_offset + line.len() - remaining.len();

    let _ = line_end.parse_next(&mut remaining);
    if remaining.is_empty() {
        return Ok(None);
    }
    remaining = line;
    let _ = sp.parse_next(&mut remaining);

    let parsed = token.parse_next(&mut remaining).map_err(|e| ParseError {
        message: format!("invalid token: {e}"),
        offset: at(remaining),
    })?;
    line_end.parse_next(&mut remaining).map_err(|e| ParseError {
        message: format!("lexer error: {e}"),
        offset: at(remaining),
    })?;
    if !remaining.is_empty() {
        return Err(ParseError {
            message: format!("unexpected trailing input `{}`", remaining.trim_end()),
            offset: at(remaining),
        });
    }
    Ok(Some(parsed))
}

/// Parse a whole listing, one token per line.
pub fn parse_listing(text: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if let Some(token) = parse_line(content, offset)? {
            tokens.push(token);
        }
        offset += line.len();
    }
    Ok(tokens)
}

/// Parse a single token, panicking on failure.
#[cfg(any(test, feature = "test-utils"))]
pub fn parse_token(text: &str) -> Token {
    match parse_line(text, 0) {
        Ok(Some(token)) => token,
        Ok(None) => panic!("no token in {text:?}"),
        Err(e) => panic!("failed to parse {text:?}: {e}"),
    }
}
