//! Text listing printer.
//!
//! Prints tokens one per line in the format read back by [`super::parser`].
//!
//! # Example output
//!
//! ```text
//! #1: {try} ldarg.0
//! ldfld field MySessionSettings::GlobalEncounterMinRemovalTimer
//! ldc.i4.s 90
//! call method MyUtils::GetClampInt
//! brtrue.s #1
//! ```

use std::fmt::{self, Write};

use crate::{Operand, RegionKind, RegionTag, Token};

/// Render a token sequence as a listing, one token per line.
pub fn print_listing<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    for token in tokens {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{token}");
    }
    out
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in self.jump_markers.iter() {
            write!(f, "#{}: ", label.index())?;
        }
        if let Some(region) = &self.region_tag {
            write!(f, "{region} ")?;
        }
        write!(f, "{}", self.opcode)?;
        if let Some(operand) = &self.operand {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RegionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RegionKind::Try => f.write_str("{try}"),
            RegionKind::Catch(Some(ty)) => write!(f, "{{catch {ty}}}"),
            RegionKind::Catch(None) => f.write_str("{catch}"),
            RegionKind::Filter => f.write_str("{filter}"),
            RegionKind::Fault => f.write_str("{fault}"),
            RegionKind::Finally => f.write_str("{finally}"),
            RegionKind::End => f.write_str("{end}"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Int(value) => write!(f, "{value}"),
            Operand::Float(value) => write_float(f, *value),
            Operand::Str(value) => write_string_lit(f, value),
            Operand::Method(member) => {
                write!(f, "method {}::{}", member.declaring_type, member.member)
            }
            Operand::Field(member) => {
                write!(f, "field {}::{}", member.declaring_type, member.member)
            }
            Operand::Type(ty) => write!(f, "type {ty}"),
            Operand::Local(local) => match local.ty {
                Some(ty) => write!(f, "local {}: {ty}", local.index),
                None => write!(f, "local {}", local.index),
            },
            Operand::Label(label) => write!(f, "#{}", label.index()),
            Operand::Labels(labels) => {
                f.write_char('[')?;
                for (i, label) in labels.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "#{}", label.index())?;
                }
                f.write_char(']')
            }
            Operand::Other(raw) => write!(f, "`{raw}`"),
        }
    }
}

/// Floats always carry a decimal point so they never read back as integers.
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "inf" } else { "-inf" });
    }
    let text = format!("{value:?}");
    if text.contains('.') {
        return f.write_str(&text);
    }
    match text.split_once('e') {
        Some((mantissa, exponent)) => write!(f, "{mantissa}.0e{exponent}"),
        None => write!(f, "{text}.0"),
    }
}

fn write_string_lit(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\0' => f.write_str("\\0")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Label, Symbol};

    #[test]
    fn test_print_listing() {
        let tokens = vec![
            Token::new("ldarg.0")
                .with_marker(Label(1))
                .with_region(RegionKind::Try),
            Token::new("ldfld").with_operand(Operand::field(
                "MySessionSettings",
                "GlobalEncounterMinRemovalTimer",
            )),
            Token::new("ldc.i4.s").with_operand(90),
            Token::new("call").with_operand(Operand::method("MyUtils", "GetClampInt")),
            Token::new("switch").with_operand(Operand::Labels(vec![Label(1), Label(2)])),
            Token::new("stloc").with_operand(Operand::local(2, Some(Symbol::new("MyGps")))),
            Token::new("ldstr").with_operand("say \"hi\"\n"),
            Token::new("ldc.r8").with_operand(Operand::Float(1e20)),
            Token::new("leave.s")
                .with_operand(Label(2))
                .with_region(RegionKind::Catch(Some(Symbol::new("Exception")))),
        ];
        insta::assert_snapshot!(print_listing(&tokens).trim_end(), @r###"
        #1: {try} ldarg.0
        ldfld field MySessionSettings::GlobalEncounterMinRemovalTimer
        ldc.i4.s 90
        call method MyUtils::GetClampInt
        switch [#1, #2]
        stloc local 2: MyGps
        ldstr "say \"hi\"\n"
        ldc.r8 1.0e20
        {catch Exception} leave.s #2
        "###);
    }

    #[test]
    fn test_float_always_has_dot() {
        assert_eq!(Operand::Float(2.0).to_string(), "2.0");
        assert_eq!(Operand::Float(0.25).to_string(), "0.25");
        assert_eq!(Operand::Float(f64::NEG_INFINITY).to_string(), "-inf");
    }
}
