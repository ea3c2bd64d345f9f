//! Instruction token model for the splice rewriter.
//!
//! A method body is a flat sequence of [`Token`]s. Each token has an
//! [`Opcode`], an optional [`Operand`], a set of [`JumpMarkers`] naming it as a
//! branch target, and an optional [`RegionTag`] for exception-handling
//! structure. The crate also provides a line-oriented text listing format
//! ([`printer`] / [`parser`]) used for fixtures, pattern files and logging.

pub mod operand;
pub mod parser;
pub mod printer;
pub mod symbol;
pub mod token;

pub use operand::{Label, LocalRef, MemberRef, Operand};
pub use parser::{ParseError, parse_line, parse_listing};
pub use printer::print_listing;
pub use symbol::Symbol;
pub use token::{JumpMarkers, Opcode, RegionKind, RegionTag, Token};
