//! Instruction operands and their matching rules.

use crate::Symbol;

/// Jump-marker id. Labels compare by index identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(pub u32);

impl Label {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Stable reference to a method or field: declaring type plus member name.
///
/// Replaces identity-based lookups of live metadata objects with a plain value
/// key, so references produced by different loaders compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub declaring_type: Symbol,
    pub member: Symbol,
}

impl MemberRef {
    pub fn new(declaring_type: impl Into<Symbol>, member: impl Into<Symbol>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            member: member.into(),
        }
    }
}

/// Local variable slot, optionally annotated with its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalRef {
    pub index: u16,
    pub ty: Option<Symbol>,
}

/// Payload of an instruction. Which variant appears depends on the opcode
/// family; the rewriter never checks that pairing.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    Str(String),
    Method(MemberRef),
    Field(MemberRef),
    Type(Symbol),
    Local(LocalRef),
    Label(Label),
    /// Switch table.
    Labels(Vec<Label>),
    /// Operand kinds the model does not name. Compared by plain equality.
    Other(String),
}

impl Operand {
    /// Semantic equality used by pattern matching.
    ///
    /// Members and types compare by their stable identity, labels by index,
    /// literals by value. Floats compare by bit pattern so a constraint of
    /// `NaN` still matches itself. Operands of different kinds never match.
    pub fn matches(&self, other: &Operand) -> bool {
        match (self, other) {
            (Operand::Int(a), Operand::Int(b)) => a == b,
            (Operand::Float(a), Operand::Float(b)) => a.to_bits() == b.to_bits(),
            (Operand::Str(a), Operand::Str(b)) => a == b,
            (Operand::Method(a), Operand::Method(b)) | (Operand::Field(a), Operand::Field(b)) => {
                a == b
            }
            (Operand::Type(a), Operand::Type(b)) => a == b,
            (Operand::Local(a), Operand::Local(b)) => a.index == b.index && a.ty == b.ty,
            (Operand::Label(a), Operand::Label(b)) => a == b,
            (Operand::Labels(a), Operand::Labels(b)) => a == b,
            (a, b) => a == b,
        }
    }

    pub fn method(declaring_type: impl Into<Symbol>, member: impl Into<Symbol>) -> Self {
        Operand::Method(MemberRef::new(declaring_type, member))
    }

    pub fn field(declaring_type: impl Into<Symbol>, member: impl Into<Symbol>) -> Self {
        Operand::Field(MemberRef::new(declaring_type, member))
    }

    pub fn local(index: u16, ty: Option<Symbol>) -> Self {
        Operand::Local(LocalRef { index, ty })
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Int(value)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Int(value.into())
    }
}

impl From<Label> for Operand {
    fn from(label: Label) -> Self {
        Operand::Label(label)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Str(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_refs_compare_by_value() {
        let a = Operand::method("MyUtils", "GetClampInt");
        let owned_type = String::from("MyUtils");
        let b = Operand::Method(MemberRef::new(
            Symbol::from_dynamic(&owned_type),
            Symbol::new("GetClampInt"),
        ));
        assert!(a.matches(&b));
    }

    #[test]
    fn test_method_and_field_with_same_names_differ() {
        let method = Operand::method("Plugin", "Instance");
        let field = Operand::field("Plugin", "Instance");
        assert!(!method.matches(&field));
    }

    #[test]
    fn test_locals_compare_index_and_type() {
        let typed = Operand::local(3, Some(Symbol::new("MyGps")));
        assert!(typed.matches(&Operand::local(3, Some(Symbol::new("MyGps")))));
        assert!(!typed.matches(&Operand::local(3, None)));
        assert!(!typed.matches(&Operand::local(4, Some(Symbol::new("MyGps")))));
    }

    #[test]
    fn test_float_nan_matches_itself() {
        assert!(Operand::Float(f64::NAN).matches(&Operand::Float(f64::NAN)));
        assert!(!Operand::Float(0.0).matches(&Operand::Float(-0.0)));
    }

    #[test]
    fn test_kinds_never_cross_match() {
        assert!(!Operand::Int(91).matches(&Operand::Str("91".into())));
        assert!(!Operand::Label(Label(1)).matches(&Operand::Int(1)));
        assert!(Operand::Other("x".into()).matches(&Operand::Other("x".into())));
    }
}
