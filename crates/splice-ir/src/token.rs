//! Instruction tokens and the structural metadata they carry.

use smallvec::SmallVec;

use crate::{Label, Operand, Symbol};

/// Instruction opcode. The rewriter treats it as an opaque symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Opcode(Symbol);

impl Opcode {
    pub fn new(name: &'static str) -> Self {
        Opcode(Symbol::new(name))
    }

    pub fn from_dynamic(name: &str) -> Self {
        Opcode(Symbol::from_dynamic(name))
    }

    pub fn name(self) -> Symbol {
        self.0
    }

    /// Placeholder opcode used when a replacement is empty.
    pub fn nop() -> Self {
        Opcode::new("nop")
    }
}

impl From<Symbol> for Opcode {
    fn from(symbol: Symbol) -> Self {
        Opcode(symbol)
    }
}

impl From<&'static str> for Opcode {
    fn from(name: &'static str) -> Self {
        Opcode::new(name)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Set of labels designating a token as a branch target.
///
/// Append-only and duplicate-free. Iteration follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct JumpMarkers(SmallVec<[Label; 2]>);

impl JumpMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label. Returns `false` if it was already present.
    pub fn insert(&mut self, label: Label) -> bool {
        if self.0.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn extend_from(&mut self, other: &JumpMarkers) {
        for &label in other.iter() {
            self.insert(label);
        }
    }

    pub fn contains(&self, label: Label) -> bool {
        self.0.contains(&label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Order does not matter for equality: markers form a set.
impl PartialEq for JumpMarkers {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|label| other.contains(*label))
    }
}

impl Eq for JumpMarkers {}

impl FromIterator<Label> for JumpMarkers {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        let mut markers = JumpMarkers::new();
        for label in iter {
            markers.insert(label);
        }
        markers
    }
}

/// Kind of exception-handling region boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Try,
    /// Catch clause, optionally restricted to an exception type.
    Catch(Option<Symbol>),
    Filter,
    Fault,
    Finally,
    End,
}

/// Marks which exception-handling region a token structurally opens or
/// belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionTag {
    pub kind: RegionKind,
}

impl RegionTag {
    pub fn new(kind: RegionKind) -> Self {
        Self { kind }
    }
}

/// One instruction of a method body.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub opcode: Opcode,
    pub operand: Option<Operand>,
    pub jump_markers: JumpMarkers,
    pub region_tag: Option<RegionTag>,
}

impl Token {
    pub fn new(opcode: impl Into<Opcode>) -> Self {
        Self {
            opcode: opcode.into(),
            operand: None,
            jump_markers: JumpMarkers::new(),
            region_tag: None,
        }
    }

    pub fn nop() -> Self {
        Token::new(Opcode::nop())
    }

    pub fn with_operand(mut self, operand: impl Into<Operand>) -> Self {
        self.operand = Some(operand.into());
        self
    }

    pub fn with_marker(mut self, label: Label) -> Self {
        self.jump_markers.insert(label);
        self
    }

    pub fn with_region(mut self, kind: RegionKind) -> Self {
        self.region_tag = Some(RegionTag::new(kind));
        self
    }
}
