//! Interned names.

use std::borrow::Cow;
use std::sync::LazyLock;

use lasso::{Rodeo, Spur};
use parking_lot::RwLock;

/// Global string interner for opcode, type and member names.
static INTERNER: LazyLock<RwLock<Rodeo>> = LazyLock::new(|| RwLock::new(Rodeo::default()));

/// Interned name, compared by key rather than by text.
///
/// Two symbols built from the same text are equal no matter which listing,
/// pattern file or thread produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    /// Symbol for a name known at compile time, such as a builtin opcode.
    pub fn new(text: &'static str) -> Self {
        Self::get_or_else(text, |rodeo| rodeo.get_or_intern_static(text))
    }

    /// Symbol for a name read from a listing or pattern file.
    pub fn from_dynamic(text: &str) -> Self {
        Self::get_or_else(text, |rodeo| rodeo.get_or_intern(text))
    }

    fn get_or_else(text: &str, f: impl for<'r> FnOnce(&'r mut Rodeo) -> Spur) -> Self {
        let mut lock = INTERNER.upgradable_read();
        Symbol(if let Some(spur) = lock.get(text) {
            spur
        } else {
            lock.with_upgraded(f)
        })
    }

    /// Run `f` on the interned text while holding a shared lock.
    ///
    /// The lock is recursive: printing a member reference resolves two
    /// symbols inside one `Display` call.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = INTERNER.read_recursive();
        f(interner.resolve(&self.0))
    }
}

impl From<&'static str> for Symbol {
    fn from(text: &'static str) -> Self {
        Symbol::new(text)
    }
}

impl From<Cow<'_, str>> for Symbol {
    fn from(text: Cow<'_, str>) -> Self {
        Symbol::from_dynamic(&text)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.with_str(|s| s == *other)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_and_dynamic_intern_to_same_key() {
        let a = Symbol::new("ldc.i4");
        let owned = String::from("ldc.i4");
        let b = Symbol::from_dynamic(&owned);
        assert_eq!(a, b);
        assert_eq!(a, "ldc.i4");
        assert_eq!(b.to_string(), "ldc.i4");
    }

    #[test]
    fn test_distinct_text_distinct_symbol() {
        assert_ne!(Symbol::new("ldarg.0"), Symbol::new("ldarg.1"));
    }
}
