use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A unique identifier for an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringId(u32);

impl StringId {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Unchecked: does not verify the id exists in any interner.
    pub fn from_u32(id: u32) -> Self {
        StringId(id)
    }
}

/// Deduplicates identifier text and hands out stable [`StringId`]s.
/// Ids are assigned in interning order, which keeps serialised ASTs and
/// their string tables round-trippable.
#[derive(Debug, Default)]
pub struct StringInterner {
    ids: FxHashMap<Box<str>, StringId>,
    strings: Vec<Box<str>>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning the existing id when already present.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = StringId(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.ids.insert(boxed, id);
        id
    }

    /// Resolve an id. Panics on an id this interner never produced.
    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }

    pub fn try_resolve(&self, id: StringId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// The interned strings in id order, for serialisation alongside an AST.
    pub fn string_table(&self) -> Vec<String> {
        self.strings.iter().map(|s| s.to_string()).collect()
    }

    /// Rebuild an interner from a serialised string table. Ids are assigned
    /// in table order, so ids embedded in a serialised AST stay valid.
    pub fn from_string_table(table: &[String]) -> Self {
        let mut interner = Self::new();
        for s in table {
            interner.intern(s);
        }
        interner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        let c = interner.intern("foo");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(interner.resolve(b), "bar");
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_round_trip_table() {
        let mut interner = StringInterner::new();
        interner.intern("x");
        let id_y = interner.intern("y");
        let rebuilt = StringInterner::from_string_table(&interner.string_table());
        assert_eq!(rebuilt.resolve(id_y), "y");
    }

    #[test]
    fn test_try_resolve_invalid() {
        let interner = StringInterner::new();
        assert_eq!(interner.try_resolve(StringId::from_u32(42)), None);
    }
}
