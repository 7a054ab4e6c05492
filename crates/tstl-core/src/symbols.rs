use crate::oracle::OracleSymbol;
use crate::span::Span;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable per-transformer symbol id. Assigned on first encounter in a
/// deterministic depth-first left-to-right traversal, so output is
/// reproducible for a fixed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable record of a tracked symbol.
#[derive(Debug, Clone, Copy)]
pub struct SymbolInfo {
    pub symbol: OracleSymbol,
    pub first_seen: Span,
}

/// Mints stable integer ids for oracle symbols on first encounter and
/// remembers where each was first seen.
#[derive(Debug, Default)]
pub struct SymbolTracker {
    ids: FxHashMap<OracleSymbol, SymbolId>,
    infos: Vec<SymbolInfo>,
}

impl SymbolTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id for a symbol, minting one at `span` when unseen.
    pub fn id_for(&mut self, symbol: OracleSymbol, span: Span) -> SymbolId {
        if let Some(&id) = self.ids.get(&symbol) {
            return id;
        }
        let id = SymbolId(self.infos.len() as u32);
        self.ids.insert(symbol, id);
        self.infos.push(SymbolInfo {
            symbol,
            first_seen: span,
        });
        id
    }

    pub fn try_id(&self, symbol: OracleSymbol) -> Option<SymbolId> {
        self.ids.get(&symbol).copied()
    }

    pub fn info(&self, id: SymbolId) -> Option<&SymbolInfo> {
        self.infos.get(id.0 as usize)
    }

    pub fn first_seen(&self, id: SymbolId) -> Option<Span> {
        self.info(id).map(|info| info.first_seen)
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// Lua 5.x keywords. Emitting any of these as an identifier breaks the
/// chunk, so they are always mangled.
pub const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if",
    "in", "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Globals the emitted code and lualib rely on; shadowing them with user
/// names would corrupt the runtime, so they are mangled too.
pub const LUA_BUILTINS: &[&str] = &[
    "_G", "assert", "collectgarbage", "coroutine", "debug", "dofile", "error", "getmetatable",
    "io", "ipairs", "load", "loadstring", "math", "next", "os", "pairs", "pcall", "print",
    "rawequal", "rawget", "rawlen", "rawset", "require", "select", "setmetatable", "string",
    "table", "tonumber", "tostring", "type", "unpack", "xpcall", "self",
];

/// Detects reserved or invalid Lua identifiers and produces deterministic
/// safe replacements.
pub struct NameMangler;

impl NameMangler {
    pub fn is_valid_lua_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Unsafe names: Lua keywords, the builtin globals above, or anything
    /// not matching `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn is_unsafe_name(name: &str) -> bool {
        !Self::is_valid_lua_identifier(name)
            || LUA_KEYWORDS.contains(&name)
            || LUA_BUILTINS.contains(&name)
    }

    /// Replace an unsafe name with `____` followed by the name, hex-escaping
    /// each byte that is not valid in a Lua identifier.
    pub fn mangle(name: &str) -> String {
        if !Self::is_unsafe_name(name) {
            return name.to_string();
        }
        let mut result = String::from("____");
        for &byte in name.as_bytes() {
            let c = byte as char;
            if c.is_ascii_alphanumeric() || c == '_' {
                result.push(c);
            } else {
                result.push_str(&format!("x{byte:02X}"));
            }
        }
        result
    }
}
