pub mod expression;
pub mod pattern;
pub mod statement;
pub mod types;

use crate::span::Span;
use crate::string_interner::{StringId, StringInterner};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identity of a TSL AST node. The front end assigns ids; the TypeOracle
/// answers queries keyed by them, and emitted Lua nodes keep the origin
/// span rather than a pointer back into this tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// An identifier occurrence: its own node id (for symbol queries), the
/// interned text and the source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub name: StringId,
    pub span: Span,
}

impl Ident {
    pub fn new(id: NodeId, name: StringId, span: Span) -> Self {
        Ident { id, name, span }
    }
}

/// A parsed doc comment: free text lines plus structured `@tag` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocComment {
    pub text: Vec<String>,
    pub tags: Vec<DocTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    pub text: String,
}

/// One type-checked TSL source file, as handed over by the Host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Node id of the file itself, used for export-scope oracle queries.
    pub id: NodeId,
    pub path: PathBuf,
    pub statements: Vec<statement::Statement>,
    /// JSON-flagged files lower to `return <expression>` with no exports.
    pub is_json: bool,
    pub span: Span,
}

/// Serialisable unit pairing a source file with its string table, so ASTs
/// can cross the Host boundary as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFileDocument {
    pub strings: Vec<String>,
    pub file: SourceFile,
}

impl SourceFileDocument {
    pub fn new(interner: &StringInterner, file: SourceFile) -> Self {
        SourceFileDocument {
            strings: interner.string_table(),
            file,
        }
    }

    pub fn into_parts(self) -> (StringInterner, SourceFile) {
        (StringInterner::from_string_table(&self.strings), self.file)
    }
}
