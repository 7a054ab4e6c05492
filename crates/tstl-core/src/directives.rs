use crate::ast::{DocComment, SourceFile};
use crate::diagnostics::DiagnosticHandler;
use crate::oracle::{OracleSymbol, TypeOracle};
use crate::span::Span;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::Arc;

/// The closed set of doc-comment annotations that alter lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectiveKind {
    Extension,
    MetaExtension,
    PureAbstract,
    NoResolution,
    NoSelf,
    NoSelfInFile,
    Phantom,
    TupleReturn,
    LuaIterator,
    LuaTable,
    ForRange,
    Vararg,
    CompileMembersOnly,
    CustomConstructor,
}

impl DirectiveKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "extension" => Some(DirectiveKind::Extension),
            "metaExtension" => Some(DirectiveKind::MetaExtension),
            "pureAbstract" => Some(DirectiveKind::PureAbstract),
            "noResolution" => Some(DirectiveKind::NoResolution),
            "noSelf" => Some(DirectiveKind::NoSelf),
            "noSelfInFile" => Some(DirectiveKind::NoSelfInFile),
            "phantom" => Some(DirectiveKind::Phantom),
            "tupleReturn" => Some(DirectiveKind::TupleReturn),
            "luaIterator" => Some(DirectiveKind::LuaIterator),
            "luaTable" => Some(DirectiveKind::LuaTable),
            "forRange" => Some(DirectiveKind::ForRange),
            "vararg" => Some(DirectiveKind::Vararg),
            "compileMembersOnly" => Some(DirectiveKind::CompileMembersOnly),
            "customConstructor" => Some(DirectiveKind::CustomConstructor),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Extension => "extension",
            DirectiveKind::MetaExtension => "metaExtension",
            DirectiveKind::PureAbstract => "pureAbstract",
            DirectiveKind::NoResolution => "noResolution",
            DirectiveKind::NoSelf => "noSelf",
            DirectiveKind::NoSelfInFile => "noSelfInFile",
            DirectiveKind::Phantom => "phantom",
            DirectiveKind::TupleReturn => "tupleReturn",
            DirectiveKind::LuaIterator => "luaIterator",
            DirectiveKind::LuaTable => "luaTable",
            DirectiveKind::ForRange => "forRange",
            DirectiveKind::Vararg => "vararg",
            DirectiveKind::CompileMembersOnly => "compileMembersOnly",
            DirectiveKind::CustomConstructor => "customConstructor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub args: Vec<String>,
}

impl Directive {
    pub fn new(kind: DirectiveKind) -> Self {
        Directive {
            kind,
            args: Vec::new(),
        }
    }

    pub fn with_args(kind: DirectiveKind, args: Vec<String>) -> Self {
        Directive { kind, args }
    }
}

/// Parses and caches directives for symbols and nodes. Unknown names are
/// warned and ignored; the legacy `!directive` text syntax still parses but
/// warns about its deprecation.
pub struct DirectiveTable {
    handler: Arc<dyn DiagnosticHandler>,
    symbol_cache: RefCell<FxHashMap<OracleSymbol, Vec<Directive>>>,
}

impl DirectiveTable {
    pub fn new(handler: Arc<dyn DiagnosticHandler>) -> Self {
        DirectiveTable {
            handler,
            symbol_cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// All directives in a doc comment: structured tags plus legacy `!`
    /// text lines.
    pub fn parse_doc(&self, doc: &DocComment, span: Span) -> Vec<Directive> {
        let mut directives = Vec::new();

        for line in &doc.text {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix('!') {
                self.handler.warning(
                    span,
                    "The '!' directive syntax is deprecated, use '@' doc tags instead",
                );
                self.parse_entry(rest, span, &mut directives);
            }
        }

        for tag in &doc.tags {
            let entry = if tag.text.is_empty() {
                tag.name.clone()
            } else {
                format!("{} {}", tag.name, tag.text)
            };
            self.parse_entry(&entry, span, &mut directives);
        }

        directives
    }

    fn parse_entry(&self, entry: &str, span: Span, out: &mut Vec<Directive>) {
        let mut parts = entry.split_whitespace();
        let Some(raw_name) = parts.next() else {
            return;
        };
        // Legacy text directives were written capitalised ("!TupleReturn").
        let name = lower_first(raw_name);
        match DirectiveKind::parse(&name) {
            Some(kind) => {
                let args = parts.map(str::to_string).collect();
                out.push(Directive::with_args(kind, args));
            }
            None => {
                self.handler
                    .warning(span, &format!("Unknown directive \"{raw_name}\""));
            }
        }
    }

    /// Directives attached to a symbol's declaration doc, cached.
    pub fn directives_of_symbol(
        &self,
        oracle: &dyn TypeOracle,
        symbol: OracleSymbol,
        span: Span,
    ) -> Vec<Directive> {
        if let Some(cached) = self.symbol_cache.borrow().get(&symbol) {
            return cached.clone();
        }
        let directives = oracle
            .doc_comment_of(symbol)
            .map(|doc| self.parse_doc(&doc, span))
            .unwrap_or_default();
        self.symbol_cache
            .borrow_mut()
            .insert(symbol, directives.clone());
        directives
    }

    pub fn symbol_has(
        &self,
        oracle: &dyn TypeOracle,
        symbol: OracleSymbol,
        kind: DirectiveKind,
        span: Span,
    ) -> bool {
        self.directives_of_symbol(oracle, symbol, span)
            .iter()
            .any(|d| d.kind == kind)
    }

    /// File-level directives come from the doc comment of the first
    /// top-level statement.
    pub fn file_directives(&self, file: &SourceFile) -> Vec<Directive> {
        file.statements
            .first()
            .and_then(|stmt| stmt.doc().map(|doc| self.parse_doc(doc, stmt.span)))
            .unwrap_or_default()
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DocTag;
    use crate::diagnostics::CollectingDiagnosticHandler;

    fn table() -> (DirectiveTable, Arc<CollectingDiagnosticHandler>) {
        let handler = Arc::new(CollectingDiagnosticHandler::new());
        (DirectiveTable::new(handler.clone()), handler)
    }

    #[test]
    fn test_parse_tags() {
        let (table, handler) = table();
        let doc = DocComment {
            text: vec![],
            tags: vec![
                DocTag {
                    name: "tupleReturn".into(),
                    text: String::new(),
                },
                DocTag {
                    name: "forRange".into(),
                    text: String::new(),
                },
            ],
        };
        let directives = table.parse_doc(&doc, Span::zero());
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].kind, DirectiveKind::TupleReturn);
        assert_eq!(directives[1].kind, DirectiveKind::ForRange);
        assert_eq!(handler.warning_count(), 0);
    }

    #[test]
    fn test_legacy_bang_syntax_warns() {
        let (table, handler) = table();
        let doc = DocComment {
            text: vec!["!TupleReturn".into()],
            tags: vec![],
        };
        let directives = table.parse_doc(&doc, Span::zero());
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].kind, DirectiveKind::TupleReturn);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_unknown_directive_warns_and_is_ignored() {
        let (table, handler) = table();
        let doc = DocComment {
            text: vec![],
            tags: vec![DocTag {
                name: "definitelyNotADirective".into(),
                text: String::new(),
            }],
        };
        let directives = table.parse_doc(&doc, Span::zero());
        assert!(directives.is_empty());
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_directive_args() {
        let (table, _) = table();
        let doc = DocComment {
            text: vec![],
            tags: vec![DocTag {
                name: "customConstructor".into(),
                text: "MyCtor".into(),
            }],
        };
        let directives = table.parse_doc(&doc, Span::zero());
        assert_eq!(directives[0].args, vec!["MyCtor".to_string()]);
    }
}
