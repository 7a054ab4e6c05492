use crate::error::{TransformError, TransformResult};
use crate::lua;
use crate::span::Span;
use crate::symbols::SymbolId;
use rustc_hash::{FxHashMap, FxHashSet};

/// Lexical scope kinds, powers of two so lookups can mask several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ScopeKind {
    File = 0x1,
    Function = 0x2,
    Switch = 0x4,
    Loop = 0x8,
    Conditional = 0x10,
    Block = 0x20,
    Try = 0x40,
    Catch = 0x80,
}

impl ScopeKind {
    pub fn mask(self) -> u16 {
        self as u16
    }
}

/// Info recorded for a function definition emitted in a scope: the symbols
/// its body references (captured at definition time) and where the defining
/// statement sits in the scope's output list, so the hoister can splice it.
#[derive(Debug, Clone, Default)]
pub struct FunctionDefinitionInfo {
    pub referenced_symbols: FxHashSet<SymbolId>,
    pub statement_index: Option<usize>,
    pub declared_at: Span,
}

/// One multi-name `local` declaration emitted in a scope.
#[derive(Debug, Clone)]
pub struct DeclarationRecord {
    pub names: Vec<(Option<SymbolId>, String)>,
    pub statement_index: usize,
    pub declared_at: Span,
}

#[derive(Debug, Default)]
pub struct Scope {
    pub kind: Option<ScopeKind>,
    pub id: u32,
    /// Symbol id → every reference site seen while this scope was open.
    pub referenced_symbols: FxHashMap<SymbolId, Vec<Span>>,
    pub declarations: Vec<DeclarationRecord>,
    pub function_definitions: FxHashMap<SymbolId, FunctionDefinitionInfo>,
    /// Import statements to be lifted to the top by the hoister.
    pub import_statements: Vec<lua::Statement>,
    pub loop_continued: bool,
    pub function_returned: bool,
}

impl Scope {
    fn new(kind: ScopeKind, id: u32) -> Self {
        Scope {
            kind: Some(kind),
            id,
            ..Default::default()
        }
    }

    pub fn is_kind(&self, kind: ScopeKind) -> bool {
        self.kind == Some(kind)
    }
}

/// LIFO stack of scopes, bounded by source nesting depth. The file scope is
/// pushed first and only once; ids are unique per transformer run.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    next_id: u32,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope and return its id.
    pub fn push(&mut self, kind: ScopeKind) -> u32 {
        debug_assert!(
            kind != ScopeKind::File || self.scopes.is_empty(),
            "file scope must be the bottom of the stack"
        );
        self.next_id += 1;
        let id = self.next_id;
        self.scopes.push(Scope::new(kind, id));
        id
    }

    pub fn pop(&mut self, span: Span) -> TransformResult<Scope> {
        self.scopes
            .pop()
            .ok_or_else(|| TransformError::undefined_scope(span))
    }

    pub fn peek(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut Scope> {
        self.scopes.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Search from the top for the nearest scope whose kind is in `mask`.
    pub fn find_nearest_of_kinds(&self, mask: u16) -> Option<&Scope> {
        self.scopes
            .iter()
            .rev()
            .find(|scope| scope.kind.map(|k| k.mask() & mask != 0).unwrap_or(false))
    }

    pub fn find_nearest_of_kinds_mut(&mut self, mask: u16) -> Option<&mut Scope> {
        self.scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.kind.map(|k| k.mask() & mask != 0).unwrap_or(false))
    }

    pub fn inside(&self, kind: ScopeKind) -> bool {
        self.find_nearest_of_kinds(kind.mask()).is_some()
    }

    /// Record an identifier reference in the current scope and every
    /// enclosing scope.
    pub fn record_reference(&mut self, symbol: SymbolId, span: Span) {
        for scope in &mut self.scopes {
            scope.referenced_symbols.entry(symbol).or_default().push(span);
        }
    }

    pub fn record_declaration(&mut self, record: DeclarationRecord) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.declarations.push(record);
        }
    }

    pub fn record_function_definition(&mut self, symbol: SymbolId, info: FunctionDefinitionInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.function_definitions.insert(symbol, info);
        }
    }

    pub fn record_import(&mut self, statement: lua::Statement) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.import_statements.push(statement);
        }
    }

    /// Mark the nearest loop as continued, returning its id for the label.
    pub fn mark_loop_continued(&mut self) -> Option<u32> {
        let scope = self.find_nearest_of_kinds_mut(ScopeKind::Loop.mask())?;
        scope.loop_continued = true;
        Some(scope.id)
    }

    /// Flag a return on every scope up to and including the enclosing
    /// function (or file), so try scopes in between observe it.
    pub fn mark_function_returned(&mut self) {
        for scope in self.scopes.iter_mut().rev() {
            scope.function_returned = true;
            if matches!(scope.kind, Some(ScopeKind::Function) | Some(ScopeKind::File)) {
                break;
            }
        }
    }
}
