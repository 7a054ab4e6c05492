pub mod builtins;
pub mod classes;
pub mod destructuring;
pub mod enums;
pub mod expressions;
pub mod functions;
pub mod hoisting;
pub mod modules;
pub mod statements;

use crate::ast::statement::StatementKind;
use crate::ast::{NodeId, SourceFile};
use crate::config::CompilerOptions;
use crate::diagnostics::DiagnosticHandler;
use crate::directives::{DirectiveKind, DirectiveTable};
use crate::error::{TransformError, TransformResult};
use crate::lua;
use crate::lualib::{LuaLibFeature, LuaLibRegistry};
use crate::oracle::{OracleSymbol, TypeOracle, Type};
use crate::scope::{ScopeKind, ScopeStack};
use crate::span::Span;
use crate::string_interner::{StringId, StringInterner};
use crate::symbols::{NameMangler, SymbolId, SymbolTracker};
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// The emitted-name contract observable in downstream Lua.
pub const EXPORTS_TABLE: &str = "____exports";
pub const SELF_PARAMETER: &str = "self";
pub const SUPER_FIELD: &str = "____super";
pub const GETTERS_FIELD: &str = "____getters";
pub const SETTERS_FIELD: &str = "____setters";

/// Result of transforming one source file.
#[derive(Debug)]
pub struct TransformedFile {
    pub block: lua::Block,
    pub used_features: FxHashSet<LuaLibFeature>,
}

/// An export scope: a source file or namespace whose exported symbols are
/// rewritten to fields of its exports table.
pub(crate) struct ExportScopeFrame {
    pub exports: FxHashSet<OracleSymbol>,
    pub table: String,
}

/// Per-function transformation context.
#[derive(Debug, Clone, Default)]
pub(crate) struct FunctionFrame {
    pub tuple_return: bool,
    /// Depth of enclosing try-closures within this function; returns inside
    /// carry a truthy marker per level-independent protocol.
    pub try_depth: u32,
    pub is_generator: bool,
}

/// Class currently being lowered; drives `super` references.
#[derive(Debug, Clone)]
pub(crate) struct ClassFrame {
    pub reference: lua::Expression,
    pub has_super: bool,
}

/// The AST-to-AST transformer. One instance per file family; symbol ids,
/// the feature registry and the temporary counter are instance state, not
/// process globals.
pub struct LuaTransformer<'a> {
    pub(crate) oracle: &'a dyn TypeOracle,
    pub(crate) options: &'a CompilerOptions,
    pub(crate) interner: &'a StringInterner,
    pub(crate) scopes: ScopeStack,
    pub(crate) symbols: SymbolTracker,
    pub(crate) directives: DirectiveTable,
    pub(crate) lualib: LuaLibRegistry,
    pub(crate) export_scopes: Vec<ExportScopeFrame>,
    pub(crate) function_stack: Vec<FunctionFrame>,
    pub(crate) class_stack: Vec<ClassFrame>,
    /// Referenced-symbol sets being captured for open function definitions.
    pub(crate) capture_stack: Vec<FxHashSet<SymbolId>>,
    pub(crate) no_self_in_file: bool,
    pub(crate) current_file_path: PathBuf,
    temp_counter: u32,
}

impl<'a> LuaTransformer<'a> {
    /// Non-fatal warnings (deprecated directive syntax, unknown directive
    /// names) report through `handler`; fatal failures propagate as
    /// [`TransformError`].
    pub fn new(
        oracle: &'a dyn TypeOracle,
        options: &'a CompilerOptions,
        handler: Arc<dyn DiagnosticHandler>,
        interner: &'a StringInterner,
    ) -> Self {
        let directives = DirectiveTable::new(handler);
        LuaTransformer {
            oracle,
            options,
            interner,
            scopes: ScopeStack::new(),
            symbols: SymbolTracker::new(),
            directives,
            lualib: LuaLibRegistry::new(),
            export_scopes: Vec::new(),
            function_stack: Vec::new(),
            class_stack: Vec::new(),
            capture_stack: Vec::new(),
            no_self_in_file: false,
            current_file_path: PathBuf::new(),
            temp_counter: 0,
        }
    }

    /// Transform one type-checked source file into a Lua chunk plus the set
    /// of lualib features it uses.
    pub fn transform_source_file(
        &mut self,
        file: &SourceFile,
    ) -> TransformResult<TransformedFile> {
        debug!(path = %file.path.display(), "transforming source file");
        self.current_file_path = file.path.clone();

        if file.is_json {
            let block = self.transform_json_file(file)?;
            return Ok(TransformedFile {
                block,
                used_features: std::mem::take(&mut self.lualib).into_used(),
            });
        }

        let file_directives = self.directives.file_directives(file);
        self.no_self_in_file = file_directives
            .iter()
            .any(|d| d.kind == DirectiveKind::NoSelfInFile);

        let is_module = self.file_is_module(file);

        self.function_stack.push(FunctionFrame::default());
        self.scopes.push(ScopeKind::File);
        if is_module {
            self.export_scopes.push(ExportScopeFrame {
                exports: self.oracle.exports_of(file.id).into_iter().collect(),
                table: EXPORTS_TABLE.to_string(),
            });
        }

        let mut out = Vec::new();
        let result = (|| -> TransformResult<()> {
            for statement in &file.statements {
                self.transform_statement(statement, &mut out)?;
            }
            Ok(())
        })();

        if let Err(error) = result {
            // The stack is abandoned with the file; other files remain
            // independently transformable on a fresh transformer.
            self.export_scopes.clear();
            self.function_stack.clear();
            return Err(error);
        }

        let scope = self.scopes.pop(file.span)?;
        let mut statements = hoisting::rewrite(&scope, out, &self.symbols, self.options)?;

        if is_module {
            self.export_scopes.pop();
            statements.insert(
                0,
                lua::Statement::local(
                    vec![lua::Identifier::new(EXPORTS_TABLE, Some(file.span))],
                    vec![lua::Expression::table(Vec::new(), Some(file.span))],
                    Some(file.span),
                ),
            );
            statements.push(lua::Statement::ret(
                vec![lua::Expression::name(EXPORTS_TABLE, Some(file.span))],
                Some(file.span),
            ));
        }

        self.function_stack.pop();

        Ok(TransformedFile {
            block: lua::Block::new(statements),
            used_features: std::mem::take(&mut self.lualib).into_used(),
        })
    }

    /// JSON-flagged files lower to `return <expression>`, no exports table.
    fn transform_json_file(&mut self, file: &SourceFile) -> TransformResult<lua::Block> {
        self.function_stack.push(FunctionFrame::default());
        self.scopes.push(ScopeKind::File);
        let result = match file.statements.as_slice() {
            [statement] => match &statement.kind {
                StatementKind::Expression(expression) => {
                    let value = self.transform_expression(expression)?;
                    Ok(lua::Block::new(vec![lua::Statement::ret(
                        vec![value],
                        Some(file.span),
                    )]))
                }
                _ => Err(TransformError::invalid_json_file_content(statement.span)),
            },
            _ => Err(TransformError::invalid_json_file_content(file.span)),
        };
        self.scopes.pop(file.span)?;
        self.function_stack.pop();
        result
    }

    /// A file containing any export statement, or whose file symbol exports
    /// anything per the oracle, becomes a module.
    fn file_is_module(&self, file: &SourceFile) -> bool {
        if !self.oracle.exports_of(file.id).is_empty() {
            return true;
        }
        file.statements
            .iter()
            .any(|statement| matches!(statement.kind, StatementKind::Export(_)))
    }

    // --- shared helpers ---

    pub(crate) fn resolve(&self, id: StringId) -> &'a str {
        self.interner.resolve(id)
    }

    /// Next `____TS_…` temporary name; the counter is instance state so
    /// output is deterministic per file.
    pub(crate) fn temp_name(&mut self) -> String {
        self.temp_counter += 1;
        format!("____TS_tmp{}", self.temp_counter)
    }

    pub(crate) fn use_lualib(&mut self, feature: LuaLibFeature) -> lua::Expression {
        self.lualib.record(feature);
        lua::Expression::name(feature.helper_name(), None)
    }

    pub(crate) fn type_of(&self, node: NodeId) -> Type {
        self.oracle.type_of(node)
    }

    /// The exports table of the nearest enclosing export scope that exports
    /// this symbol, if any.
    pub(crate) fn exported_table_for(&self, symbol: OracleSymbol) -> Option<String> {
        self.export_scopes
            .iter()
            .rev()
            .find(|frame| frame.exports.contains(&symbol))
            .map(|frame| frame.table.clone())
    }

    /// Track a symbol reference: mint its stable id, record the site in all
    /// open scopes and in any function definitions being captured.
    pub(crate) fn track_symbol(&mut self, symbol: OracleSymbol, span: Span) -> SymbolId {
        let id = self.symbols.id_for(symbol, span);
        self.scopes.record_reference(id, span);
        for captures in &mut self.capture_stack {
            captures.insert(id);
        }
        id
    }

    pub(crate) fn symbol_has_directive(
        &self,
        symbol: OracleSymbol,
        kind: DirectiveKind,
        span: Span,
    ) -> bool {
        self.directives
            .symbol_has(self.oracle, symbol, kind, span)
    }

    /// Directive check on the symbol behind an arbitrary node.
    pub(crate) fn node_symbol_has_directive(
        &self,
        node: NodeId,
        kind: DirectiveKind,
        span: Span,
    ) -> bool {
        self.oracle
            .symbol_of(node)
            .map(|symbol| self.symbol_has_directive(symbol, kind, span))
            .unwrap_or(false)
    }

    /// The mangled Lua name for a declared identifier, failing on unsafe
    /// ambient names (their emitted name must match the ambient value).
    pub(crate) fn declared_name(
        &self,
        text: &str,
        span: Span,
        is_ambient: bool,
    ) -> TransformResult<String> {
        if is_ambient && NameMangler::is_unsafe_name(text) {
            return Err(TransformError::invalid_ambient_identifier(span, text));
        }
        Ok(NameMangler::mangle(text))
    }

    /// Wrap statements into `(function() ... end)()`.
    pub(crate) fn iife(
        &self,
        statements: Vec<lua::Statement>,
        origin: Option<Span>,
    ) -> lua::Expression {
        lua::Expression::call(
            lua::Expression::function(Vec::new(), false, lua::Block::new(statements), origin),
            Vec::new(),
            origin,
        )
    }
}

/// Convenience entry point matching the exposed Host interface.
pub fn transform_source_file(
    file: &SourceFile,
    oracle: &dyn TypeOracle,
    options: &CompilerOptions,
    handler: Arc<dyn DiagnosticHandler>,
    interner: &StringInterner,
) -> TransformResult<TransformedFile> {
    let mut transformer = LuaTransformer::new(oracle, options, handler, interner);
    transformer.transform_source_file(file)
}
