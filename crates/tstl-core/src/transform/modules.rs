use super::{ExportScopeFrame, LuaTransformer, EXPORTS_TABLE};
use crate::ast::statement::*;
use crate::ast::Ident;
use crate::directives::DirectiveKind;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::scope::ScopeKind;
use crate::symbols::NameMangler;

impl LuaTransformer<'_> {
    /// Imports lower to require calls plus local rebindings, and are
    /// collected on the file scope for the hoister to lift first.
    pub(crate) fn transform_import(
        &mut self,
        statement: &Statement,
        import: &ImportDeclaration,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        if import.module_path.is_empty() {
            return Err(TransformError::new(
                TransformErrorKind::UnsupportedImportType,
                statement.span,
                "Import declarations must name a module",
            ));
        }
        let module_path = self.resolve_require_path(&import.module_path, statement)?;
        let require = lua::Expression::call(
            lua::Expression::name("require", origin),
            vec![lua::Expression::string(module_path, origin)],
            origin,
        );

        match &import.clause {
            ImportClause::Default(_) => {
                Err(TransformError::default_imports_not_supported(statement.span))
            }
            ImportClause::SideEffect => {
                self.scopes
                    .record_import(lua::Statement::expression(require, origin));
                Ok(())
            }
            ImportClause::Namespace(ident) => {
                if !self.oracle.module_exports_some_value(&import.module_path)
                    || !self.oracle.is_referenced_alias_declaration(ident.id)
                {
                    return Ok(());
                }
                let lua_ident = self.binding_identifier(ident)?;
                self.scopes.record_import(lua::Statement::local(
                    vec![lua_ident],
                    vec![require],
                    origin,
                ));
                Ok(())
            }
            ImportClause::Named(specifiers) => {
                let value_specifiers: Vec<&ImportSpecifier> = specifiers
                    .iter()
                    .filter(|spec| {
                        !spec.is_type_only
                            && self.oracle.is_value_alias_declaration(spec.imported.id)
                    })
                    .collect();
                if value_specifiers.is_empty() {
                    return Ok(());
                }

                let alias = module_alias(&import.module_path);
                self.scopes.record_import(lua::Statement::local(
                    vec![lua::Identifier::new(alias.clone(), origin)],
                    vec![require],
                    origin,
                ));

                let mut names = Vec::new();
                let mut values = Vec::new();
                for spec in value_specifiers {
                    let local = spec.local.as_ref().unwrap_or(&spec.imported);
                    names.push(self.binding_identifier(local)?);
                    values.push(lua::Expression::member(
                        lua::Expression::name(alias.clone(), origin),
                        self.resolve(spec.imported.name),
                        origin,
                    ));
                }
                self.scopes
                    .record_import(lua::Statement::local(names, values, origin));
                Ok(())
            }
        }
    }

    /// Resolve an import path against the source file directory (relative)
    /// or the configured base URL, then re-express it relative to the root
    /// directory with dots for separators.
    pub(crate) fn resolve_require_path(
        &self,
        path: &str,
        statement: &Statement,
    ) -> TransformResult<String> {
        if self.node_symbol_has_directive(statement.id, DirectiveKind::NoResolution, statement.span)
        {
            return Ok(path.to_string());
        }

        let is_relative = path.starts_with("./") || path.starts_with("../");
        let joined = if is_relative {
            let Some(parent) = self.current_file_path.parent() else {
                return Err(TransformError::new(
                    TransformErrorKind::MissingSourceFile,
                    statement.span,
                    "Cannot resolve a relative import without a source file path",
                ));
            };
            format!("{}/{}", parent.to_string_lossy(), path)
        } else {
            match &self.options.base_url {
                Some(base) => format!("{}/{}", base.to_string_lossy(), path),
                None => path.to_string(),
            }
        };

        let joined = normalize_components(&joined)
            .ok_or_else(|| TransformError::unresolvable_require_path(statement.span, path))?;

        let root = self
            .options
            .root_dir
            .as_ref()
            .map(|root| normalize_components(&root.to_string_lossy()))
            .unwrap_or_else(|| Some(Vec::new()))
            .ok_or_else(|| TransformError::unresolvable_require_path(statement.span, path))?;

        if !root.is_empty() {
            if joined.len() < root.len() || joined[..root.len()] != root[..] {
                return Err(TransformError::unresolvable_require_path(statement.span, path));
            }
            return Ok(joined[root.len()..].join("."));
        }
        Ok(joined.join("."))
    }

    pub(crate) fn transform_export(
        &mut self,
        statement: &Statement,
        export: &ExportDeclaration,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let exports_table = self
            .export_scopes
            .last()
            .map(|frame| frame.table.clone())
            .unwrap_or_else(|| EXPORTS_TABLE.to_string());

        match &export.kind {
            ExportKind::Declaration(inner) => {
                if !is_exportable_declaration(inner) {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidExportDeclaration,
                        statement.span,
                        "Only declarations can be exported",
                    ));
                }
                self.transform_statement(inner, out)?;

                // When the oracle does not know the symbol is exported, the
                // declaration lowered to a plain local; publish it.
                for ident in declaration_names(inner) {
                    let known = self
                        .oracle
                        .symbol_of(ident.id)
                        .map(|symbol| self.exported_table_for(symbol).is_some())
                        .unwrap_or(false);
                    if !known {
                        let text = self.resolve(ident.name);
                        out.push(lua::Statement::assign(
                            vec![lua::Expression::member(
                                lua::Expression::name(exports_table.clone(), origin),
                                text,
                                origin,
                            )],
                            vec![lua::Expression::name(NameMangler::mangle(text), origin)],
                            origin,
                        ));
                    }
                }
                Ok(())
            }
            ExportKind::Named { specifiers, source } => {
                match source {
                    Some(source) => {
                        // Re-export: require once, copy the named fields.
                        let module_path = self.resolve_require_path(source, statement)?;
                        let alias = module_alias(source);
                        out.push(lua::Statement::local(
                            vec![lua::Identifier::new(alias.clone(), origin)],
                            vec![lua::Expression::call(
                                lua::Expression::name("require", origin),
                                vec![lua::Expression::string(module_path, origin)],
                                origin,
                            )],
                            origin,
                        ));
                        for spec in specifiers {
                            let exported = spec.exported.as_ref().unwrap_or(&spec.local);
                            out.push(lua::Statement::assign(
                                vec![lua::Expression::member(
                                    lua::Expression::name(exports_table.clone(), origin),
                                    self.resolve(exported.name),
                                    origin,
                                )],
                                vec![lua::Expression::member(
                                    lua::Expression::name(alias.clone(), origin),
                                    self.resolve(spec.local.name),
                                    origin,
                                )],
                                origin,
                            ));
                        }
                    }
                    None => {
                        for spec in specifiers {
                            let exported = spec.exported.as_ref().unwrap_or(&spec.local);
                            let local_expr = crate::ast::expression::Expression::new(
                                spec.local.id,
                                crate::ast::expression::ExpressionKind::Identifier(spec.local.name),
                                spec.local.span,
                            );
                            let value = self
                                .transform_identifier_expression(&local_expr, spec.local.name);
                            out.push(lua::Statement::assign(
                                vec![lua::Expression::member(
                                    lua::Expression::name(exports_table.clone(), origin),
                                    self.resolve(exported.name),
                                    origin,
                                )],
                                vec![value],
                                origin,
                            ));
                        }
                    }
                }
                Ok(())
            }
            ExportKind::Default(_) => Err(TransformError::unsupported_default_export(statement.span)),
        }
    }

    /// Namespaces lower to a merged local table plus a `do` block mutating
    /// it; member references rewrite through the namespace export frame.
    pub(crate) fn transform_namespace_declaration(
        &mut self,
        statement: &Statement,
        decl: &NamespaceDeclaration,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let text = self.resolve(decl.name.name).to_string();

        if decl.is_ambient {
            self.declared_name(&text, decl.name.span, true)?;
            return Ok(());
        }
        if self.node_symbol_has_directive(decl.name.id, DirectiveKind::Phantom, statement.span) {
            // Phantom namespaces contribute no table; members inline.
            for inner in &decl.statements {
                self.transform_statement(inner, out)?;
            }
            return Ok(());
        }

        let symbol = self.oracle.symbol_of(decl.name.id);
        let is_first = match symbol {
            Some(symbol) => self
                .oracle
                .symbol_declarations(symbol)
                .first()
                .map(|first| *first == statement.id)
                .unwrap_or(true),
            None => true,
        };
        let name = NameMangler::mangle(&text);
        let exported_table = symbol.and_then(|symbol| self.exported_table_for(symbol));

        if let Some(table) = &exported_table {
            let field = lua::Expression::member(
                lua::Expression::name(table.clone(), origin),
                &text,
                origin,
            );
            let value = if is_first {
                lua::Expression::table(Vec::new(), origin)
            } else {
                lua::Expression::binary(
                    lua::BinaryOperator::Or,
                    field.clone(),
                    lua::Expression::table(Vec::new(), origin),
                    origin,
                )
            };
            out.push(lua::Statement::assign(vec![field.clone()], vec![value], origin));
            let lua_ident = self.binding_identifier(&decl.name)?;
            let tracked = self.binding_symbol(&decl.name);
            self.emit_local_declaration(out, vec![(tracked, lua_ident)], vec![field], statement.span);
        } else {
            let value = if is_first {
                lua::Expression::table(Vec::new(), origin)
            } else {
                lua::Expression::binary(
                    lua::BinaryOperator::Or,
                    lua::Expression::name(name.clone(), origin),
                    lua::Expression::table(Vec::new(), origin),
                    origin,
                )
            };
            let lua_ident = self.binding_identifier(&decl.name)?;
            let tracked = self.binding_symbol(&decl.name);
            self.emit_local_declaration(out, vec![(tracked, lua_ident)], vec![value], statement.span);
        }

        self.export_scopes.push(ExportScopeFrame {
            exports: self.oracle.exports_of(statement.id).into_iter().collect(),
            table: name,
        });
        let result = self.transform_scoped_statements(
            &Block {
                statements: decl.statements.clone(),
                span: statement.span,
            },
            ScopeKind::Block,
        );
        self.export_scopes.pop();
        let (statements, _) = result?;
        out.push(lua::Statement::do_block(
            lua::Block::new(statements),
            origin,
        ));
        Ok(())
    }
}

/// `____` plus the sanitised final segment of a module path.
fn module_alias(module_path: &str) -> String {
    let stem = module_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(module_path);
    let mut alias = String::from("____");
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            alias.push(c);
        }
    }
    if alias.len() == 4 {
        alias.push_str("module");
    }
    alias
}

/// Split a path into components, resolving `.` and `..`; None when `..`
/// escapes the top.
fn normalize_components(path: &str) -> Option<Vec<String>> {
    let mut components: Vec<String> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                components.pop()?;
            }
            other => components.push(other.to_string()),
        }
    }
    Some(components)
}

fn is_exportable_declaration(statement: &Statement) -> bool {
    matches!(
        statement.kind,
        StatementKind::Variable(_)
            | StatementKind::Function(_)
            | StatementKind::Class(_)
            | StatementKind::Enum(_)
            | StatementKind::Namespace(_)
            | StatementKind::Interface(_)
            | StatementKind::TypeAlias(_)
    )
}

/// The value names a declaration statement binds.
fn declaration_names(statement: &Statement) -> Vec<Ident> {
    match &statement.kind {
        StatementKind::Variable(decl) => decl
            .declarations
            .iter()
            .filter_map(|declarator| declarator.binding.as_identifier().copied())
            .collect(),
        StatementKind::Function(decl) => decl.name.into_iter().collect(),
        StatementKind::Class(decl) => decl.name.into_iter().collect(),
        StatementKind::Enum(decl) => vec![decl.name],
        StatementKind::Namespace(decl) => vec![decl.name],
        _ => Vec::new(),
    }
}
