use super::LuaTransformer;
use crate::ast::expression::{Expression, ExpressionKind, Literal};
use crate::ast::statement::*;
use crate::error::{TransformError, TransformResult};
use crate::lua;
use crate::scope::{DeclarationRecord, Scope, ScopeKind};
use crate::span::Span;
use crate::symbols::SymbolId;

impl LuaTransformer<'_> {
    /// Main statement dispatcher; lowered statements are appended to `out`.
    pub fn transform_statement(
        &mut self,
        statement: &Statement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        match &statement.kind {
            StatementKind::Variable(decl) => self.transform_variable_declaration(statement, decl, out),
            StatementKind::Function(decl) => self.transform_function_declaration(statement, decl, out),
            StatementKind::Class(decl) => self.transform_class_declaration(statement, decl, out),
            StatementKind::Enum(decl) => self.transform_enum_declaration(statement, decl, out),
            StatementKind::Namespace(decl) => {
                self.transform_namespace_declaration(statement, decl, out)
            }
            StatementKind::Interface(_) | StatementKind::TypeAlias(_) => Ok(()),
            StatementKind::Import(import) => self.transform_import(statement, import),
            StatementKind::Export(export) => self.transform_export(statement, export, out),
            StatementKind::If(if_stmt) => self.transform_if_statement(statement, if_stmt, out),
            StatementKind::While(while_stmt) => {
                self.transform_while_statement(statement, while_stmt, out)
            }
            StatementKind::DoWhile(do_stmt) => {
                self.transform_do_while_statement(statement, do_stmt, out)
            }
            StatementKind::For(for_stmt) => self.transform_for_statement(statement, for_stmt, out),
            StatementKind::ForOf(for_of) => self.transform_for_of_statement(statement, for_of, out),
            StatementKind::ForIn(for_in) => self.transform_for_in_statement(statement, for_in, out),
            StatementKind::Switch(switch) => self.transform_switch_statement(statement, switch, out),
            StatementKind::Break => self.transform_break_statement(statement, out),
            StatementKind::Continue => self.transform_continue_statement(statement, out),
            StatementKind::Return(ret) => self.transform_return_statement(statement, ret, out),
            StatementKind::Throw(throw) => self.transform_throw_statement(statement, throw, out),
            StatementKind::Try(try_stmt) => self.transform_try_statement(statement, try_stmt, out),
            StatementKind::Block(block) => {
                let statements = self.transform_scoped_statements(block, ScopeKind::Block)?.0;
                out.push(lua::Statement::do_block(
                    lua::Block::new(statements),
                    Some(statement.span),
                ));
                Ok(())
            }
            StatementKind::Expression(expression) => {
                self.transform_expression_statement(expression, out)
            }
        }
    }

    /// Transform a block inside its own scope, run the hoister at pop, and
    /// hand the caller both the statements and the popped scope record.
    pub(crate) fn transform_scoped_statements(
        &mut self,
        block: &Block,
        kind: ScopeKind,
    ) -> TransformResult<(Vec<lua::Statement>, Scope)> {
        self.scopes.push(kind);
        let mut out = Vec::new();
        for statement in &block.statements {
            self.transform_statement(statement, &mut out)?;
        }
        let scope = self.scopes.pop(block.span)?;
        let statements = super::hoisting::rewrite(&scope, out, &self.symbols, self.options)?;
        Ok((statements, scope))
    }

    /// Push a `local` declaration and record it for the hoister.
    pub(crate) fn emit_local_declaration(
        &mut self,
        out: &mut Vec<lua::Statement>,
        names: Vec<(Option<SymbolId>, lua::Identifier)>,
        expressions: Vec<lua::Expression>,
        span: Span,
    ) {
        let record_names = names
            .iter()
            .map(|(symbol, ident)| (*symbol, ident.text.clone()))
            .collect();
        let idents = names.into_iter().map(|(_, ident)| ident).collect();
        out.push(lua::Statement::local(idents, expressions, Some(span)));
        self.scopes.record_declaration(DeclarationRecord {
            names: record_names,
            statement_index: out.len() - 1,
            declared_at: span,
        });
    }

    fn transform_variable_declaration(
        &mut self,
        _statement: &Statement,
        decl: &VariableDeclaration,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        for declarator in &decl.declarations {
            if decl.is_ambient {
                // Ambient declarations emit nothing, but their names must
                // be expressible in Lua as-is.
                if let Some(ident) = declarator.binding.as_identifier() {
                    self.declared_name(self.resolve(ident.name), ident.span, true)?;
                }
                continue;
            }
            self.bind_variable_declarator(declarator, out)?;
        }
        Ok(())
    }

    fn transform_if_statement(
        &mut self,
        statement: &Statement,
        if_stmt: &IfStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let condition = self.transform_expression(&if_stmt.condition)?;
        let (then_statements, _) =
            self.transform_scoped_statements(&if_stmt.then_branch, ScopeKind::Conditional)?;
        let else_block = match &if_stmt.else_branch {
            Some(else_branch) => Some(lua::Block::new(
                self.transform_scoped_statements(else_branch, ScopeKind::Conditional)?
                    .0,
            )),
            None => None,
        };
        out.push(lua::Statement::if_then(
            condition,
            lua::Block::new(then_statements),
            else_block,
            Some(statement.span),
        ));
        Ok(())
    }

    fn transform_while_statement(
        &mut self,
        statement: &Statement,
        while_stmt: &WhileStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let condition = self.transform_expression(&while_stmt.condition)?;
        let (mut body, scope) =
            self.transform_scoped_statements(&while_stmt.body, ScopeKind::Loop)?;
        if scope.loop_continued {
            body.push(lua::Statement::label(
                format!("__continue{}", scope.id),
                Some(statement.span),
            ));
        }
        out.push(lua::Statement::while_do(
            condition,
            lua::Block::new(body),
            Some(statement.span),
        ));
        Ok(())
    }

    /// `do { } while (cond)` maps to `repeat ... until not cond`.
    fn transform_do_while_statement(
        &mut self,
        statement: &Statement,
        do_stmt: &DoWhileStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let (mut body, scope) = self.transform_scoped_statements(&do_stmt.body, ScopeKind::Loop)?;
        if scope.loop_continued {
            body.push(lua::Statement::label(
                format!("__continue{}", scope.id),
                Some(statement.span),
            ));
        }
        let condition = self.transform_expression(&do_stmt.condition)?;
        out.push(lua::Statement::repeat_until(
            lua::Block::new(body),
            lua::Expression::unary(lua::UnaryOperator::Not, condition, Some(statement.span)),
            Some(statement.span),
        ));
        Ok(())
    }

    /// Classic for: initializers, then a while loop; the whole thing sits
    /// in a `do` block so the loop variable stays scoped to the loop.
    fn transform_for_statement(
        &mut self,
        statement: &Statement,
        for_stmt: &ForStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        self.scopes.push(ScopeKind::Block);
        let mut outer = Vec::new();

        let result = (|| -> TransformResult<lua::Statement> {
            if let Some(initializer) = &for_stmt.initializer {
                match initializer {
                    ForInitializer::Variable(decl) => {
                        for declarator in &decl.declarations {
                            self.bind_variable_declarator(declarator, &mut outer)?;
                        }
                    }
                    ForInitializer::Expression(expression) => {
                        self.transform_expression_statement(expression, &mut outer)?;
                    }
                }
            }

            let condition = match &for_stmt.condition {
                Some(condition) => self.transform_expression(condition)?,
                None => lua::Expression::boolean(true, origin),
            };

            self.scopes.push(ScopeKind::Loop);
            let mut body = Vec::new();
            for inner in &for_stmt.body.statements {
                self.transform_statement(inner, &mut body)?;
            }
            let mut incrementor = Vec::new();
            if let Some(expression) = &for_stmt.incrementor {
                self.transform_expression_statement(expression, &mut incrementor)?;
            }
            let loop_scope = self.scopes.pop(for_stmt.body.span)?;
            let mut body =
                super::hoisting::rewrite(&loop_scope, body, &self.symbols, self.options)?;
            if loop_scope.loop_continued {
                body.push(lua::Statement::label(
                    format!("__continue{}", loop_scope.id),
                    origin,
                ));
            }
            body.extend(incrementor);

            Ok(lua::Statement::while_do(
                condition,
                lua::Block::new(body),
                origin,
            ))
        })();

        let while_stmt = result?;
        outer.push(while_stmt);
        let scope = self.scopes.pop(statement.span)?;
        let outer = super::hoisting::rewrite(&scope, outer, &self.symbols, self.options)?;
        out.push(lua::Statement::do_block(lua::Block::new(outer), origin));
        Ok(())
    }

    fn transform_break_statement(
        &mut self,
        statement: &Statement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let nearest = self
            .scopes
            .find_nearest_of_kinds(ScopeKind::Loop.mask() | ScopeKind::Switch.mask());
        match nearest {
            Some(scope) if scope.is_kind(ScopeKind::Switch) => {
                let label = format!("____TS_switch{}_end", scope.id);
                out.push(lua::Statement::goto(label, Some(statement.span)));
                Ok(())
            }
            Some(_) => {
                out.push(lua::Statement::new(
                    lua::StatementKind::Break,
                    Some(statement.span),
                ));
                Ok(())
            }
            None => Err(TransformError::unsupported_kind(
                statement.span,
                "break outside of a loop or switch",
            )),
        }
    }

    fn transform_continue_statement(
        &mut self,
        statement: &Statement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        if !self.options.lua_target.supports_goto() {
            return Err(TransformError::unsupported_for_target(
                statement.span,
                "continue",
                self.options.lua_target.display_name(),
            ));
        }
        match self.scopes.mark_loop_continued() {
            Some(id) => {
                out.push(lua::Statement::goto(
                    format!("__continue{id}"),
                    Some(statement.span),
                ));
                Ok(())
            }
            None => Err(TransformError::unsupported_kind(
                statement.span,
                "continue outside of a loop",
            )),
        }
    }

    /// Returns carry a truthy marker inside try closures, and tuple-return
    /// functions flatten array returns into multiple Lua values.
    fn transform_return_statement(
        &mut self,
        statement: &Statement,
        ret: &ReturnStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let tuple_return = self
            .function_stack
            .last()
            .map(|frame| frame.tuple_return)
            .unwrap_or(false);

        let values = match &ret.expression {
            None => Vec::new(),
            Some(expression) => {
                if tuple_return {
                    match &expression.kind {
                        ExpressionKind::Array(elements) => {
                            let mut values = Vec::new();
                            for element in elements {
                                values.push(self.transform_expression(element)?);
                            }
                            values
                        }
                        _ => {
                            let value = self.transform_expression(expression)?;
                            vec![lua::Expression::call(
                                self.unpack_reference(Some(statement.span)),
                                vec![value],
                                Some(statement.span),
                            )]
                        }
                    }
                } else {
                    vec![self.transform_expression(expression)?]
                }
            }
        };

        out.push(self.emit_return(values, statement.span));
        Ok(())
    }

    /// Build a return statement honouring the try-marker protocol.
    pub(crate) fn emit_return(&mut self, values: Vec<lua::Expression>, span: Span) -> lua::Statement {
        self.scopes.mark_function_returned();
        let frame = self.function_stack.last().cloned().unwrap_or_default();
        let origin = Some(span);

        if frame.try_depth > 0 {
            let mut wrapped = vec![lua::Expression::boolean(true, origin)];
            if frame.tuple_return {
                let fields = values
                    .into_iter()
                    .map(lua::TableField::Positional)
                    .collect();
                wrapped.push(lua::Expression::table(fields, origin));
            } else {
                wrapped.extend(values);
            }
            return lua::Statement::ret(wrapped, origin);
        }

        lua::Statement::ret(values, origin)
    }

    fn transform_throw_statement(
        &mut self,
        statement: &Statement,
        throw: &ThrowStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let is_string = self.type_of(throw.expression.id).is_string()
            || matches!(
                throw.expression.kind,
                ExpressionKind::Literal(Literal::String(_))
                    | ExpressionKind::Template(_)
            );
        if !is_string {
            return Err(TransformError::invalid_throw_expression(statement.span));
        }
        let value = self.transform_expression(&throw.expression)?;
        out.push(lua::Statement::expression(
            lua::Expression::call(
                lua::Expression::name("error", Some(statement.span)),
                vec![value],
                Some(statement.span),
            ),
            Some(statement.span),
        ));
        Ok(())
    }

    /// Try/catch/finally via pcall. The emission shape depends on whether
    /// any return occurs in the try or catch body.
    fn transform_try_statement(
        &mut self,
        statement: &Statement,
        try_stmt: &TryStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);

        if let Some(frame) = self.function_stack.last_mut() {
            frame.try_depth += 1;
        }
        let try_result = self.transform_scoped_statements(&try_stmt.try_block, ScopeKind::Try);
        let catch_result = match &try_stmt.catch_clause {
            Some(catch) => self
                .transform_scoped_statements(&catch.block, ScopeKind::Catch)
                .map(Some),
            None => Ok(None),
        };
        if let Some(frame) = self.function_stack.last_mut() {
            frame.try_depth -= 1;
        }
        let (try_statements, try_scope) = try_result?;
        let catch_parts = catch_result?;

        let any_returns = try_scope.function_returned
            || catch_parts
                .as_ref()
                .map(|(_, scope)| scope.function_returned)
                .unwrap_or(false);

        let try_closure = lua::Expression::function(
            Vec::new(),
            false,
            lua::Block::new(try_statements),
            origin,
        );
        let pcall = lua::Expression::call(
            lua::Expression::name("pcall", origin),
            vec![try_closure],
            origin,
        );

        let catch_variable = try_stmt
            .catch_clause
            .as_ref()
            .and_then(|catch| catch.variable.as_ref());

        if any_returns {
            out.push(lua::Statement::local(
                vec![
                    lua::Identifier::new("____TS_try", origin),
                    lua::Identifier::new("____TS_returned", origin),
                    lua::Identifier::new("____TS_returnValue", origin),
                ],
                vec![pcall],
                origin,
            ));

            if let Some((mut catch_statements, _)) = catch_parts {
                if let Some(variable) = catch_variable {
                    catch_statements.insert(
                        0,
                        lua::Statement::local(
                            vec![self.binding_identifier(variable)?],
                            vec![lua::Expression::name("____TS_returned", origin)],
                            origin,
                        ),
                    );
                }
                let catch_closure = lua::Expression::function(
                    Vec::new(),
                    false,
                    lua::Block::new(catch_statements),
                    origin,
                );
                out.push(lua::Statement::if_then(
                    lua::Expression::unary(
                        lua::UnaryOperator::Not,
                        lua::Expression::name("____TS_try", origin),
                        origin,
                    ),
                    lua::Block::new(vec![lua::Statement::assign(
                        vec![
                            lua::Expression::name("____TS_returned", origin),
                            lua::Expression::name("____TS_returnValue", origin),
                        ],
                        vec![lua::Expression::call(
                            lua::Expression::parenthesized(catch_closure, origin),
                            Vec::new(),
                            origin,
                        )],
                        origin,
                    )]),
                    None,
                    origin,
                ));
            }

            if let Some(finally_block) = &try_stmt.finally_block {
                let (finally_statements, _) =
                    self.transform_scoped_statements(finally_block, ScopeKind::Block)?;
                out.extend(finally_statements);
            }

            if try_stmt.catch_clause.is_none() {
                out.push(self.rethrow_statement("____TS_returned", statement.span));
            }

            // Propagate the cached return value, unwrapping tuples at the
            // outermost level only.
            self.scopes.mark_function_returned();
            let frame = self.function_stack.last().cloned().unwrap_or_default();
            let propagation = if frame.try_depth > 0 {
                lua::Statement::ret(
                    vec![
                        lua::Expression::boolean(true, origin),
                        lua::Expression::name("____TS_returnValue", origin),
                    ],
                    origin,
                )
            } else if frame.tuple_return {
                lua::Statement::ret(
                    vec![lua::Expression::call(
                        self.unpack_reference(origin),
                        vec![lua::Expression::name("____TS_returnValue", origin)],
                        origin,
                    )],
                    origin,
                )
            } else {
                lua::Statement::ret(
                    vec![lua::Expression::name("____TS_returnValue", origin)],
                    origin,
                )
            };
            let condition = if try_stmt.catch_clause.is_none() {
                // Without a catch, an error leaves its message in the
                // returned slot; require a successful pcall as well.
                lua::Expression::binary(
                    lua::BinaryOperator::And,
                    lua::Expression::name("____TS_try", origin),
                    lua::Expression::name("____TS_returned", origin),
                    origin,
                )
            } else {
                lua::Expression::name("____TS_returned", origin)
            };
            out.push(lua::Statement::if_then(
                condition,
                lua::Block::new(vec![propagation]),
                None,
                origin,
            ));
            return Ok(());
        }

        // No returns anywhere: plain pcall, inline catch, then finally.
        out.push(lua::Statement::local(
            vec![
                lua::Identifier::new("____TS_try", origin),
                lua::Identifier::new("____TS_error", origin),
            ],
            vec![pcall],
            origin,
        ));

        if let Some((mut catch_statements, _)) = catch_parts {
            if let Some(variable) = catch_variable {
                catch_statements.insert(
                    0,
                    lua::Statement::local(
                        vec![self.binding_identifier(variable)?],
                        vec![lua::Expression::name("____TS_error", origin)],
                        origin,
                    ),
                );
            }
            out.push(lua::Statement::if_then(
                lua::Expression::unary(
                    lua::UnaryOperator::Not,
                    lua::Expression::name("____TS_try", origin),
                    origin,
                ),
                lua::Block::new(catch_statements),
                None,
                origin,
            ));
        }

        if let Some(finally_block) = &try_stmt.finally_block {
            let (finally_statements, _) =
                self.transform_scoped_statements(finally_block, ScopeKind::Block)?;
            out.extend(finally_statements);
        }

        if try_stmt.catch_clause.is_none() {
            out.push(self.rethrow_statement("____TS_error", statement.span));
        }

        Ok(())
    }

    fn rethrow_statement(&self, slot: &str, span: Span) -> lua::Statement {
        let origin = Some(span);
        lua::Statement::if_then(
            lua::Expression::unary(
                lua::UnaryOperator::Not,
                lua::Expression::name("____TS_try", origin),
                origin,
            ),
            lua::Block::new(vec![lua::Statement::expression(
                lua::Expression::call(
                    lua::Expression::name("error", origin),
                    vec![lua::Expression::name(slot, origin)],
                    origin,
                ),
                origin,
            )]),
            None,
            origin,
        )
    }

    /// Switch lowers to a goto dispatch chain; labels carry the switch
    /// scope id so nested switches stay unambiguous.
    fn transform_switch_statement(
        &mut self,
        statement: &Statement,
        switch: &SwitchStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        if !self.options.lua_target.supports_goto() {
            return Err(TransformError::unsupported_for_target(
                statement.span,
                "switch statements",
                self.options.lua_target.display_name(),
            ));
        }
        let origin = Some(statement.span);
        self.scopes.push(ScopeKind::Switch);
        let id = self.scopes.peek().map(|scope| scope.id).unwrap_or(0);
        let value_name = format!("____TS_switch{id}");
        let end_label = format!("____TS_switch{id}_end");
        let default_label = format!("____TS_switch{id}_default");

        let result = (|| -> TransformResult<Vec<lua::Statement>> {
            let mut body = Vec::new();
            let value = self.transform_expression(&switch.expression)?;
            body.push(lua::Statement::local(
                vec![lua::Identifier::new(value_name.clone(), origin)],
                vec![value],
                origin,
            ));

            let mut has_default = false;
            for (i, clause) in switch.clauses.iter().enumerate() {
                match &clause.test {
                    Some(test) => {
                        let test = self.transform_expression(test)?;
                        body.push(lua::Statement::if_then(
                            lua::Expression::binary(
                                lua::BinaryOperator::Equal,
                                lua::Expression::name(value_name.clone(), origin),
                                test,
                                origin,
                            ),
                            lua::Block::new(vec![lua::Statement::goto(
                                format!("____TS_switch{id}_case_{i}"),
                                origin,
                            )]),
                            None,
                            origin,
                        ));
                    }
                    None => has_default = true,
                }
            }
            body.push(lua::Statement::goto(
                if has_default {
                    default_label.clone()
                } else {
                    end_label.clone()
                },
                origin,
            ));

            for (i, clause) in switch.clauses.iter().enumerate() {
                let label = match clause.test {
                    Some(_) => format!("____TS_switch{id}_case_{i}"),
                    None => default_label.clone(),
                };
                body.push(lua::Statement::label(label, origin));
                for inner in &clause.statements {
                    self.transform_statement(inner, &mut body)?;
                }
            }
            body.push(lua::Statement::label(end_label.clone(), origin));
            Ok(body)
        })();

        let body = match result {
            Ok(body) => body,
            Err(error) => {
                return Err(error);
            }
        };
        let scope = self.scopes.pop(statement.span)?;
        let body = super::hoisting::rewrite(&scope, body, &self.symbols, self.options)?;
        out.push(lua::Statement::do_block(lua::Block::new(body), origin));
        Ok(())
    }

    /// Expression statements: only calls and assignments exist in Lua, so
    /// everything else is lowered accordingly.
    pub(crate) fn transform_expression_statement(
        &mut self,
        expression: &Expression,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(expression.span);
        match &expression.kind {
            ExpressionKind::Assignment { target, op, value } => {
                self.lower_assignment_statement(expression, target, *op, value, out)
            }
            ExpressionKind::Update { op, target, .. } => {
                let binary = match op {
                    crate::ast::expression::UpdateOp::Increment => {
                        crate::ast::expression::BinaryOp::Add
                    }
                    crate::ast::expression::UpdateOp::Decrement => {
                        crate::ast::expression::BinaryOp::Subtract
                    }
                };
                self.lower_compound_assignment_statement(
                    expression,
                    target,
                    binary,
                    None,
                    out,
                )
            }
            ExpressionKind::Delete(target) => {
                let place = self.transform_assignment_target(target)?;
                out.push(lua::Statement::assign(
                    vec![place],
                    vec![lua::Expression::nil(origin)],
                    origin,
                ));
                Ok(())
            }
            ExpressionKind::Call { callee, arguments } => {
                // @luaTable set is only valid here, as a raw assignment.
                if let ExpressionKind::Member { object, property } = &callee.kind {
                    if self.classify_owner(object) == super::builtins::BuiltinOwner::LuaTable
                        && self.resolve(property.name) == "set"
                    {
                        let place = self.transform_lua_table_call(
                            expression, object, "set", arguments, true,
                        )?;
                        let value = self.transform_expression(&arguments[1])?;
                        out.push(lua::Statement::assign(vec![place], vec![value], origin));
                        return Ok(());
                    }
                }
                let call = self.transform_call_expression(expression, callee, arguments)?;
                out.push(lua::Statement::expression(call, origin));
                Ok(())
            }
            _ => {
                let value = self.transform_expression(expression)?;
                match value.kind {
                    lua::ExpressionKind::Call { .. } | lua::ExpressionKind::MethodCall { .. } => {
                        out.push(lua::Statement::expression(value, origin));
                    }
                    _ => {
                        // Preserve evaluation for effectful subexpressions.
                        out.push(lua::Statement::local(
                            vec![lua::Identifier::new("____", origin)],
                            vec![value],
                            origin,
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn lower_assignment_statement(
        &mut self,
        expression: &Expression,
        target: &Expression,
        op: crate::ast::expression::AssignmentOp,
        value: &Expression,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        use crate::ast::expression::AssignmentOp;
        let origin = Some(expression.span);
        match op {
            AssignmentOp::Assign => {
                if crate::ast::expression::is_destructuring_target(target) {
                    return self.transform_destructuring_assignment(target, value, out);
                }
                self.validate_function_conversion(value)?;
                let place = self.transform_assignment_target(target)?;
                let rhs = self.transform_expression(value)?;
                out.push(lua::Statement::assign(vec![place], vec![rhs], origin));
                Ok(())
            }
            _ => {
                let binary = op.binary_op().expect("compound op has a binary op");
                self.lower_compound_assignment_statement(
                    expression,
                    target,
                    binary,
                    Some(value),
                    out,
                )
            }
        }
    }

    /// Compound assignment (or increment/decrement when `value` is None) in
    /// statement position. Receivers and indices with effects are cached in
    /// a `do` block so nothing evaluates twice.
    fn lower_compound_assignment_statement(
        &mut self,
        expression: &Expression,
        target: &Expression,
        op: crate::ast::expression::BinaryOp,
        value: Option<&Expression>,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(expression.span);
        let mut cache = Vec::new();
        let place = self.cached_assignment_place(target, &mut cache)?;
        let rhs = match value {
            Some(value) => self.transform_expression(value)?,
            None => lua::Expression::number(1.0, origin),
        };
        let result = self.lower_compound_value(op, place.clone(), rhs, expression.span)?;
        let assignment = lua::Statement::assign(vec![place], vec![result], origin);

        if cache.is_empty() {
            out.push(assignment);
        } else {
            cache.push(assignment);
            out.push(lua::Statement::do_block(lua::Block::new(cache), origin));
        }
        Ok(())
    }
}
