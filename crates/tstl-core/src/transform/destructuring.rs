use super::LuaTransformer;
use crate::ast::expression::{Expression, ExpressionKind};
use crate::ast::pattern::*;
use crate::ast::statement::{ForInStatement, ForOfStatement, ForTarget, Statement, VariableDeclarator};
use crate::ast::Ident;
use crate::directives::DirectiveKind;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::lualib::LuaLibFeature;
use crate::scope::ScopeKind;
use crate::span::Span;
use crate::symbols::{NameMangler, SymbolId};

/// How a destructured right-hand side produces its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RhsKind {
    /// A @tupleReturn call: already multiple Lua values, no unpack.
    TupleCall,
    /// Array-typed: unpack before the multi-assignment.
    Array,
    /// Anything else: bind a temporary and index it.
    Other,
}

impl LuaTransformer<'_> {
    /// A declared identifier as a Lua identifier, with its symbol minted.
    pub(crate) fn binding_identifier(&mut self, ident: &Ident) -> TransformResult<lua::Identifier> {
        let text = self.resolve(ident.name);
        let name = NameMangler::mangle(text);
        let mut lua_ident = match self.oracle.symbol_of(ident.id) {
            Some(symbol) => {
                let id = self.symbols.id_for(symbol, ident.span);
                lua::Identifier::with_symbol(name.clone(), id, Some(ident.span))
            }
            None => lua::Identifier::new(name.clone(), Some(ident.span)),
        };
        if lua_ident.text != text {
            lua_ident = lua_ident.with_original(text);
        }
        Ok(lua_ident)
    }

    pub(crate) fn binding_symbol(&mut self, ident: &Ident) -> Option<SymbolId> {
        self.oracle
            .symbol_of(ident.id)
            .map(|symbol| self.symbols.id_for(symbol, ident.span))
    }

    fn classify_rhs(&self, initializer: &Expression) -> RhsKind {
        if let ExpressionKind::Call { .. } = &initializer.kind {
            if let Some(signature) = self.oracle.resolved_signature(initializer.id) {
                if signature.tuple_return {
                    return RhsKind::TupleCall;
                }
            }
        }
        if self.type_of(initializer.id).is_array_like() {
            return RhsKind::Array;
        }
        RhsKind::Other
    }

    /// Lower one `let`/`const` declarator, including destructuring forms.
    pub(crate) fn bind_variable_declarator(
        &mut self,
        declarator: &VariableDeclarator,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let span = declarator.span;
        match &declarator.binding {
            Binding::Identifier(ident) => {
                if let Some(initializer) = &declarator.initializer {
                    self.validate_function_conversion(initializer)?;
                }
                let value = declarator
                    .initializer
                    .as_ref()
                    .map(|initializer| self.transform_expression(initializer))
                    .transpose()?;

                // Exported declarations write straight into the exports
                // table; references rewrite to the same field.
                if let Some(symbol) = self.oracle.symbol_of(ident.id) {
                    if let Some(table) = self.exported_table_for(symbol) {
                        self.symbols.id_for(symbol, ident.span);
                        out.push(lua::Statement::assign(
                            vec![lua::Expression::member(
                                lua::Expression::name(table, Some(span)),
                                self.resolve(ident.name),
                                Some(span),
                            )],
                            vec![value.unwrap_or_else(|| lua::Expression::nil(Some(span)))],
                            Some(span),
                        ));
                        return Ok(());
                    }
                }

                let lua_ident = self.binding_identifier(ident)?;
                let symbol = self.binding_symbol(ident);
                self.emit_local_declaration(
                    out,
                    vec![(symbol, lua_ident)],
                    value.into_iter().collect(),
                    span,
                );
                Ok(())
            }
            Binding::Array(pattern) => {
                let Some(initializer) = &declarator.initializer else {
                    return Err(TransformError::unsupported_kind(
                        span,
                        "array destructuring without an initializer",
                    ));
                };
                self.bind_array_pattern(pattern, initializer, span, out)
            }
            Binding::Object(pattern) => {
                let Some(initializer) = &declarator.initializer else {
                    return Err(TransformError::unsupported_kind(
                        span,
                        "object destructuring without an initializer",
                    ));
                };
                let source = self.transform_expression(initializer)?;
                let source = self.materialize_source(source, span, out);
                self.bind_object_pattern(pattern, source, span, out)
            }
        }
    }

    fn bind_array_pattern(
        &mut self,
        pattern: &ArrayBinding,
        initializer: &Expression,
        span: Span,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let kind = self.classify_rhs(initializer);
        let simple = pattern.elements.iter().all(|element| {
            matches!(
                element,
                ArrayBindingElement::Hole
                    | ArrayBindingElement::Element(BindingElement {
                        binding: Binding::Identifier(_),
                        default: None,
                    })
            )
        });

        if simple {
            let mut names = Vec::new();
            for element in &pattern.elements {
                match element {
                    ArrayBindingElement::Element(BindingElement {
                        binding: Binding::Identifier(ident),
                        ..
                    }) => {
                        let lua_ident = self.binding_identifier(ident)?;
                        let symbol = self.binding_symbol(ident);
                        names.push((symbol, lua_ident));
                    }
                    ArrayBindingElement::Hole => {
                        names.push((None, lua::Identifier::new("____", Some(span))));
                    }
                    ArrayBindingElement::Rest(_) => unreachable!("rest is not simple"),
                    ArrayBindingElement::Element(_) => unreachable!("nested binding is not simple"),
                }
            }
            let value = self.transform_expression(initializer)?;
            let values = match kind {
                RhsKind::TupleCall => vec![value],
                RhsKind::Array => vec![lua::Expression::call(
                    self.unpack_reference(Some(span)),
                    vec![value],
                    Some(span),
                )],
                RhsKind::Other => {
                    // Bind a temporary and index element-wise.
                    let source = self.materialize_source(value, span, out);
                    return self.bind_array_pattern_elementwise(pattern, source, span, out);
                }
            };
            self.emit_local_declaration(out, names, values, span);
            return Ok(());
        }

        let value = self.transform_expression(initializer)?;
        // Rest, defaults and nesting all go element-wise over a table.
        let value = match kind {
            RhsKind::TupleCall => {
                lua::Expression::table(vec![lua::TableField::Positional(value)], Some(span))
            }
            _ => value,
        };
        let source = self.materialize_source(value, span, out);
        self.bind_array_pattern_elementwise(pattern, source, span, out)
    }

    /// Bind a value to a temporary unless it is already re-readable.
    fn materialize_source(
        &mut self,
        value: lua::Expression,
        span: Span,
        out: &mut Vec<lua::Statement>,
    ) -> lua::Expression {
        if value.is_simple() {
            return value;
        }
        let temp = self.temp_name();
        out.push(lua::Statement::local(
            vec![lua::Identifier::new(temp.clone(), Some(span))],
            vec![value],
            Some(span),
        ));
        lua::Expression::name(temp, Some(span))
    }

    pub(crate) fn bind_array_pattern_elementwise(
        &mut self,
        pattern: &ArrayBinding,
        source: lua::Expression,
        span: Span,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(span);
        for (i, element) in pattern.elements.iter().enumerate() {
            let index = lua::Expression::number((i + 1) as f64, origin);
            match element {
                ArrayBindingElement::Hole => {}
                ArrayBindingElement::Rest(ident) => {
                    let lua_ident = self.binding_identifier(ident)?;
                    let symbol = self.binding_symbol(ident);
                    let rest = lua::Expression::table(
                        vec![lua::TableField::Positional(lua::Expression::call(
                            self.unpack_reference(origin),
                            vec![source.clone(), lua::Expression::number((i + 1) as f64, origin)],
                            origin,
                        ))],
                        origin,
                    );
                    self.emit_local_declaration(out, vec![(symbol, lua_ident)], vec![rest], span);
                    break;
                }
                ArrayBindingElement::Element(element) => {
                    let value = lua::Expression::index(source.clone(), index, origin);
                    self.bind_element(&element.binding, element.default.as_ref(), value, span, out)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn bind_object_pattern(
        &mut self,
        pattern: &ObjectBinding,
        source: lua::Expression,
        span: Span,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        if let Some(rest) = &pattern.rest {
            return Err(TransformError::forbidden_ellipsis_destruction(rest.span));
        }
        let origin = Some(span);
        for property in &pattern.properties {
            let key = self.resolve(property.key.name);
            let value = lua::Expression::member(source.clone(), key, origin);
            match &property.binding {
                None => {
                    // Shorthand: the key is also the bound name.
                    self.bind_element(
                        &Binding::Identifier(property.key),
                        property.default.as_ref(),
                        value,
                        property.span,
                        out,
                    )?;
                }
                Some(binding) => {
                    self.bind_element(binding, property.default.as_ref(), value, property.span, out)?;
                }
            }
        }
        Ok(())
    }

    /// Bind one pattern position to a value, applying the default when the
    /// value is nil, recursing into nested patterns via a temporary.
    fn bind_element(
        &mut self,
        binding: &Binding,
        default: Option<&Expression>,
        value: lua::Expression,
        span: Span,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(span);
        match binding {
            Binding::Identifier(ident) => {
                let lua_ident = self.binding_identifier(ident)?;
                let name = lua_ident.text.clone();
                let symbol = self.binding_symbol(ident);
                self.emit_local_declaration(out, vec![(symbol, lua_ident)], vec![value], span);
                if let Some(default) = default {
                    let default = self.transform_expression(default)?;
                    out.push(default_guard(&name, default, origin));
                }
                Ok(())
            }
            Binding::Array(nested) => {
                let temp = self.temp_name();
                out.push(lua::Statement::local(
                    vec![lua::Identifier::new(temp.clone(), origin)],
                    vec![value],
                    origin,
                ));
                if let Some(default) = default {
                    let default = self.transform_expression(default)?;
                    out.push(default_guard(&temp, default, origin));
                }
                self.bind_array_pattern_elementwise(
                    nested,
                    lua::Expression::name(temp, origin),
                    span,
                    out,
                )
            }
            Binding::Object(nested) => {
                let temp = self.temp_name();
                out.push(lua::Statement::local(
                    vec![lua::Identifier::new(temp.clone(), origin)],
                    vec![value],
                    origin,
                ));
                if let Some(default) = default {
                    let default = self.transform_expression(default)?;
                    out.push(default_guard(&temp, default, origin));
                }
                self.bind_object_pattern(nested, lua::Expression::name(temp, origin), span, out)
            }
        }
    }

    /// Destructuring assignment (not a declaration): an array literal on
    /// the left becomes a multi-value assignment.
    pub(crate) fn transform_destructuring_assignment(
        &mut self,
        target: &Expression,
        value: &Expression,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(target.span);
        match &target.kind {
            ExpressionKind::Array(elements) => {
                let all_plain = elements.iter().all(|element| {
                    matches!(
                        element.kind,
                        ExpressionKind::Identifier(_)
                            | ExpressionKind::Member { .. }
                            | ExpressionKind::Index { .. }
                    )
                });
                if all_plain {
                    let mut targets = Vec::new();
                    for element in elements {
                        targets.push(self.transform_assignment_target(element)?);
                    }
                    let rhs = self.transform_expression(value)?;
                    let rhs = match self.classify_rhs(value) {
                        RhsKind::TupleCall => rhs,
                        _ => lua::Expression::call(
                            self.unpack_reference(origin),
                            vec![rhs],
                            origin,
                        ),
                    };
                    out.push(lua::Statement::assign(targets, vec![rhs], origin));
                    return Ok(());
                }

                // Holes or nested targets: stage through a temporary table.
                let rhs = self.transform_expression(value)?;
                let rhs = match self.classify_rhs(value) {
                    RhsKind::TupleCall => lua::Expression::table(
                        vec![lua::TableField::Positional(rhs)],
                        origin,
                    ),
                    _ => rhs,
                };
                let mut statements = Vec::new();
                let source = self.materialize_source(rhs, target.span, &mut statements);
                for (i, element) in elements.iter().enumerate() {
                    let index = lua::Expression::number((i + 1) as f64, origin);
                    match &element.kind {
                        ExpressionKind::Omitted => {}
                        ExpressionKind::Spread(_) => {
                            return Err(TransformError::new(
                                TransformErrorKind::CouldNotCast,
                                element.span,
                                "rest elements are not supported in destructuring assignments",
                            ));
                        }
                        ExpressionKind::Array(_) | ExpressionKind::Object(_) => {
                            return Err(TransformError::unsupported_kind(
                                element.span,
                                "nested destructuring assignment targets",
                            ));
                        }
                        _ => {
                            let place = self.transform_assignment_target(element)?;
                            statements.push(lua::Statement::assign(
                                vec![place],
                                vec![lua::Expression::index(source.clone(), index, origin)],
                                origin,
                            ));
                        }
                    }
                }
                out.push(lua::Statement::do_block(lua::Block::new(statements), origin));
                Ok(())
            }
            ExpressionKind::Object(_) => Err(TransformError::unsupported_kind(
                target.span,
                "object destructuring assignment targets",
            )),
            _ => Err(TransformError::unsupported_kind(
                target.span,
                "destructuring assignment target",
            )),
        }
    }

    // --- for...of / for...in ---

    pub(crate) fn transform_for_of_statement(
        &mut self,
        statement: &Statement,
        for_of: &ForOfStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let expression = &for_of.expression;

        // @forRange calls become numeric for loops.
        if let ExpressionKind::Call { callee, arguments } = &expression.kind {
            if self.node_symbol_has_directive(callee.id, DirectiveKind::ForRange, callee.span) {
                return self.transform_for_range(statement, for_of, arguments, out);
            }
        }

        let lua_iterator = self.is_lua_iterator(expression);

        if lua_iterator {
            let tuple_return = self.iterator_is_tuple_return(expression);
            if tuple_return {
                let variables = self.tuple_loop_variables(&for_of.binding, statement.span)?;
                let iterable = self.transform_expression(expression)?;
                let body = self.transform_loop_body(&for_of.body, None, origin)?;
                out.push(lua::Statement::new(
                    lua::StatementKind::GenericFor {
                        variables,
                        expressions: vec![iterable],
                        body,
                    },
                    origin,
                ));
                return Ok(());
            }

            let (variable, preamble) = self.loop_variable(&for_of.binding, statement.span)?;
            let iterable = self.transform_expression(expression)?;
            let body = self.transform_loop_body(&for_of.body, preamble, origin)?;
            out.push(lua::Statement::new(
                lua::StatementKind::GenericFor {
                    variables: vec![variable],
                    expressions: vec![iterable],
                    body,
                },
                origin,
            ));
            return Ok(());
        }

        if self.type_of(expression.id).is_array_like() {
            let (variable, preamble) = self.loop_variable(&for_of.binding, statement.span)?;
            let iterable = self.transform_expression(expression)?;
            let body = self.transform_loop_body(&for_of.body, preamble, origin)?;
            out.push(lua::Statement::new(
                lua::StatementKind::GenericFor {
                    variables: vec![lua::Identifier::new("____", origin), variable],
                    expressions: vec![lua::Expression::call(
                        lua::Expression::name("ipairs", origin),
                        vec![iterable],
                        origin,
                    )],
                    body,
                },
                origin,
            ));
            return Ok(());
        }

        // General iterables run through the runtime iterator bridge.
        let (variable, preamble) = self.loop_variable(&for_of.binding, statement.span)?;
        let helper = self.use_lualib(LuaLibFeature::Iterator);
        let iterable = self.transform_expression(expression)?;
        let body = self.transform_loop_body(&for_of.body, preamble, origin)?;
        out.push(lua::Statement::new(
            lua::StatementKind::GenericFor {
                variables: vec![variable],
                expressions: vec![lua::Expression::call(helper, vec![iterable], origin)],
                body,
            },
            origin,
        ));
        Ok(())
    }

    fn is_lua_iterator(&self, expression: &Expression) -> bool {
        if self.node_symbol_has_directive(expression.id, DirectiveKind::LuaIterator, expression.span)
        {
            return true;
        }
        if let ExpressionKind::Call { callee, .. } = &expression.kind {
            if self.node_symbol_has_directive(callee.id, DirectiveKind::LuaIterator, callee.span) {
                return true;
            }
            if let Some(signature) = self.oracle.resolved_signature(expression.id) {
                return signature.has_directive(DirectiveKind::LuaIterator);
            }
        }
        false
    }

    fn iterator_is_tuple_return(&self, expression: &Expression) -> bool {
        if let ExpressionKind::Call { callee, .. } = &expression.kind {
            if let Some(signature) = self.oracle.resolved_signature(expression.id) {
                if signature.tuple_return {
                    return true;
                }
            }
            if self.node_symbol_has_directive(callee.id, DirectiveKind::TupleReturn, callee.span) {
                return true;
            }
        }
        self.node_symbol_has_directive(
            expression.id,
            DirectiveKind::TupleReturn,
            expression.span,
        )
    }

    fn transform_for_range(
        &mut self,
        statement: &Statement,
        for_of: &ForOfStatement,
        arguments: &[Expression],
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        if !(2..=3).contains(&arguments.len()) {
            return Err(TransformError::invalid_for_range_call(
                statement.span,
                "expected 2 or 3 arguments",
            ));
        }
        if !arguments.iter().all(|arg| self.expression_is_numeric(arg)) {
            return Err(TransformError::invalid_for_range_call(
                statement.span,
                "arguments must be numbers",
            ));
        }
        let ForTarget::Declaration(_, Binding::Identifier(ident)) = &for_of.binding else {
            return Err(TransformError::invalid_for_range_call(
                statement.span,
                "the loop variable must be a single identifier",
            ));
        };

        let variable = self.binding_identifier(ident)?;
        let start = self.transform_expression(&arguments[0])?;
        let limit = self.transform_expression(&arguments[1])?;
        let step = arguments
            .get(2)
            .map(|argument| self.transform_expression(argument))
            .transpose()?;
        let body = self.transform_loop_body(&for_of.body, None, origin)?;
        out.push(lua::Statement::new(
            lua::StatementKind::NumericFor {
                variable,
                start,
                limit,
                step,
                body,
            },
            origin,
        ));
        Ok(())
    }

    /// The loop variables of a tuple-return lua iterator: a flat array
    /// destructuring of plain identifiers.
    fn tuple_loop_variables(
        &mut self,
        binding: &ForTarget,
        span: Span,
    ) -> TransformResult<Vec<lua::Identifier>> {
        match binding {
            ForTarget::Declaration(_, Binding::Array(pattern)) => {
                let mut variables = Vec::new();
                for element in &pattern.elements {
                    match element {
                        ArrayBindingElement::Element(BindingElement {
                            binding: Binding::Identifier(ident),
                            default: None,
                        }) => variables.push(self.binding_identifier(ident)?),
                        ArrayBindingElement::Hole => {
                            variables.push(lua::Identifier::new("____", Some(span)))
                        }
                        _ => {
                            return Err(TransformError::unsupported_kind(
                                span,
                                "complex destructuring of a lua iterator",
                            ))
                        }
                    }
                }
                if variables.is_empty() {
                    return Err(TransformError::missing_for_of_variables(span));
                }
                Ok(variables)
            }
            _ => Err(TransformError::new(
                TransformErrorKind::UnsupportedNonDestructuringLuaIterator,
                span,
                "a @tupleReturn lua iterator must be destructured in for...of",
            )),
        }
    }

    /// A single loop variable plus an optional body preamble for bindings
    /// that need destructuring or assignment to an existing target.
    fn loop_variable(
        &mut self,
        binding: &ForTarget,
        span: Span,
    ) -> TransformResult<(lua::Identifier, Option<Vec<LoopPreamble>>)> {
        match binding {
            ForTarget::Declaration(_, Binding::Identifier(ident)) => {
                Ok((self.binding_identifier(ident)?, None))
            }
            ForTarget::Declaration(_, Binding::Array(pattern)) => {
                if pattern.elements.is_empty() {
                    return Err(TransformError::missing_for_of_variables(span));
                }
                let temp = self.temp_name();
                Ok((
                    lua::Identifier::new(temp.clone(), Some(span)),
                    Some(vec![LoopPreamble::ArrayPattern(pattern.clone(), temp)]),
                ))
            }
            ForTarget::Declaration(_, Binding::Object(_)) => Err(TransformError::new(
                TransformErrorKind::UnsupportedObjectDestructuringInForOf,
                span,
                "object destructuring is not supported in for...of",
            )),
            ForTarget::Expression(target) => {
                let temp = self.temp_name();
                Ok((
                    lua::Identifier::new(temp.clone(), Some(span)),
                    Some(vec![LoopPreamble::AssignTo(target.clone(), temp)]),
                ))
            }
        }
    }

    /// Transform a loop body with its Loop scope, emitting the preamble
    /// first and the continue label last.
    fn transform_loop_body(
        &mut self,
        body: &crate::ast::statement::Block,
        preamble: Option<Vec<LoopPreamble>>,
        origin: Option<Span>,
    ) -> TransformResult<lua::Block> {
        self.scopes.push(ScopeKind::Loop);
        let mut statements = Vec::new();

        if let Some(preamble) = preamble {
            for entry in preamble {
                match entry {
                    LoopPreamble::ArrayPattern(pattern, source) => {
                        let source = lua::Expression::name(source, origin);
                        self.bind_array_pattern_elementwise(
                            &pattern,
                            source,
                            origin.unwrap_or_default(),
                            &mut statements,
                        )?;
                    }
                    LoopPreamble::AssignTo(target, source) => {
                        let place = self.transform_assignment_target(&target)?;
                        statements.push(lua::Statement::assign(
                            vec![place],
                            vec![lua::Expression::name(source, origin)],
                            origin,
                        ));
                    }
                }
            }
        }

        for statement in &body.statements {
            self.transform_statement(statement, &mut statements)?;
        }
        let scope = self.scopes.pop(body.span)?;
        let mut statements =
            super::hoisting::rewrite(&scope, statements, &self.symbols, self.options)?;
        if scope.loop_continued {
            statements.push(lua::Statement::label(format!("__continue{}", scope.id), origin));
        }
        Ok(lua::Block::new(statements))
    }

    pub(crate) fn transform_for_in_statement(
        &mut self,
        statement: &Statement,
        for_in: &ForInStatement,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        if self.type_of(for_in.expression.id).is_array_like() {
            return Err(TransformError::forbidden_for_in(statement.span));
        }
        let ForTarget::Declaration(_, Binding::Identifier(ident)) = &for_in.binding else {
            return Err(TransformError::unsupported_kind(
                statement.span,
                "destructuring in for...in",
            ));
        };
        let variable = self.binding_identifier(ident)?;
        let object = self.transform_expression(&for_in.expression)?;
        let body = self.transform_loop_body(&for_in.body, None, origin)?;
        out.push(lua::Statement::new(
            lua::StatementKind::GenericFor {
                variables: vec![variable],
                expressions: vec![lua::Expression::call(
                    lua::Expression::name("pairs", origin),
                    vec![object],
                    origin,
                )],
                body,
            },
            origin,
        ));
        Ok(())
    }
}

/// Work deferred into a loop body before user statements.
enum LoopPreamble {
    ArrayPattern(ArrayBinding, String),
    AssignTo(Expression, String),
}

/// `if name == nil then name = default end`
fn default_guard(name: &str, default: lua::Expression, origin: Option<Span>) -> lua::Statement {
    lua::Statement::if_then(
        lua::Expression::binary(
            lua::BinaryOperator::Equal,
            lua::Expression::name(name, origin),
            lua::Expression::nil(origin),
            origin,
        ),
        lua::Block::new(vec![lua::Statement::assign(
            vec![lua::Expression::name(name, origin)],
            vec![default],
            origin,
        )]),
        None,
        origin,
    )
}
