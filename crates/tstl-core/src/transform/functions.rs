use super::{FunctionFrame, LuaTransformer};
use crate::ast::expression::{ArrowBody, ArrowFunction, Expression, FunctionExpression};
use crate::ast::statement::{Block, FunctionDeclaration, Parameter, Statement};
use crate::ast::types::TypeNode;
use crate::ast::NodeId;
use crate::directives::DirectiveKind;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::oracle::{ContextType, Type};
use crate::scope::{FunctionDefinitionInfo, ScopeKind};
use crate::span::Span;
use rustc_hash::FxHashSet;

/// A lowered function head and body, before self-parameter insertion.
pub(crate) struct LoweredFunction {
    pub parameters: Vec<lua::Identifier>,
    pub is_vararg: bool,
    pub body: lua::Block,
}

impl LuaTransformer<'_> {
    /// Whether a function receives an implicit self parameter. An explicit
    /// `this` parameter decides outright; `@noSelf`/`@noSelfInFile` force a
    /// context-free function; otherwise the oracle's function type decides,
    /// defaulting to context-free so declaration and call sites agree under
    /// a partial oracle.
    pub(crate) fn function_takes_self(
        &self,
        this_param: Option<&TypeNode>,
        symbol_node: Option<NodeId>,
        span: Span,
    ) -> bool {
        if let Some(this_param) = this_param {
            return !this_param.is_void();
        }
        if self.no_self_in_file {
            return false;
        }
        if let Some(node) = symbol_node {
            if self.node_symbol_has_directive(node, DirectiveKind::NoSelf, span) {
                return false;
            }
            if let Type::Function(function) = self.type_of(node) {
                return function.context == ContextType::NonVoid;
            }
        }
        false
    }

    /// Whether a declaration is marked @tupleReturn, via its doc comment or
    /// its symbol.
    pub(crate) fn is_tuple_return_declaration(
        &self,
        doc: Option<&crate::ast::DocComment>,
        node: NodeId,
        span: Span,
    ) -> bool {
        if let Some(doc) = doc {
            if self
                .directives
                .parse_doc(doc, span)
                .iter()
                .any(|d| d.kind == DirectiveKind::TupleReturn)
            {
                return true;
            }
        }
        self.node_symbol_has_directive(node, DirectiveKind::TupleReturn, span)
    }

    /// Lower a parameter list and body into a Lua function. Pushes a
    /// function frame and scope, runs the hoister on the body, and wraps
    /// generators into their coroutine-backed iterator shape.
    pub(crate) fn lower_function(
        &mut self,
        parameters: &[Parameter],
        body: &Block,
        add_self: bool,
        tuple_return: bool,
        is_generator: bool,
    ) -> TransformResult<LoweredFunction> {
        self.function_stack.push(FunctionFrame {
            tuple_return,
            try_depth: 0,
            is_generator,
        });
        self.scopes.push(ScopeKind::Function);

        let result = (|| -> TransformResult<(Vec<lua::Identifier>, bool, Vec<lua::Statement>)> {
            let mut statements = Vec::new();
            let (lua_params, is_vararg) = self.lower_parameters(parameters, &mut statements)?;
            for statement in &body.statements {
                self.transform_statement(statement, &mut statements)?;
            }
            Ok((lua_params, is_vararg, statements))
        })();

        let (mut lua_params, is_vararg, statements) = match result {
            Ok(parts) => parts,
            Err(error) => {
                self.function_stack.pop();
                return Err(error);
            }
        };

        let scope = self.scopes.pop(body.span)?;
        let statements = super::hoisting::rewrite(&scope, statements, &self.symbols, self.options)?;
        self.function_stack.pop();

        if add_self {
            lua_params.insert(
                0,
                lua::Identifier::new(super::SELF_PARAMETER, Some(body.span)),
            );
        }

        let body = if is_generator {
            self.wrap_generator_body(lua::Block::new(statements), body.span)
        } else {
            lua::Block::new(statements)
        };

        Ok(LoweredFunction {
            parameters: lua_params,
            is_vararg,
            body,
        })
    }

    pub(crate) fn lower_parameters(
        &mut self,
        parameters: &[Parameter],
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<(Vec<lua::Identifier>, bool)> {
        use crate::ast::pattern::Binding;

        let mut lua_params = Vec::new();
        let mut is_vararg = false;

        for (i, parameter) in parameters.iter().enumerate() {
            if parameter.is_rest {
                is_vararg = true;
                if let Binding::Identifier(ident) = &parameter.binding {
                    let lua_ident = self.binding_identifier(ident)?;
                    let symbol = self.binding_symbol(ident);
                    self.emit_local_declaration(
                        out,
                        vec![(symbol, lua_ident)],
                        vec![lua::Expression::table(
                            vec![lua::TableField::Positional(lua::Expression::dots(Some(
                                parameter.span,
                            )))],
                            Some(parameter.span),
                        )],
                        parameter.span,
                    );
                }
                break;
            }

            match &parameter.binding {
                Binding::Identifier(ident) => {
                    let lua_ident = self.binding_identifier(ident)?;
                    let name = lua_ident.text.clone();
                    lua_params.push(lua_ident);
                    if let Some(default) = &parameter.default {
                        let default = self.transform_expression(default)?;
                        out.push(parameter_default_guard(&name, default, parameter.span));
                    }
                }
                Binding::Array(pattern) => {
                    let temp = format!("____TS_param{i}");
                    lua_params.push(lua::Identifier::new(temp.clone(), Some(parameter.span)));
                    if let Some(default) = &parameter.default {
                        let default = self.transform_expression(default)?;
                        out.push(parameter_default_guard(&temp, default, parameter.span));
                    }
                    self.bind_array_pattern_for_parameter(pattern, &temp, parameter.span, out)?;
                }
                Binding::Object(pattern) => {
                    let temp = format!("____TS_param{i}");
                    lua_params.push(lua::Identifier::new(temp.clone(), Some(parameter.span)));
                    if let Some(default) = &parameter.default {
                        let default = self.transform_expression(default)?;
                        out.push(parameter_default_guard(&temp, default, parameter.span));
                    }
                    let source = lua::Expression::name(temp, Some(parameter.span));
                    self.bind_object_pattern(pattern, source, parameter.span, out)?;
                }
            }
        }

        Ok((lua_params, is_vararg))
    }

    /// Generators return a coroutine-backed iterator object whose `next`
    /// resumes the coroutine and reports done-ness from its status.
    fn wrap_generator_body(&self, inner: lua::Block, span: Span) -> lua::Block {
        let origin = Some(span);
        let co = "____TS_co";

        let create = lua::Statement::local(
            vec![lua::Identifier::new(co, origin)],
            vec![lua::Expression::call(
                lua::Expression::member(
                    lua::Expression::name("coroutine", origin),
                    "create",
                    origin,
                ),
                vec![lua::Expression::function(Vec::new(), false, inner, origin)],
                origin,
            )],
            origin,
        );

        let next_body = lua::Block::new(vec![
            lua::Statement::local(
                vec![
                    lua::Identifier::new("____TS_ok", origin),
                    lua::Identifier::new("____TS_value", origin),
                ],
                vec![lua::Expression::call(
                    lua::Expression::member(
                        lua::Expression::name("coroutine", origin),
                        "resume",
                        origin,
                    ),
                    vec![lua::Expression::name(co, origin), lua::Expression::dots(origin)],
                    origin,
                )],
                origin,
            ),
            lua::Statement::if_then(
                lua::Expression::unary(
                    lua::UnaryOperator::Not,
                    lua::Expression::name("____TS_ok", origin),
                    origin,
                ),
                lua::Block::new(vec![lua::Statement::expression(
                    lua::Expression::call(
                        lua::Expression::name("error", origin),
                        vec![lua::Expression::name("____TS_value", origin)],
                        origin,
                    ),
                    origin,
                )]),
                None,
                origin,
            ),
            lua::Statement::ret(
                vec![lua::Expression::table(
                    vec![
                        lua::TableField::Named {
                            key: "done".to_string(),
                            value: lua::Expression::binary(
                                lua::BinaryOperator::Equal,
                                lua::Expression::call(
                                    lua::Expression::member(
                                        lua::Expression::name("coroutine", origin),
                                        "status",
                                        origin,
                                    ),
                                    vec![lua::Expression::name(co, origin)],
                                    origin,
                                ),
                                lua::Expression::string("dead", origin),
                                origin,
                            ),
                        },
                        lua::TableField::Named {
                            key: "value".to_string(),
                            value: lua::Expression::name("____TS_value", origin),
                        },
                    ],
                    origin,
                )],
                origin,
            ),
        ]);

        let iterator = lua::Statement::ret(
            vec![lua::Expression::table(
                vec![lua::TableField::Named {
                    key: "next".to_string(),
                    value: lua::Expression::function(
                        vec![lua::Identifier::new("____", origin)],
                        true,
                        next_body,
                        origin,
                    ),
                }],
                origin,
            )],
            origin,
        );

        lua::Block::new(vec![create, iterator])
    }

    pub(crate) fn transform_function_declaration(
        &mut self,
        statement: &Statement,
        decl: &FunctionDeclaration,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let Some(name) = &decl.name else {
            return Err(TransformError::missing_function_name(statement.span));
        };
        let text = self.resolve(name.name);

        if decl.is_ambient {
            self.declared_name(text, name.span, true)?;
            return Ok(());
        }
        let Some(body) = &decl.body else {
            // Overload signatures carry no body and emit nothing.
            return Ok(());
        };

        let add_self = self.function_takes_self(decl.this_param.as_ref(), Some(name.id), decl.span);
        let tuple_return = self.is_tuple_return_declaration(decl.doc.as_ref(), name.id, decl.span);

        self.capture_stack.push(FxHashSet::default());
        let lowered = self.lower_function(
            &decl.parameters,
            body,
            add_self,
            tuple_return,
            decl.is_generator,
        );
        let captures = self.capture_stack.pop().unwrap_or_default();
        let lowered = lowered?;

        let function = lua::Expression::function(
            lowered.parameters,
            lowered.is_vararg,
            lowered.body,
            Some(statement.span),
        );

        if let Some(symbol) = self.oracle.symbol_of(name.id) {
            if let Some(table) = self.exported_table_for(symbol) {
                self.symbols.id_for(symbol, name.span);
                out.push(lua::Statement::assign(
                    vec![lua::Expression::member(
                        lua::Expression::name(table, Some(statement.span)),
                        text,
                        Some(statement.span),
                    )],
                    vec![function],
                    Some(statement.span),
                ));
                return Ok(());
            }
        }

        let lua_ident = self.binding_identifier(name)?;
        let symbol = self.binding_symbol(name);
        self.emit_local_declaration(
            out,
            vec![(symbol, lua_ident)],
            vec![function],
            statement.span,
        );
        if let Some(symbol) = symbol {
            self.scopes.record_function_definition(
                symbol,
                FunctionDefinitionInfo {
                    referenced_symbols: captures,
                    statement_index: Some(out.len() - 1),
                    declared_at: statement.span,
                },
            );
        }
        Ok(())
    }

    pub(crate) fn transform_function_expression(
        &mut self,
        function: &FunctionExpression,
    ) -> TransformResult<lua::Expression> {
        let symbol_node = function.name.as_ref().map(|name| name.id);
        let add_self =
            self.function_takes_self(function.this_param.as_ref(), symbol_node, function.span);
        let lowered = self.lower_function(
            &function.parameters,
            &function.body,
            add_self,
            false,
            function.is_generator,
        )?;
        Ok(lua::Expression::function(
            lowered.parameters,
            lowered.is_vararg,
            lowered.body,
            Some(function.span),
        ))
    }

    /// Arrow functions never take a self parameter; `this` inside them
    /// captures the enclosing function's self upvalue.
    pub(crate) fn transform_arrow_function(
        &mut self,
        arrow: &ArrowFunction,
    ) -> TransformResult<lua::Expression> {
        let body = match &arrow.body {
            ArrowBody::Block(block) => block.clone(),
            ArrowBody::Expression(expression) => Block {
                statements: vec![Statement::new(
                    expression.id,
                    crate::ast::statement::StatementKind::Return(
                        crate::ast::statement::ReturnStatement {
                            expression: Some((**expression).clone()),
                        },
                    ),
                    expression.span,
                )],
                span: arrow.span,
            },
        };
        let lowered = self.lower_function(&arrow.parameters, &body, false, false, false)?;
        Ok(lua::Expression::function(
            lowered.parameters,
            lowered.is_vararg,
            lowered.body,
            Some(arrow.span),
        ))
    }

    /// Reject conversions between self and no-self function values, which
    /// would silently shift every argument by one at runtime.
    pub(crate) fn validate_function_conversion(&self, value: &Expression) -> TransformResult<()> {
        let actual = self.type_of(value.id);
        let Some(expected) = self.oracle.contextual_type(value.id) else {
            return Ok(());
        };
        let (Type::Function(actual), Type::Function(expected)) = (&actual, &expected) else {
            return Ok(());
        };
        match (actual.context, expected.context) {
            (ContextType::NonVoid, ContextType::Void) => Err(TransformError::new(
                TransformErrorKind::UnsupportedNoSelfFunctionConversion,
                value.span,
                "Cannot convert a function with a self parameter to a parameterless-context function type",
            )),
            (ContextType::Void, ContextType::NonVoid) => Err(TransformError::new(
                TransformErrorKind::UnsupportedSelfFunctionConversion,
                value.span,
                "Cannot convert a context-free function to a function type with a self parameter",
            )),
            (ContextType::Mixed, ContextType::Void) | (ContextType::Mixed, ContextType::NonVoid) => {
                Err(TransformError::new(
                    TransformErrorKind::UnsupportedOverloadAssignment,
                    value.span,
                    "Cannot assign an overloaded function to a single-context function type",
                ))
            }
            _ => Ok(()),
        }
    }

    /// Object-pattern binding entry point shared with parameter lowering.
    fn bind_array_pattern_for_parameter(
        &mut self,
        pattern: &crate::ast::pattern::ArrayBinding,
        source: &str,
        span: Span,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let source = lua::Expression::name(source, Some(span));
        self.bind_array_pattern_elementwise(pattern, source, span, out)
    }
}

/// `if p == nil then p = default end`
fn parameter_default_guard(name: &str, default: lua::Expression, span: Span) -> lua::Statement {
    let origin = Some(span);
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
