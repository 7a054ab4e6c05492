use super::LuaTransformer;
use crate::ast::expression::*;
use crate::ast::Ident;
use crate::directives::DirectiveKind;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::lualib::LuaLibFeature;
use crate::oracle::{ContextType, Type};
use crate::symbols::NameMangler;

/// What kind of built-in owner a property access or call receiver is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinOwner {
    Math,
    Console,
    ObjectNamespace,
    SymbolNamespace,
    NumberNamespace,
    StringInstance,
    ArrayInstance,
    FunctionInstance,
    LuaTable,
    None,
}

impl LuaTransformer<'_> {
    pub(crate) fn classify_owner(&self, object: &Expression) -> BuiltinOwner {
        if let ExpressionKind::Identifier(name) = &object.kind {
            match self.resolve(*name) {
                "Math" => return BuiltinOwner::Math,
                "console" => return BuiltinOwner::Console,
                "Object" => return BuiltinOwner::ObjectNamespace,
                "Symbol" => return BuiltinOwner::SymbolNamespace,
                "Number" => return BuiltinOwner::NumberNamespace,
                _ => {}
            }
        }
        let ty = self.type_of(object.id);
        if ty.is_string() {
            return BuiltinOwner::StringInstance;
        }
        if ty.is_array_like() {
            return BuiltinOwner::ArrayInstance;
        }
        if let Type::Class(symbol) = ty {
            if self.symbol_has_directive(symbol, DirectiveKind::LuaTable, object.span) {
                return BuiltinOwner::LuaTable;
            }
        }
        if matches!(ty, Type::Function(_)) {
            return BuiltinOwner::FunctionInstance;
        }
        BuiltinOwner::None
    }

    /// Library property reads: `length`, `Math` constants, luaTable length.
    pub(crate) fn try_builtin_property(
        &mut self,
        expr: &Expression,
        object: &Expression,
        property: &Ident,
    ) -> TransformResult<Option<lua::Expression>> {
        let origin = Some(expr.span);
        let name = self.resolve(property.name);
        match self.classify_owner(object) {
            BuiltinOwner::StringInstance | BuiltinOwner::ArrayInstance if name == "length" => {
                let value = self.transform_expression(object)?;
                Ok(Some(lua::Expression::unary(
                    lua::UnaryOperator::Length,
                    value,
                    origin,
                )))
            }
            BuiltinOwner::LuaTable => match name {
                "length" => {
                    let value = self.transform_expression(object)?;
                    Ok(Some(lua::Expression::unary(
                        lua::UnaryOperator::Length,
                        value,
                        origin,
                    )))
                }
                _ => Err(TransformError::new(
                    TransformErrorKind::ForbiddenLuaTableUseException,
                    expr.span,
                    format!("Invalid @luaTable property access \"{name}\""),
                )),
            },
            BuiltinOwner::Math => match name {
                "PI" => Ok(Some(lua::Expression::member(
                    lua::Expression::name("math", origin),
                    "pi",
                    origin,
                ))),
                "E" => Ok(Some(lua::Expression::number(std::f64::consts::E, origin))),
                "LN10" => Ok(Some(lua::Expression::number(std::f64::consts::LN_10, origin))),
                "LN2" => Ok(Some(lua::Expression::number(std::f64::consts::LN_2, origin))),
                "LOG10E" => Ok(Some(lua::Expression::number(
                    std::f64::consts::LOG10_E,
                    origin,
                ))),
                "LOG2E" => Ok(Some(lua::Expression::number(std::f64::consts::LOG2_E, origin))),
                "SQRT2" => Ok(Some(lua::Expression::number(std::f64::consts::SQRT_2, origin))),
                "SQRT1_2" => Ok(Some(lua::Expression::number(
                    std::f64::consts::FRAC_1_SQRT_2,
                    origin,
                ))),
                _ => Err(TransformError::unsupported_property(expr.span, "Math", name)),
            },
            _ => Ok(None),
        }
    }

    /// Context type of a call: the resolved signature wins, directives on
    /// the callee (or its hosting property symbol) refine it, `@noSelfInFile`
    /// blankets the file.
    fn call_context_type(&self, expr: &Expression, callee: &Expression) -> ContextType {
        if let Some(signature) = self.oracle.resolved_signature(expr.id) {
            if signature.context_type != ContextType::None {
                return signature.context_type;
            }
            if signature.has_directive(DirectiveKind::NoSelf) {
                return ContextType::Void;
            }
        }
        let callee_symbol_node = match &callee.kind {
            ExpressionKind::Member { property, .. } => property.id,
            _ => callee.id,
        };
        if self.node_symbol_has_directive(callee_symbol_node, DirectiveKind::NoSelf, callee.span)
            || self.node_symbol_has_directive(callee.id, DirectiveKind::NoSelf, callee.span)
        {
            return ContextType::Void;
        }
        if self.no_self_in_file {
            return ContextType::Void;
        }
        ContextType::None
    }

    pub(crate) fn transform_call_expression(
        &mut self,
        expr: &Expression,
        callee: &Expression,
        arguments: &[Expression],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);

        // super(...) chains to the base constructor with the current self.
        if matches!(callee.kind, ExpressionKind::Super) {
            let base = self.super_prototype(callee.span)?;
            let mut args = vec![lua::Expression::name(super::SELF_PARAMETER, origin)];
            args.extend(self.transform_arguments(arguments)?);
            return Ok(lua::Expression::call(
                lua::Expression::member(base, "____constructor", origin),
                args,
                origin,
            ));
        }

        // super.method(...) calls the base prototype with explicit self.
        if let ExpressionKind::Member { object, property } = &callee.kind {
            if matches!(object.kind, ExpressionKind::Super) {
                let base = self.super_prototype(object.span)?;
                let mut args = vec![lua::Expression::name(super::SELF_PARAMETER, origin)];
                args.extend(self.transform_arguments(arguments)?);
                return Ok(lua::Expression::call(
                    lua::Expression::member(base, self.resolve(property.name), origin),
                    args,
                    origin,
                ));
            }
        }

        if let Some(result) = self.try_builtin_call(expr, callee, arguments)? {
            return Ok(result);
        }

        // A @forRange callee is only meaningful as a for...of iterable.
        if self.node_symbol_has_directive(callee.id, DirectiveKind::ForRange, callee.span) {
            return Err(TransformError::invalid_for_range_call(
                expr.span,
                "@forRange functions can only be iterated with for...of",
            ));
        }

        // Element calls on @luaTable objects have no Lua equivalent.
        if let ExpressionKind::Index { object, .. } = &callee.kind {
            if self.classify_owner(object) == BuiltinOwner::LuaTable {
                return Err(TransformError::new(
                    TransformErrorKind::InvalidElementCall,
                    expr.span,
                    "Cannot call an element of a @luaTable class",
                ));
            }
        }

        let context = self.call_context_type(expr, callee);
        let args = self.transform_arguments(arguments)?;

        if context == ContextType::NonVoid {
            if let ExpressionKind::Member { object, property } = &callee.kind {
                let method_name = self.resolve(property.name);
                let table = self.transform_expression(object)?;
                if NameMangler::is_valid_lua_identifier(method_name)
                    && !crate::symbols::LUA_KEYWORDS.contains(&method_name)
                {
                    return Ok(lua::Expression::method_call(table, method_name, args, origin));
                }
                // Invalid method name: inject the receiver explicitly,
                // caching it when re-evaluation is unsafe.
                if table.is_simple() {
                    let mut with_context = vec![table.clone()];
                    with_context.extend(args);
                    return Ok(lua::Expression::call(
                        lua::Expression::member(table, method_name, origin),
                        with_context,
                        origin,
                    ));
                }
                let mut statements = vec![lua::Statement::local(
                    vec![lua::Identifier::new("____TS_obj", origin)],
                    vec![table],
                    origin,
                )];
                let receiver = lua::Expression::name("____TS_obj", origin);
                let mut with_context = vec![receiver.clone()];
                with_context.extend(args);
                statements.push(lua::Statement::ret(
                    vec![lua::Expression::call(
                        lua::Expression::member(receiver, method_name, origin),
                        with_context,
                        origin,
                    )],
                    origin,
                ));
                return Ok(self.iife(statements, origin));
            }

            // Bare call with an implicit context parameter.
            let context_arg = if self.options.is_strict() {
                lua::Expression::nil(origin)
            } else {
                lua::Expression::name("_G", origin)
            };
            let function = self.transform_expression(callee)?;
            let mut with_context = vec![context_arg];
            with_context.extend(args);
            return Ok(lua::Expression::call(function, with_context, origin));
        }

        let function = self.transform_expression(callee)?;
        Ok(lua::Expression::call(function, args, origin))
    }

    fn super_prototype(&self, span: crate::span::Span) -> TransformResult<lua::Expression> {
        let frame = self.class_stack.last().ok_or_else(|| {
            TransformError::new(
                TransformErrorKind::UnknownSuperType,
                span,
                "super used outside of a class",
            )
        })?;
        if !frame.has_super {
            return Err(TransformError::new(
                TransformErrorKind::UnknownSuperType,
                span,
                "super used in a class without a base type",
            ));
        }
        Ok(lua::Expression::member(
            lua::Expression::member(frame.reference.clone(), super::SUPER_FIELD, Some(span)),
            "prototype",
            Some(span),
        ))
    }

    pub(crate) fn transform_new_expression(
        &mut self,
        expr: &Expression,
        callee: &Expression,
        arguments: &[Expression],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);

        if let Some(symbol) = self.oracle.symbol_of(callee.id) {
            if self.symbol_has_directive(symbol, DirectiveKind::Extension, callee.span)
                || self.symbol_has_directive(symbol, DirectiveKind::MetaExtension, callee.span)
            {
                return Err(TransformError::new(
                    TransformErrorKind::InvalidNewExpressionOnExtension,
                    expr.span,
                    "Cannot construct an extension class",
                ));
            }
            if self.symbol_has_directive(symbol, DirectiveKind::LuaTable, callee.span) {
                if !arguments.is_empty() {
                    return Err(TransformError::new(
                        TransformErrorKind::ForbiddenLuaTableUseException,
                        expr.span,
                        "@luaTable constructors take no arguments",
                    ));
                }
                return Ok(lua::Expression::table(Vec::new(), origin));
            }
            let directives =
                self.directives
                    .directives_of_symbol(self.oracle, symbol, callee.span);
            if let Some(custom) = directives
                .iter()
                .find(|d| d.kind == DirectiveKind::CustomConstructor)
            {
                let Some(name) = custom.args.first() else {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidDecoratorArgumentNumber,
                        expr.span,
                        "@customConstructor requires a constructor name argument",
                    ));
                };
                let args = self.transform_arguments(arguments)?;
                return Ok(lua::Expression::call(
                    lua::Expression::name(name.clone(), origin),
                    args,
                    origin,
                ));
            }
        }

        // Built-in collection constructors come from the lualib.
        if let ExpressionKind::Identifier(name) = &callee.kind {
            let feature = match self.resolve(*name) {
                "Map" => Some(LuaLibFeature::Map),
                "Set" => Some(LuaLibFeature::Set),
                "WeakMap" => Some(LuaLibFeature::WeakMap),
                "WeakSet" => Some(LuaLibFeature::WeakSet),
                _ => None,
            };
            if let Some(feature) = feature {
                let constructor = self.use_lualib(feature);
                let args = self.transform_arguments(arguments)?;
                return Ok(lua::Expression::call(
                    lua::Expression::member(constructor, "new", origin),
                    args,
                    origin,
                ));
            }
        }

        let class = self.transform_expression(callee)?;
        let args = self.transform_arguments(arguments)?;
        Ok(lua::Expression::call(
            lua::Expression::member(class, "new", origin),
            args,
            origin,
        ))
    }

    /// Built-in method dispatch. Returns None when the call is not a
    /// recognised intrinsic.
    pub(crate) fn try_builtin_call(
        &mut self,
        expr: &Expression,
        callee: &Expression,
        arguments: &[Expression],
    ) -> TransformResult<Option<lua::Expression>> {
        let origin = Some(expr.span);

        // Symbol(...) as a bare constructor-less call.
        if let ExpressionKind::Identifier(name) = &callee.kind {
            if self.resolve(*name) == "Symbol" && self.oracle.symbol_of(callee.id).is_none() {
                let helper = self.use_lualib(LuaLibFeature::Symbol);
                let args = self.transform_arguments(arguments)?;
                return Ok(Some(lua::Expression::call(helper, args, origin)));
            }
        }

        let ExpressionKind::Member { object, property } = &callee.kind else {
            return Ok(None);
        };
        let method = self.resolve(property.name);

        // `hasOwnProperty` intentionally diverges: a raw table probe.
        if method == "hasOwnProperty" && arguments.len() == 1 {
            let table = self.transform_expression(object)?;
            let key = self.transform_expression(&arguments[0])?;
            return Ok(Some(lua::Expression::binary(
                lua::BinaryOperator::NotEqual,
                lua::Expression::call(
                    lua::Expression::name("rawget", origin),
                    vec![table, key],
                    origin,
                ),
                lua::Expression::nil(origin),
                origin,
            )));
        }

        match self.classify_owner(object) {
            BuiltinOwner::Math => self.transform_math_call(expr, method, arguments).map(Some),
            BuiltinOwner::Console => self.transform_console_call(expr, method, arguments).map(Some),
            BuiltinOwner::ObjectNamespace => {
                let feature = match method {
                    "assign" => LuaLibFeature::ObjectAssign,
                    "keys" => LuaLibFeature::ObjectKeys,
                    "values" => LuaLibFeature::ObjectValues,
                    "entries" => LuaLibFeature::ObjectEntries,
                    _ => {
                        return Err(TransformError::unsupported_property(
                            expr.span, "Object", method,
                        ))
                    }
                };
                let helper = self.use_lualib(feature);
                let args = self.transform_arguments(arguments)?;
                Ok(Some(lua::Expression::call(helper, args, origin)))
            }
            BuiltinOwner::SymbolNamespace => match method {
                "for" => {
                    let helper = self.use_lualib(LuaLibFeature::SymbolRegistry);
                    let args = self.transform_arguments(arguments)?;
                    Ok(Some(lua::Expression::call(helper, args, origin)))
                }
                _ => Err(TransformError::unsupported_property(
                    expr.span, "Symbol", method,
                )),
            },
            BuiltinOwner::NumberNamespace => {
                self.transform_number_call(expr, method, arguments).map(Some)
            }
            BuiltinOwner::StringInstance => {
                self.transform_string_call(expr, object, method, arguments)
            }
            BuiltinOwner::ArrayInstance => {
                self.transform_array_call(expr, object, method, arguments)
            }
            BuiltinOwner::FunctionInstance => match method {
                "apply" => {
                    let helper = self.use_lualib(LuaLibFeature::FunctionApply);
                    let mut args = vec![self.transform_expression(object)?];
                    args.extend(self.transform_arguments(arguments)?);
                    Ok(Some(lua::Expression::call(helper, args, origin)))
                }
                "bind" => {
                    let helper = self.use_lualib(LuaLibFeature::FunctionBind);
                    let mut args = vec![self.transform_expression(object)?];
                    args.extend(self.transform_arguments(arguments)?);
                    Ok(Some(lua::Expression::call(helper, args, origin)))
                }
                "call" => {
                    let helper = self.use_lualib(LuaLibFeature::FunctionCall);
                    let mut args = vec![self.transform_expression(object)?];
                    args.extend(self.transform_arguments(arguments)?);
                    Ok(Some(lua::Expression::call(helper, args, origin)))
                }
                _ => Ok(None),
            },
            BuiltinOwner::LuaTable => {
                self.transform_lua_table_call(expr, object, method, arguments, false)
                    .map(Some)
            }
            BuiltinOwner::None => Ok(None),
        }
    }

    /// @luaTable method calls: `get` reads raw, `set` writes raw (statement
    /// position only), everything else is forbidden.
    pub(crate) fn transform_lua_table_call(
        &mut self,
        expr: &Expression,
        object: &Expression,
        method: &str,
        arguments: &[Expression],
        statement_position: bool,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        match method {
            "get" => {
                if arguments.len() != 1 {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidPropertyCall,
                        expr.span,
                        "@luaTable get must take exactly one argument",
                    ));
                }
                let table = self.transform_expression(object)?;
                let key = self.transform_expression(&arguments[0])?;
                Ok(lua::Expression::index(table, key, origin))
            }
            "set" => {
                if !statement_position {
                    return Err(TransformError::new(
                        TransformErrorKind::ForbiddenLuaTableSetExpression,
                        expr.span,
                        "@luaTable set cannot be used in an expression position",
                    ));
                }
                if arguments.len() != 2 {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidPropertyCall,
                        expr.span,
                        "@luaTable set must take exactly two arguments",
                    ));
                }
                // The caller turns this into an assignment statement.
                let table = self.transform_expression(object)?;
                let key = self.transform_expression(&arguments[0])?;
                Ok(lua::Expression::index(table, key, origin))
            }
            _ => Err(TransformError::new(
                TransformErrorKind::ForbiddenLuaTableUseException,
                expr.span,
                format!("Invalid @luaTable method \"{method}\""),
            )),
        }
    }

    fn transform_math_call(
        &mut self,
        expr: &Expression,
        method: &str,
        arguments: &[Expression],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let math = |name: &str, args: Vec<lua::Expression>| {
            lua::Expression::call(
                lua::Expression::member(lua::Expression::name("math", origin), name, origin),
                args,
                origin,
            )
        };
        let args = self.transform_arguments(arguments)?;
        let arity = |n: usize| -> TransformResult<()> {
            if args.len() < n {
                return Err(TransformError::new(
                    TransformErrorKind::InvalidPropertyCall,
                    expr.span,
                    format!("Math.{method} expects at least {n} argument(s)"),
                ));
            }
            Ok(())
        };

        match method {
            "abs" | "acos" | "asin" | "atan" | "ceil" | "cos" | "exp" | "floor" | "fmod"
            | "max" | "min" | "random" | "sin" | "sqrt" | "tan" => Ok(math(method, args)),
            "log" => {
                arity(1)?;
                Ok(math("log", args))
            }
            "atan2" => {
                arity(2)?;
                let mut iter = args.into_iter();
                let y = iter.next().unwrap();
                let x = iter.next().unwrap();
                Ok(math(
                    "atan",
                    vec![lua::Expression::binary(
                        lua::BinaryOperator::Divide,
                        y,
                        x,
                        origin,
                    )],
                ))
            }
            "log10" | "log2" => {
                arity(1)?;
                let divisor = if method == "log10" {
                    std::f64::consts::LN_10
                } else {
                    std::f64::consts::LN_2
                };
                Ok(lua::Expression::binary(
                    lua::BinaryOperator::Divide,
                    math("log", args),
                    lua::Expression::number(divisor, origin),
                    origin,
                ))
            }
            "log1p" => {
                arity(1)?;
                let x = args.into_iter().next().unwrap();
                Ok(math(
                    "log",
                    vec![lua::Expression::binary(
                        lua::BinaryOperator::Add,
                        lua::Expression::number(1.0, origin),
                        x,
                        origin,
                    )],
                ))
            }
            "round" => {
                arity(1)?;
                let x = args.into_iter().next().unwrap();
                Ok(math(
                    "floor",
                    vec![lua::Expression::binary(
                        lua::BinaryOperator::Add,
                        x,
                        lua::Expression::number(0.5, origin),
                        origin,
                    )],
                ))
            }
            "pow" => {
                arity(2)?;
                let mut iter = args.into_iter();
                let base = iter.next().unwrap();
                let exponent = iter.next().unwrap();
                Ok(lua::Expression::binary(
                    lua::BinaryOperator::Power,
                    base,
                    exponent,
                    origin,
                ))
            }
            _ => Err(TransformError::unsupported_property(expr.span, "Math", method)),
        }
    }

    fn transform_console_call(
        &mut self,
        expr: &Expression,
        method: &str,
        arguments: &[Expression],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let args = self.transform_arguments(arguments)?;
        match method {
            "log" | "info" | "warn" | "error" | "debug" => Ok(lua::Expression::call(
                lua::Expression::name("print", origin),
                args,
                origin,
            )),
            "trace" => {
                let mut print_args = args;
                print_args.push(lua::Expression::call(
                    lua::Expression::member(
                        lua::Expression::name("debug", origin),
                        "traceback",
                        origin,
                    ),
                    Vec::new(),
                    origin,
                ));
                Ok(lua::Expression::call(
                    lua::Expression::name("print", origin),
                    print_args,
                    origin,
                ))
            }
            "assert" => Ok(lua::Expression::call(
                lua::Expression::name("assert", origin),
                args,
                origin,
            )),
            _ => Err(TransformError::unsupported_property(
                expr.span, "console", method,
            )),
        }
    }

    fn transform_number_call(
        &mut self,
        expr: &Expression,
        method: &str,
        arguments: &[Expression],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        match method {
            "isNaN" => {
                if arguments.len() != 1 {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidPropertyCall,
                        expr.span,
                        "Number.isNaN expects one argument",
                    ));
                }
                let value = self.transform_expression(&arguments[0])?;
                if value.is_simple() {
                    return Ok(lua::Expression::parenthesized(
                        lua::Expression::binary(
                            lua::BinaryOperator::NotEqual,
                            value.clone(),
                            value,
                            origin,
                        ),
                        origin,
                    ));
                }
                let statements = vec![
                    lua::Statement::local(
                        vec![lua::Identifier::new("____TS_value", origin)],
                        vec![value],
                        origin,
                    ),
                    lua::Statement::ret(
                        vec![lua::Expression::binary(
                            lua::BinaryOperator::NotEqual,
                            lua::Expression::name("____TS_value", origin),
                            lua::Expression::name("____TS_value", origin),
                            origin,
                        )],
                        origin,
                    ),
                ];
                Ok(self.iife(statements, origin))
            }
            _ => Err(TransformError::unsupported_property(
                expr.span, "Number", method,
            )),
        }
    }

    fn transform_string_call(
        &mut self,
        expr: &Expression,
        object: &Expression,
        method: &str,
        arguments: &[Expression],
    ) -> TransformResult<Option<lua::Expression>> {
        let origin = Some(expr.span);
        let string_fn = |name: &str, args: Vec<lua::Expression>| {
            lua::Expression::call(
                lua::Expression::member(lua::Expression::name("string", origin), name, origin),
                args,
                origin,
            )
        };
        match method {
            "toUpperCase" => {
                let value = self.transform_expression(object)?;
                Ok(Some(string_fn("upper", vec![value])))
            }
            "toLowerCase" => {
                let value = self.transform_expression(object)?;
                Ok(Some(string_fn("lower", vec![value])))
            }
            "repeat" => {
                let value = self.transform_expression(object)?;
                let mut args = vec![value];
                args.extend(self.transform_arguments(arguments)?);
                Ok(Some(string_fn("rep", args)))
            }
            "split" => {
                let helper = self.use_lualib(LuaLibFeature::StringSplit);
                let mut args = vec![self.transform_expression(object)?];
                args.extend(self.transform_arguments(arguments)?);
                Ok(Some(lua::Expression::call(helper, args, origin)))
            }
            "replace" => {
                let helper = self.use_lualib(LuaLibFeature::StringReplace);
                let mut args = vec![self.transform_expression(object)?];
                args.extend(self.transform_arguments(arguments)?);
                Ok(Some(lua::Expression::call(helper, args, origin)))
            }
            "indexOf" => {
                // ((string.find(s, v, from + 1, true) or 0) - 1)
                let value = self.transform_expression(object)?;
                let mut args = self.transform_arguments(arguments)?;
                let search = if args.is_empty() {
                    lua::Expression::string("", origin)
                } else {
                    args.remove(0)
                };
                let from = if args.is_empty() {
                    lua::Expression::number(1.0, origin)
                } else {
                    super::expressions::add_one(args.remove(0))
                };
                let find = string_fn(
                    "find",
                    vec![value, search, from, lua::Expression::boolean(true, origin)],
                );
                Ok(Some(lua::Expression::binary(
                    lua::BinaryOperator::Subtract,
                    lua::Expression::parenthesized(
                        lua::Expression::binary(
                            lua::BinaryOperator::Or,
                            find,
                            lua::Expression::number(0.0, origin),
                            origin,
                        ),
                        origin,
                    ),
                    lua::Expression::number(1.0, origin),
                    origin,
                )))
            }
            "substring" => {
                let value = self.transform_expression(object)?;
                let mut args = self.transform_arguments(arguments)?;
                if args.is_empty() {
                    return Ok(Some(value));
                }
                let start = super::expressions::add_one(args.remove(0));
                let mut call_args = vec![value, start];
                if !args.is_empty() {
                    call_args.push(args.remove(0));
                }
                Ok(Some(string_fn("sub", call_args)))
            }
            "charAt" => {
                let value = self.transform_expression(object)?;
                let mut args = self.transform_arguments(arguments)?;
                if args.is_empty() {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidPropertyCall,
                        expr.span,
                        "charAt expects an index argument",
                    ));
                }
                let index = super::expressions::add_one(args.remove(0));
                Ok(Some(string_fn("sub", vec![value, index.clone(), index])))
            }
            "charCodeAt" => {
                let value = self.transform_expression(object)?;
                let mut args = self.transform_arguments(arguments)?;
                if args.is_empty() {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidPropertyCall,
                        expr.span,
                        "charCodeAt expects an index argument",
                    ));
                }
                let index = super::expressions::add_one(args.remove(0));
                Ok(Some(string_fn("byte", vec![value, index])))
            }
            _ => Ok(None),
        }
    }

    fn transform_array_call(
        &mut self,
        expr: &Expression,
        object: &Expression,
        method: &str,
        arguments: &[Expression],
    ) -> TransformResult<Option<lua::Expression>> {
        let origin = Some(expr.span);
        let feature = match method {
            "concat" => Some(LuaLibFeature::ArrayConcat),
            "every" => Some(LuaLibFeature::ArrayEvery),
            "filter" => Some(LuaLibFeature::ArrayFilter),
            "forEach" => Some(LuaLibFeature::ArrayForEach),
            "indexOf" => Some(LuaLibFeature::ArrayIndexOf),
            "map" => Some(LuaLibFeature::ArrayMap),
            "push" => Some(LuaLibFeature::ArrayPush),
            "reverse" => Some(LuaLibFeature::ArrayReverse),
            "slice" => Some(LuaLibFeature::ArraySlice),
            "some" => Some(LuaLibFeature::ArraySome),
            "splice" => Some(LuaLibFeature::ArraySplice),
            _ => None,
        };
        if let Some(feature) = feature {
            let helper = self.use_lualib(feature);
            let mut args = vec![self.transform_expression(object)?];
            args.extend(self.transform_arguments(arguments)?);
            return Ok(Some(lua::Expression::call(helper, args, origin)));
        }

        match method {
            "pop" => {
                let value = self.transform_expression(object)?;
                Ok(Some(lua::Expression::call(
                    lua::Expression::member(lua::Expression::name("table", origin), "remove", origin),
                    vec![value],
                    origin,
                )))
            }
            "shift" => {
                let value = self.transform_expression(object)?;
                Ok(Some(lua::Expression::call(
                    lua::Expression::member(lua::Expression::name("table", origin), "remove", origin),
                    vec![value, lua::Expression::number(1.0, origin)],
                    origin,
                )))
            }
            "unshift" => {
                let value = self.transform_expression(object)?;
                let mut args = vec![value, lua::Expression::number(1.0, origin)];
                args.extend(self.transform_arguments(arguments)?);
                Ok(Some(lua::Expression::call(
                    lua::Expression::member(lua::Expression::name("table", origin), "insert", origin),
                    args,
                    origin,
                )))
            }
            "join" => {
                let value = self.transform_expression(object)?;
                let mut args = vec![value];
                let mut rest = self.transform_arguments(arguments)?;
                if rest.is_empty() {
                    args.push(lua::Expression::string(",", origin));
                } else {
                    args.push(rest.remove(0));
                }
                Ok(Some(lua::Expression::call(
                    lua::Expression::member(lua::Expression::name("table", origin), "concat", origin),
                    args,
                    origin,
                )))
            }
            _ => Ok(None),
        }
    }
}
