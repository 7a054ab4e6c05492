use super::LuaTransformer;
use crate::ast::expression::*;
use crate::ast::{Ident, NodeId};
use crate::directives::DirectiveKind;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::lualib::LuaLibFeature;
use crate::span::Span;
use crate::symbols::NameMangler;

impl LuaTransformer<'_> {
    /// Main expression dispatcher.
    pub fn transform_expression(
        &mut self,
        expr: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        match &expr.kind {
            ExpressionKind::Identifier(name) => Ok(self.transform_identifier_expression(expr, *name)),
            ExpressionKind::Literal(literal) => Ok(transform_literal(literal, origin)),
            ExpressionKind::Binary { op, left, right } => {
                self.transform_binary_expression(expr, *op, left, right)
            }
            ExpressionKind::Unary { op, operand } => self.transform_unary_expression(expr, *op, operand),
            ExpressionKind::Update { op, prefix, target } => {
                self.transform_update_expression(expr, *op, *prefix, target)
            }
            ExpressionKind::Assignment { target, op, value } => {
                self.transform_assignment_expression(expr, target, *op, value)
            }
            ExpressionKind::Conditional {
                condition,
                when_true,
                when_false,
            } => self.transform_conditional(expr, condition, when_true, when_false),
            ExpressionKind::Call { callee, arguments } => {
                self.transform_call_expression(expr, callee, arguments)
            }
            ExpressionKind::New { callee, arguments } => {
                self.transform_new_expression(expr, callee, arguments)
            }
            ExpressionKind::Member { object, property } => {
                self.transform_member_expression(expr, object, property)
            }
            ExpressionKind::Index { object, index } => {
                self.transform_index_expression(expr, object, index)
            }
            ExpressionKind::Array(elements) => self.transform_array_literal(expr, elements),
            ExpressionKind::Object(properties) => self.transform_object_literal(expr, properties),
            ExpressionKind::Function(function) => self.transform_function_expression(function),
            ExpressionKind::Arrow(arrow) => self.transform_arrow_function(arrow),
            ExpressionKind::Template(template) => self.transform_template(template),
            ExpressionKind::TaggedTemplate { tag, template } => {
                self.transform_tagged_template(expr, tag, template)
            }
            ExpressionKind::TypeOf(operand) => {
                let value = self.transform_expression(operand)?;
                let helper = self.use_lualib(LuaLibFeature::TypeOf);
                Ok(lua::Expression::call(helper, vec![value], origin))
            }
            ExpressionKind::Delete(target) => {
                let mut statements = Vec::new();
                let lua_target = self.transform_assignment_target(target)?;
                statements.push(lua::Statement::assign(
                    vec![lua_target],
                    vec![lua::Expression::nil(origin)],
                    origin,
                ));
                statements.push(lua::Statement::ret(
                    vec![lua::Expression::boolean(true, origin)],
                    origin,
                ));
                Ok(self.iife(statements, origin))
            }
            ExpressionKind::Spread(_) => self.transform_spread_value(expr),
            ExpressionKind::Yield(value) => {
                let in_generator = self
                    .function_stack
                    .last()
                    .map(|frame| frame.is_generator)
                    .unwrap_or(false);
                if !in_generator {
                    return Err(TransformError::unsupported_kind(
                        expr.span,
                        "yield outside of a generator function",
                    ));
                }
                let arguments = match value {
                    Some(value) => vec![self.transform_expression(value)?],
                    None => Vec::new(),
                };
                Ok(lua::Expression::call(
                    lua::Expression::member(
                        lua::Expression::name("coroutine", origin),
                        "yield",
                        origin,
                    ),
                    arguments,
                    origin,
                ))
            }
            ExpressionKind::Cast { expression, .. } => self.transform_expression(expression),
            ExpressionKind::Parenthesized(inner) => {
                let inner = self.transform_expression(inner)?;
                Ok(lua::Expression::parenthesized(inner, origin))
            }
            ExpressionKind::This => Ok(lua::Expression::name(super::SELF_PARAMETER, origin)),
            ExpressionKind::Super => self.super_reference(expr.span),
            ExpressionKind::Omitted => Ok(lua::Expression::nil(origin)),
        }
    }

    /// Identifier references: sentinel globals, export rewriting, symbol
    /// tracking and mangling.
    pub(crate) fn transform_identifier_expression(
        &mut self,
        expr: &Expression,
        name: crate::string_interner::StringId,
    ) -> lua::Expression {
        let origin = Some(expr.span);
        let text = self.resolve(name);
        match text {
            "undefined" => return lua::Expression::nil(origin),
            "NaN" => {
                return lua::Expression::parenthesized(
                    lua::Expression::binary(
                        lua::BinaryOperator::Divide,
                        lua::Expression::number(0.0, origin),
                        lua::Expression::number(0.0, origin),
                        origin,
                    ),
                    origin,
                )
            }
            "Infinity" => {
                return lua::Expression::member(
                    lua::Expression::name("math", origin),
                    "huge",
                    origin,
                )
            }
            "globalThis" => return lua::Expression::name("_G", origin),
            _ => {}
        }

        if let Some(symbol) = self.oracle.symbol_of(expr.id) {
            let id = self.track_symbol(symbol, expr.span);
            if let Some(table) = self.exported_table_for(symbol) {
                return lua::Expression::member(
                    lua::Expression::name(table, origin),
                    text,
                    origin,
                );
            }
            let mangled = NameMangler::mangle(text);
            let mut ident = lua::Identifier::with_symbol(mangled.clone(), id, origin);
            if mangled != text {
                ident = ident.with_original(text);
            }
            return lua::Expression::identifier(ident);
        }

        lua::Expression::name(NameMangler::mangle(text), origin)
    }

    fn super_reference(&self, span: Span) -> TransformResult<lua::Expression> {
        let frame = self.class_stack.last().ok_or_else(|| {
            TransformError::new(
                TransformErrorKind::UnknownSuperType,
                span,
                "super used outside of a class with a base type",
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
            frame.reference.clone(),
            super::SUPER_FIELD,
            Some(span),
        ))
    }

    fn transform_binary_expression(
        &mut self,
        expr: &Expression,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        match op {
            BinaryOp::InstanceOf => return self.transform_instance_of(expr, left, right),
            BinaryOp::In => {
                return Err(TransformError::unsupported_kind(expr.span, "'in' operator"))
            }
            BinaryOp::ShiftRight => {
                return Err(TransformError::unsupported_kind(
                    expr.span,
                    "signed right shift, use unsigned right shift (>>>) instead",
                ))
            }
            _ => {}
        }

        // typeof fusion: `typeof x == "literal"` becomes `type(x) == "mapped"`.
        if matches!(
            op,
            BinaryOp::Equal | BinaryOp::NotEqual | BinaryOp::StrictEqual | BinaryOp::StrictNotEqual
        ) {
            if let Some(fused) = self.try_fuse_typeof_comparison(expr, op, left, right)? {
                return Ok(fused);
            }
        }

        if matches!(
            op,
            BinaryOp::BitwiseAnd
                | BinaryOp::BitwiseOr
                | BinaryOp::BitwiseXor
                | BinaryOp::ShiftLeft
                | BinaryOp::ShiftRightUnsigned
        ) {
            let lhs = self.transform_expression(left)?;
            let rhs = self.transform_expression(right)?;
            return self.transform_bitwise_operation(op, lhs, rhs, expr.span);
        }

        if op == BinaryOp::Add
            && (self.type_of(left.id).is_string()
                || self.type_of(right.id).is_string()
                || is_string_literal(left)
                || is_string_literal(right))
        {
            let lhs = self.transform_expression(left)?;
            let rhs = self.transform_expression(right)?;
            let lhs = self.coerce_concat_operand(left.id, left, lhs);
            let rhs = self.coerce_concat_operand(right.id, right, rhs);
            return Ok(lua::Expression::binary(
                lua::BinaryOperator::Concat,
                lhs,
                rhs,
                origin,
            ));
        }

        let lua_op = match op {
            BinaryOp::Add => lua::BinaryOperator::Add,
            BinaryOp::Subtract => lua::BinaryOperator::Subtract,
            BinaryOp::Multiply => lua::BinaryOperator::Multiply,
            BinaryOp::Divide => lua::BinaryOperator::Divide,
            BinaryOp::Modulo => lua::BinaryOperator::Modulo,
            BinaryOp::Power => lua::BinaryOperator::Power,
            BinaryOp::Equal | BinaryOp::StrictEqual => lua::BinaryOperator::Equal,
            BinaryOp::NotEqual | BinaryOp::StrictNotEqual => lua::BinaryOperator::NotEqual,
            BinaryOp::LessThan => lua::BinaryOperator::LessThan,
            BinaryOp::LessThanOrEqual => lua::BinaryOperator::LessThanOrEqual,
            BinaryOp::GreaterThan => lua::BinaryOperator::GreaterThan,
            BinaryOp::GreaterThanOrEqual => lua::BinaryOperator::GreaterThanOrEqual,
            BinaryOp::And => lua::BinaryOperator::And,
            BinaryOp::Or => lua::BinaryOperator::Or,
            BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRightUnsigned
            | BinaryOp::ShiftRight
            | BinaryOp::InstanceOf
            | BinaryOp::In => unreachable!("handled above"),
        };

        let lhs = self.transform_expression(left)?;
        let rhs = self.transform_expression(right)?;
        Ok(lua::Expression::binary(lua_op, lhs, rhs, origin))
    }

    /// Bitwise lowering: native operators on the highest dialect, a bit
    /// library on the middle dialects, a hard error on the lowest.
    pub(crate) fn transform_bitwise_operation(
        &mut self,
        op: BinaryOp,
        lhs: lua::Expression,
        rhs: lua::Expression,
        span: Span,
    ) -> TransformResult<lua::Expression> {
        let target = self.options.lua_target;
        if target.supports_native_bitwise() {
            let lua_op = match op {
                BinaryOp::BitwiseAnd => lua::BinaryOperator::BitwiseAnd,
                BinaryOp::BitwiseOr => lua::BinaryOperator::BitwiseOr,
                BinaryOp::BitwiseXor => lua::BinaryOperator::BitwiseXor,
                BinaryOp::ShiftLeft => lua::BinaryOperator::ShiftLeft,
                BinaryOp::ShiftRightUnsigned => lua::BinaryOperator::ShiftRight,
                _ => unreachable!("not a bitwise operator"),
            };
            return Ok(lua::Expression::binary(lua_op, lhs, rhs, Some(span)));
        }
        let Some(library) = target.bit_library() else {
            return Err(TransformError::unsupported_for_target(
                span,
                "Bitwise operations",
                target.display_name(),
            ));
        };
        let function = match op {
            BinaryOp::BitwiseAnd => "band",
            BinaryOp::BitwiseOr => "bor",
            BinaryOp::BitwiseXor => "bxor",
            BinaryOp::ShiftLeft => "lshift",
            BinaryOp::ShiftRightUnsigned => "rshift",
            _ => unreachable!("not a bitwise operator"),
        };
        Ok(lua::Expression::call(
            lua::Expression::member(lua::Expression::name(library, Some(span)), function, Some(span)),
            vec![lhs, rhs],
            Some(span),
        ))
    }

    fn try_fuse_typeof_comparison(
        &mut self,
        expr: &Expression,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> TransformResult<Option<lua::Expression>> {
        let (operand, literal) = match (&left.kind, &right.kind) {
            (ExpressionKind::TypeOf(operand), ExpressionKind::Literal(Literal::String(s))) => {
                (operand, s)
            }
            (ExpressionKind::Literal(Literal::String(s)), ExpressionKind::TypeOf(operand)) => {
                (operand, s)
            }
            _ => return Ok(None),
        };
        let mapped = match literal.as_str() {
            "object" => "table",
            "undefined" => "nil",
            other => other,
        };
        let origin = Some(expr.span);
        let value = self.transform_expression(operand)?;
        let type_call = lua::Expression::call(
            lua::Expression::name("type", origin),
            vec![value],
            origin,
        );
        let lua_op = if matches!(op, BinaryOp::Equal | BinaryOp::StrictEqual) {
            lua::BinaryOperator::Equal
        } else {
            lua::BinaryOperator::NotEqual
        };
        Ok(Some(lua::Expression::binary(
            lua_op,
            type_call,
            lua::Expression::string(mapped, origin),
            origin,
        )))
    }

    fn transform_instance_of(
        &mut self,
        expr: &Expression,
        left: &Expression,
        right: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        if self.node_symbol_has_directive(right.id, DirectiveKind::Extension, right.span)
            || self.node_symbol_has_directive(right.id, DirectiveKind::MetaExtension, right.span)
        {
            return Err(TransformError::new(
                TransformErrorKind::InvalidInstanceOfExtension,
                right.span,
                "Cannot use instanceof on an extension class",
            ));
        }
        if self.node_symbol_has_directive(right.id, DirectiveKind::LuaTable, right.span) {
            return Err(TransformError::new(
                TransformErrorKind::InvalidInstanceOfLuaTable,
                right.span,
                "Cannot use instanceof on a @luaTable class",
            ));
        }

        let value = self.transform_expression(left)?;
        if matches!(&right.kind, ExpressionKind::Identifier(name) if self.resolve(*name) == "Object")
        {
            let helper = self.use_lualib(LuaLibFeature::InstanceOfObject);
            return Ok(lua::Expression::call(helper, vec![value], origin));
        }
        let class = self.transform_expression(right)?;
        let helper = self.use_lualib(LuaLibFeature::InstanceOf);
        Ok(lua::Expression::call(helper, vec![value, class], origin))
    }

    fn transform_unary_expression(
        &mut self,
        expr: &Expression,
        op: UnaryOp,
        operand: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let value = self.transform_expression(operand)?;
        match op {
            UnaryOp::Not => Ok(lua::Expression::unary(lua::UnaryOperator::Not, value, origin)),
            UnaryOp::Negate => Ok(lua::Expression::unary(
                lua::UnaryOperator::Negate,
                value,
                origin,
            )),
            UnaryOp::Plus => Ok(value),
            UnaryOp::BitwiseNot => {
                let target = self.options.lua_target;
                if target.supports_native_bitwise() {
                    return Ok(lua::Expression::unary(
                        lua::UnaryOperator::BitwiseNot,
                        value,
                        origin,
                    ));
                }
                let Some(library) = target.bit_library() else {
                    return Err(TransformError::unsupported_for_target(
                        expr.span,
                        "Bitwise operations",
                        target.display_name(),
                    ));
                };
                Ok(lua::Expression::call(
                    lua::Expression::member(lua::Expression::name(library, origin), "bnot", origin),
                    vec![value],
                    origin,
                ))
            }
        }
    }

    /// Conditionals lower to `cond and a or b`, unless the true branch may
    /// be falsy, in which case both branches become closures and the chosen
    /// one is called.
    fn transform_conditional(
        &mut self,
        expr: &Expression,
        condition: &Expression,
        when_true: &Expression,
        when_false: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let cond = self.transform_expression(condition)?;

        // The branch is safe for `and/or` lowering when either the oracle
        // or the literal shape proves it truthy.
        let true_may_be_falsy = self
            .type_of(when_true.id)
            .may_be_falsy(self.options.strict_null_checks)
            && may_be_falsy_syntactically(when_true);

        if !true_may_be_falsy {
            let a = self.transform_expression(when_true)?;
            let b = self.transform_expression(when_false)?;
            return Ok(lua::Expression::binary(
                lua::BinaryOperator::Or,
                lua::Expression::binary(lua::BinaryOperator::And, cond, a, origin),
                b,
                origin,
            ));
        }

        let a = self.transform_expression(when_true)?;
        let b = self.transform_expression(when_false)?;
        let wrap = |value: lua::Expression| {
            lua::Expression::function(
                Vec::new(),
                false,
                lua::Block::new(vec![lua::Statement::ret(vec![value], origin)]),
                origin,
            )
        };
        let chosen = lua::Expression::binary(
            lua::BinaryOperator::Or,
            lua::Expression::binary(lua::BinaryOperator::And, cond, wrap(a), origin),
            wrap(b),
            origin,
        );
        Ok(lua::Expression::call(
            lua::Expression::parenthesized(chosen, origin),
            Vec::new(),
            origin,
        ))
    }

    fn transform_member_expression(
        &mut self,
        expr: &Expression,
        object: &Expression,
        property: &Ident,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);

        // Const-enum members fold to their constant value.
        if let Some(constant) = self.oracle.constant_value_of(expr.id) {
            return Ok(constant_to_expression(constant, origin));
        }

        if let Some(builtin) = self.try_builtin_property(expr, object, property)? {
            return Ok(builtin);
        }

        if matches!(object.kind, ExpressionKind::Super) {
            let base = self.super_reference(object.span)?;
            return Ok(lua::Expression::member(
                lua::Expression::member(base, "prototype", origin),
                self.resolve(property.name),
                origin,
            ));
        }

        let table = self.transform_expression(object)?;
        Ok(lua::Expression::member(
            table,
            self.resolve(property.name),
            origin,
        ))
    }

    fn transform_index_expression(
        &mut self,
        expr: &Expression,
        object: &Expression,
        index: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        if let Some(constant) = self.oracle.constant_value_of(expr.id) {
            return Ok(constant_to_expression(constant, origin));
        }
        let table = self.transform_expression(object)?;
        let key = self.transform_expression(index)?;
        if self.is_array_element_access(object, index) {
            return Ok(lua::Expression::index(table, add_one(key), origin));
        }
        Ok(lua::Expression::index(table, key, origin))
    }

    /// Array reads/writes are shifted up by one; constant indices fold.
    pub(crate) fn is_array_element_access(&self, object: &Expression, index: &Expression) -> bool {
        self.type_of(object.id).is_array_like() && self.expression_is_numeric(index)
    }

    pub(crate) fn expression_is_numeric(&self, expr: &Expression) -> bool {
        matches!(expr.kind, ExpressionKind::Literal(Literal::Number(_)))
            || self.type_of(expr.id).is_number()
    }

    fn transform_array_literal(
        &mut self,
        expr: &Expression,
        elements: &[Expression],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let mut fields = Vec::new();
        let last = elements.len().checked_sub(1);
        for (i, element) in elements.iter().enumerate() {
            match &element.kind {
                ExpressionKind::Spread(_) => {
                    if Some(i) != last {
                        return Err(TransformError::unsupported_kind(
                            element.span,
                            "spread element in a non-final position",
                        ));
                    }
                    let value = self.transform_spread_value(element)?;
                    fields.push(lua::TableField::Positional(value));
                }
                ExpressionKind::Omitted => {
                    fields.push(lua::TableField::Positional(lua::Expression::nil(origin)));
                }
                _ => {
                    let value = self.transform_expression(element)?;
                    fields.push(lua::TableField::Positional(value));
                }
            }
        }
        Ok(lua::Expression::table(fields, origin))
    }

    fn transform_object_literal(
        &mut self,
        expr: &Expression,
        properties: &[ObjectProperty],
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let has_spread = properties
            .iter()
            .any(|p| matches!(p, ObjectProperty::Spread(_)));

        if !has_spread {
            let mut fields = Vec::new();
            for property in properties {
                match property {
                    ObjectProperty::Property { key, value } => {
                        let value = self.transform_expression(value)?;
                        fields.push(lua::TableField::Named {
                            key: self.resolve(key.name).to_string(),
                            value,
                        });
                    }
                    ObjectProperty::Shorthand(key) => {
                        let reference = self.shorthand_reference(key);
                        fields.push(lua::TableField::Named {
                            key: self.resolve(key.name).to_string(),
                            value: reference,
                        });
                    }
                    ObjectProperty::Spread(_) => unreachable!(),
                }
            }
            return Ok(lua::Expression::table(fields, origin));
        }

        // Object spread folds runs of plain fields and spread values into a
        // single assign call.
        let helper = self.use_lualib(LuaLibFeature::ObjectAssign);
        let mut arguments = vec![lua::Expression::table(Vec::new(), origin)];
        let mut run: Vec<lua::TableField> = Vec::new();
        for property in properties {
            match property {
                ObjectProperty::Spread(value) => {
                    if !run.is_empty() {
                        arguments.push(lua::Expression::table(std::mem::take(&mut run), origin));
                    }
                    arguments.push(self.transform_expression(value)?);
                }
                ObjectProperty::Property { key, value } => {
                    let value = self.transform_expression(value)?;
                    run.push(lua::TableField::Named {
                        key: self.resolve(key.name).to_string(),
                        value,
                    });
                }
                ObjectProperty::Shorthand(key) => {
                    let reference = self.shorthand_reference(key);
                    run.push(lua::TableField::Named {
                        key: self.resolve(key.name).to_string(),
                        value: reference,
                    });
                }
            }
        }
        if !run.is_empty() {
            arguments.push(lua::Expression::table(run, origin));
        }
        Ok(lua::Expression::call(helper, arguments, origin))
    }

    fn shorthand_reference(&mut self, key: &Ident) -> lua::Expression {
        let expr = Expression::new(
            key.id,
            ExpressionKind::Identifier(key.name),
            key.span,
        );
        self.transform_identifier_expression(&expr, key.name)
    }

    fn transform_template(&mut self, template: &TemplateLiteral) -> TransformResult<lua::Expression> {
        let origin = Some(template.span);
        let mut parts = Vec::new();
        for (i, quasi) in template.quasis.iter().enumerate() {
            if !quasi.cooked.is_empty() {
                parts.push(lua::Expression::string(quasi.cooked.clone(), origin));
            }
            if let Some(expression) = template.expressions.get(i) {
                let value = self.transform_expression(expression)?;
                let value = self.coerce_concat_operand(expression.id, expression, value);
                parts.push(value);
            }
        }
        if parts.is_empty() {
            return Ok(lua::Expression::string("", origin));
        }
        Ok(lua::concat_parts(parts, origin))
    }

    /// Tagged templates receive a cooked-strings array with a `raw` field,
    /// then the interpolated expressions.
    fn transform_tagged_template(
        &mut self,
        expr: &Expression,
        tag: &Expression,
        template: &TemplateLiteral,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let mut fields: Vec<lua::TableField> = template
            .quasis
            .iter()
            .map(|q| lua::TableField::Positional(lua::Expression::string(q.cooked.clone(), origin)))
            .collect();
        let raw_fields = template
            .quasis
            .iter()
            .map(|q| lua::TableField::Positional(lua::Expression::string(q.raw.clone(), origin)))
            .collect();
        fields.push(lua::TableField::Named {
            key: "raw".to_string(),
            value: lua::Expression::table(raw_fields, origin),
        });

        let mut arguments = vec![lua::Expression::table(fields, origin)];
        for expression in &template.expressions {
            arguments.push(self.transform_expression(expression)?);
        }
        let tag = self.transform_expression(tag)?;
        Ok(lua::Expression::call(tag, arguments, origin))
    }

    /// Operands of `..` that are not statically string/number get a
    /// tostring wrapper.
    pub(crate) fn coerce_concat_operand(
        &mut self,
        node: NodeId,
        expr: &Expression,
        value: lua::Expression,
    ) -> lua::Expression {
        let ty = self.type_of(node);
        if ty.is_string() || ty.is_number() {
            return value;
        }
        if matches!(
            expr.kind,
            ExpressionKind::Literal(Literal::String(_)) | ExpressionKind::Literal(Literal::Number(_))
        ) {
            return value;
        }
        if matches!(
            value.kind,
            lua::ExpressionKind::String(_)
                | lua::ExpressionKind::Number(_)
                | lua::ExpressionKind::Binary {
                    op: lua::BinaryOperator::Concat,
                    ..
                }
        ) {
            return value;
        }
        let origin = value.origin;
        lua::Expression::call(lua::Expression::name("tostring", origin), vec![value], origin)
    }

    /// Spread values produce Lua multi-values: tuple-return calls pass
    /// through, vararg identifiers become `...`, arrays unpack, anything
    /// else goes through the runtime helper.
    pub(crate) fn transform_spread_value(
        &mut self,
        expr: &Expression,
    ) -> TransformResult<lua::Expression> {
        let ExpressionKind::Spread(inner) = &expr.kind else {
            return Err(TransformError::new(
                TransformErrorKind::CouldNotCast,
                expr.span,
                "expected a spread element",
            ));
        };
        let origin = Some(expr.span);

        if let ExpressionKind::Call { .. } = &inner.kind {
            if let Some(signature) = self.oracle.resolved_signature(inner.id) {
                if signature.tuple_return {
                    return self.transform_expression(inner);
                }
            }
        }
        if self.node_symbol_has_directive(inner.id, DirectiveKind::Vararg, inner.span) {
            return Ok(lua::Expression::dots(origin));
        }
        let value = self.transform_expression(inner)?;
        if self.type_of(inner.id).is_array_like() {
            return Ok(lua::Expression::call(
                self.unpack_reference(origin),
                vec![value],
                origin,
            ));
        }
        let helper = self.use_lualib(LuaLibFeature::Spread);
        Ok(lua::Expression::call(helper, vec![value], origin))
    }

    /// `unpack` or `table.unpack`, per target.
    pub(crate) fn unpack_reference(&self, origin: Option<Span>) -> lua::Expression {
        let name = self.options.lua_target.unpack_name();
        match name.split_once('.') {
            Some((table, field)) => {
                lua::Expression::member(lua::Expression::name(table, origin), field, origin)
            }
            None => lua::Expression::name(name, origin),
        }
    }

    /// Arguments with a trailing spread lower to a multi-value tail.
    pub(crate) fn transform_arguments(
        &mut self,
        arguments: &[Expression],
    ) -> TransformResult<Vec<lua::Expression>> {
        let mut out = Vec::with_capacity(arguments.len());
        let last = arguments.len().checked_sub(1);
        for (i, argument) in arguments.iter().enumerate() {
            if matches!(argument.kind, ExpressionKind::Spread(_)) {
                if Some(i) != last {
                    return Err(TransformError::unsupported_kind(
                        argument.span,
                        "spread element in a non-final position",
                    ));
                }
                out.push(self.transform_spread_value(argument)?);
            } else {
                out.push(self.transform_expression(argument)?);
            }
        }
        Ok(out)
    }

    /// A valid Lua assignment target: identifier, dotted access or index
    /// access (with the array index adjustment applied).
    pub(crate) fn transform_assignment_target(
        &mut self,
        target: &Expression,
    ) -> TransformResult<lua::Expression> {
        match &target.kind {
            ExpressionKind::Identifier(name) => {
                Ok(self.transform_identifier_expression(target, *name))
            }
            ExpressionKind::Member { object, property } => {
                let table = self.transform_expression(object)?;
                Ok(lua::Expression::member(
                    table,
                    self.resolve(property.name),
                    Some(target.span),
                ))
            }
            ExpressionKind::Index { object, index } => {
                let table = self.transform_expression(object)?;
                let key = self.transform_expression(index)?;
                let key = if self.is_array_element_access(object, index) {
                    add_one(key)
                } else {
                    key
                };
                Ok(lua::Expression::index(table, key, Some(target.span)))
            }
            _ => Err(TransformError::unsupported_kind(
                target.span,
                "assignment target",
            )),
        }
    }

    /// Compound assignment or update in expression position: an IIFE caches
    /// temporaries so each operand evaluates exactly once and the correct
    /// value (prefix vs. postfix) is returned.
    fn transform_update_expression(
        &mut self,
        expr: &Expression,
        op: UpdateOp,
        prefix: bool,
        target: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let binary_op = match op {
            UpdateOp::Increment => lua::BinaryOperator::Add,
            UpdateOp::Decrement => lua::BinaryOperator::Subtract,
        };
        let one = lua::Expression::number(1.0, origin);

        let mut statements = Vec::new();
        let place = self.cached_assignment_place(target, &mut statements)?;
        let tmp = self.temp_name();
        let tmp_ident = lua::Identifier::new(tmp.clone(), origin);
        if prefix {
            statements.push(lua::Statement::local(
                vec![tmp_ident],
                vec![lua::Expression::binary(binary_op, place.clone(), one, origin)],
                origin,
            ));
            statements.push(lua::Statement::assign(
                vec![place],
                vec![lua::Expression::name(tmp.clone(), origin)],
                origin,
            ));
        } else {
            statements.push(lua::Statement::local(vec![tmp_ident], vec![place.clone()], origin));
            statements.push(lua::Statement::assign(
                vec![place],
                vec![lua::Expression::binary(
                    binary_op,
                    lua::Expression::name(tmp.clone(), origin),
                    one,
                    origin,
                )],
                origin,
            ));
        }
        statements.push(lua::Statement::ret(
            vec![lua::Expression::name(tmp, origin)],
            origin,
        ));
        Ok(self.iife(statements, origin))
    }

    fn transform_assignment_expression(
        &mut self,
        expr: &Expression,
        target: &Expression,
        op: AssignmentOp,
        value: &Expression,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(expr.span);
        let mut statements = Vec::new();
        let place = self.cached_assignment_place(target, &mut statements)?;
        let rhs = self.transform_expression(value)?;

        let result = match op.binary_op() {
            None => rhs,
            Some(binary) => self.lower_compound_value(binary, place.clone(), rhs, expr.span)?,
        };
        let tmp = self.temp_name();
        statements.push(lua::Statement::local(
            vec![lua::Identifier::new(tmp.clone(), origin)],
            vec![result],
            origin,
        ));
        statements.push(lua::Statement::assign(
            vec![place],
            vec![lua::Expression::name(tmp.clone(), origin)],
            origin,
        ));
        statements.push(lua::Statement::ret(
            vec![lua::Expression::name(tmp, origin)],
            origin,
        ));
        Ok(self.iife(statements, origin))
    }

    /// The compound-assignment payload: `place op value`, with string
    /// concatenation and bitwise dispatch applied.
    pub(crate) fn lower_compound_value(
        &mut self,
        op: BinaryOp,
        place: lua::Expression,
        value: lua::Expression,
        span: Span,
    ) -> TransformResult<lua::Expression> {
        match op {
            BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRightUnsigned => {
                self.transform_bitwise_operation(op, place, value, span)
            }
            BinaryOp::Add => {
                // String-typed compound adds become concatenation.
                let concat = matches!(value.kind, lua::ExpressionKind::String(_))
                    || matches!(
                        value.kind,
                        lua::ExpressionKind::Binary {
                            op: lua::BinaryOperator::Concat,
                            ..
                        }
                    );
                let lua_op = if concat {
                    lua::BinaryOperator::Concat
                } else {
                    lua::BinaryOperator::Add
                };
                Ok(lua::Expression::binary(lua_op, place, value, Some(span)))
            }
            BinaryOp::Subtract => Ok(lua::Expression::binary(
                lua::BinaryOperator::Subtract,
                place,
                value,
                Some(span),
            )),
            BinaryOp::Multiply => Ok(lua::Expression::binary(
                lua::BinaryOperator::Multiply,
                place,
                value,
                Some(span),
            )),
            BinaryOp::Divide => Ok(lua::Expression::binary(
                lua::BinaryOperator::Divide,
                place,
                value,
                Some(span),
            )),
            BinaryOp::Modulo => Ok(lua::Expression::binary(
                lua::BinaryOperator::Modulo,
                place,
                value,
                Some(span),
            )),
            BinaryOp::Power => Ok(lua::Expression::binary(
                lua::BinaryOperator::Power,
                place,
                value,
                Some(span),
            )),
            _ => Err(TransformError::unsupported_kind(
                span,
                "compound assignment operator",
            )),
        }
    }

    /// Produce an assignment place that can be read and written without
    /// double evaluation, caching the receiver and index when they have
    /// effects. Cache statements go into `out`.
    pub(crate) fn cached_assignment_place(
        &mut self,
        target: &Expression,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<lua::Expression> {
        let origin = Some(target.span);
        match &target.kind {
            ExpressionKind::Identifier(name) => {
                Ok(self.transform_identifier_expression(target, *name))
            }
            ExpressionKind::Member { object, property } => {
                let table = self.transform_expression(object)?;
                let table = if table.is_simple() {
                    table
                } else {
                    out.push(lua::Statement::local(
                        vec![lua::Identifier::new("____TS_obj", origin)],
                        vec![table],
                        origin,
                    ));
                    lua::Expression::name("____TS_obj", origin)
                };
                Ok(lua::Expression::member(
                    table,
                    self.resolve(property.name),
                    origin,
                ))
            }
            ExpressionKind::Index { object, index } => {
                let table = self.transform_expression(object)?;
                let key = self.transform_expression(index)?;
                let key = if self.is_array_element_access(object, index) {
                    add_one(key)
                } else {
                    key
                };
                let table = if table.is_simple() {
                    table
                } else {
                    out.push(lua::Statement::local(
                        vec![lua::Identifier::new("____TS_obj", origin)],
                        vec![table],
                        origin,
                    ));
                    lua::Expression::name("____TS_obj", origin)
                };
                let key = if key.is_simple() {
                    key
                } else {
                    out.push(lua::Statement::local(
                        vec![lua::Identifier::new("____TS_index", origin)],
                        vec![key],
                        origin,
                    ));
                    lua::Expression::name("____TS_index", origin)
                };
                Ok(lua::Expression::index(table, key, origin))
            }
            _ => Err(TransformError::unsupported_kind(
                target.span,
                "assignment target",
            )),
        }
    }
}

pub(crate) fn transform_literal(literal: &Literal, origin: Option<Span>) -> lua::Expression {
    match literal {
        Literal::Undefined | Literal::Null => lua::Expression::nil(origin),
        Literal::Boolean(value) => lua::Expression::boolean(*value, origin),
        Literal::Number(value) => lua::Expression::number(*value, origin),
        Literal::String(value) => lua::Expression::string(value.clone(), origin),
    }
}

pub(crate) fn constant_to_expression(
    constant: crate::oracle::ConstantValue,
    origin: Option<Span>,
) -> lua::Expression {
    match constant {
        crate::oracle::ConstantValue::Number(value) => lua::Expression::number(value, origin),
        crate::oracle::ConstantValue::String(value) => lua::Expression::string(value, origin),
    }
}

/// Add one to an index expression; a literal folds, and a trailing `- 1`
/// cancels the increment.
pub(crate) fn add_one(index: lua::Expression) -> lua::Expression {
    match index.kind {
        lua::ExpressionKind::Number(value) => lua::Expression::number(value + 1.0, index.origin),
        lua::ExpressionKind::Binary {
            op: lua::BinaryOperator::Subtract,
            left,
            right,
        } => {
            if matches!(right.kind, lua::ExpressionKind::Number(n) if n == 1.0) {
                *left
            } else {
                lua::Expression::binary(
                    lua::BinaryOperator::Add,
                    lua::Expression::new(
                        lua::ExpressionKind::Binary {
                            op: lua::BinaryOperator::Subtract,
                            left,
                            right,
                        },
                        index.origin,
                    ),
                    lua::Expression::number(1.0, index.origin),
                    index.origin,
                )
            }
        }
        _ => {
            let origin = index.origin;
            lua::Expression::binary(
                lua::BinaryOperator::Add,
                index,
                lua::Expression::number(1.0, origin),
                origin,
            )
        }
    }
}

fn is_string_literal(expr: &Expression) -> bool {
    matches!(expr.kind, ExpressionKind::Literal(Literal::String(_)))
}

/// Literal-level falsiness check used when the oracle has no type for the
/// true branch of a conditional.
fn may_be_falsy_syntactically(expr: &Expression) -> bool {
    !matches!(
        expr.kind,
        ExpressionKind::Literal(Literal::Number(_))
            | ExpressionKind::Literal(Literal::String(_))
            | ExpressionKind::Literal(Literal::Boolean(true))
            | ExpressionKind::Array(_)
            | ExpressionKind::Object(_)
            | ExpressionKind::Function(_)
            | ExpressionKind::Arrow(_)
            | ExpressionKind::Template(_)
            | ExpressionKind::New { .. }
    )
}
