use super::LuaTransformer;
use crate::ast::expression::{ExpressionKind, Literal, UnaryOp};
use crate::ast::statement::{EnumDeclaration, EnumMember, Statement};
use crate::error::{TransformError, TransformResult};
use crate::lua;
use crate::oracle::ConstantValue;

/// A resolved enum member value.
enum MemberValue {
    Number(f64),
    String(String),
    /// Non-constant initializer: forward mapping only.
    Computed(lua::Expression),
}

impl LuaTransformer<'_> {
    /// Regular enums emit a table with forward mappings for every member
    /// and reverse mappings for numeric ones; const enums vanish entirely.
    pub(crate) fn transform_enum_declaration(
        &mut self,
        statement: &Statement,
        decl: &EnumDeclaration,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let text = self.resolve(decl.name.name).to_string();

        if decl.is_ambient {
            self.declared_name(&text, decl.name.span, true)?;
            return Ok(());
        }
        if decl.is_const {
            // Member references constant-fold at their use sites.
            return Ok(());
        }

        let exported_table = self
            .oracle
            .symbol_of(decl.name.id)
            .and_then(|symbol| self.exported_table_for(symbol));

        let enum_name = crate::symbols::NameMangler::mangle(&text);
        let enum_ref = lua::Expression::name(enum_name.clone(), origin);

        if let Some(table) = &exported_table {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    lua::Expression::name(table.clone(), origin),
                    &text,
                    origin,
                )],
                vec![lua::Expression::table(Vec::new(), origin)],
                origin,
            ));
            let lua_ident = self.binding_identifier(&decl.name)?;
            let symbol = self.binding_symbol(&decl.name);
            self.emit_local_declaration(
                out,
                vec![(symbol, lua_ident)],
                vec![lua::Expression::member(
                    lua::Expression::name(table.clone(), origin),
                    &text,
                    origin,
                )],
                statement.span,
            );
        } else {
            let lua_ident = self.binding_identifier(&decl.name)?;
            let symbol = self.binding_symbol(&decl.name);
            self.emit_local_declaration(
                out,
                vec![(symbol, lua_ident)],
                vec![lua::Expression::table(Vec::new(), origin)],
                statement.span,
            );
        }

        let mut next_auto = 0.0;
        let mut saw_number = false;
        let mut saw_string = false;

        for member in &decl.members {
            let member_name = self.resolve(member.name.name).to_string();
            let value = self.enum_member_value(member, next_auto)?;

            match &value {
                MemberValue::Number(n) => {
                    saw_number = true;
                    next_auto = n + 1.0;
                }
                MemberValue::String(_) => saw_string = true,
                MemberValue::Computed(_) => {}
            }
            if saw_number && saw_string {
                return Err(TransformError::heterogeneous_enum(statement.span, &text));
            }

            let forward_target =
                lua::Expression::member(enum_ref.clone(), member_name.clone(), origin);
            match value {
                MemberValue::Number(n) => {
                    out.push(lua::Statement::assign(
                        vec![forward_target],
                        vec![lua::Expression::number(n, origin)],
                        origin,
                    ));
                    // Reverse mapping: value back to member name.
                    out.push(lua::Statement::assign(
                        vec![lua::Expression::index(
                            enum_ref.clone(),
                            lua::Expression::number(n, origin),
                            origin,
                        )],
                        vec![lua::Expression::string(member_name, origin)],
                        origin,
                    ));
                }
                MemberValue::String(s) => {
                    out.push(lua::Statement::assign(
                        vec![forward_target],
                        vec![lua::Expression::string(s, origin)],
                        origin,
                    ));
                }
                MemberValue::Computed(value) => {
                    out.push(lua::Statement::assign(vec![forward_target], vec![value], origin));
                }
            }
        }

        Ok(())
    }

    fn enum_member_value(
        &mut self,
        member: &EnumMember,
        next_auto: f64,
    ) -> TransformResult<MemberValue> {
        let Some(initializer) = &member.initializer else {
            return Ok(MemberValue::Number(next_auto));
        };
        match &initializer.kind {
            ExpressionKind::Literal(Literal::Number(n)) => Ok(MemberValue::Number(*n)),
            ExpressionKind::Literal(Literal::String(s)) => Ok(MemberValue::String(s.clone())),
            ExpressionKind::Unary {
                op: UnaryOp::Negate,
                operand,
            } if matches!(operand.kind, ExpressionKind::Literal(Literal::Number(_))) => {
                match &operand.kind {
                    ExpressionKind::Literal(Literal::Number(n)) => Ok(MemberValue::Number(-n)),
                    _ => unreachable!(),
                }
            }
            _ => match self.oracle.constant_value_of(member.id) {
                Some(ConstantValue::Number(n)) => Ok(MemberValue::Number(n)),
                Some(ConstantValue::String(s)) => Ok(MemberValue::String(s)),
                None => Ok(MemberValue::Computed(self.transform_expression(initializer)?)),
            },
        }
    }
}
