use super::{ClassFrame, FunctionFrame, LuaTransformer};
use crate::ast::expression::{Expression, ExpressionKind};
use crate::ast::statement::*;
use crate::directives::DirectiveKind;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::lualib::LuaLibFeature;
use crate::scope::ScopeKind;

impl LuaTransformer<'_> {
    /// Lower a class declaration into the prototype-table protocol.
    pub(crate) fn transform_class_declaration(
        &mut self,
        statement: &Statement,
        decl: &ClassDeclaration,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let Some(name) = &decl.name else {
            return Err(TransformError::missing_class_name(statement.span));
        };
        let class_text = self.resolve(name.name).to_string();

        let mut directives = decl
            .doc
            .as_ref()
            .map(|doc| self.directives.parse_doc(doc, statement.span))
            .unwrap_or_default();
        if let Some(symbol) = self.oracle.symbol_of(name.id) {
            directives.extend(
                self.directives
                    .directives_of_symbol(self.oracle, symbol, statement.span),
            );
        }
        let has = |kind: DirectiveKind| directives.iter().any(|d| d.kind == kind);

        let exported_table = self
            .oracle
            .symbol_of(name.id)
            .and_then(|symbol| self.exported_table_for(symbol));

        // Extension classes describe pre-existing Lua values and emit
        // nothing at all.
        if has(DirectiveKind::Extension) || has(DirectiveKind::MetaExtension) {
            if has(DirectiveKind::Extension) && has(DirectiveKind::MetaExtension) {
                return Err(TransformError::new(
                    TransformErrorKind::InvalidExtensionMetaExtension,
                    statement.span,
                    "A class cannot be both @extension and @metaExtension",
                ));
            }
            if has(DirectiveKind::MetaExtension) && decl.extends.is_none() {
                return Err(TransformError::new(
                    TransformErrorKind::MissingMetaExtension,
                    statement.span,
                    "@metaExtension requires the class to extend a meta class",
                ));
            }
            if exported_table.is_some() {
                return Err(TransformError::new(
                    TransformErrorKind::InvalidExportsExtension,
                    statement.span,
                    "Extension classes cannot be exported",
                ));
            }
            return Ok(());
        }

        if has(DirectiveKind::LuaTable) {
            if !decl.is_ambient {
                return Err(TransformError::new(
                    TransformErrorKind::ForbiddenLuaTableNonDeclaration,
                    statement.span,
                    "@luaTable classes must be ambient declarations",
                ));
            }
            return Ok(());
        }

        if has(DirectiveKind::PureAbstract) {
            return Ok(());
        }

        if decl.is_ambient {
            self.declared_name(&class_text, name.span, true)?;
            if !decl.decorators.is_empty() {
                return Err(TransformError::new(
                    TransformErrorKind::InvalidDecoratorContext,
                    statement.span,
                    "Decorators cannot be applied to ambient classes",
                ));
            }
            return Ok(());
        }

        // Base class validation.
        let extends = match &decl.extends {
            Some(extends) => {
                if !is_entity_expression(extends) {
                    return Err(TransformError::new(
                        TransformErrorKind::UnknownSuperType,
                        extends.span,
                        "Cannot determine the base type of the extends clause",
                    ));
                }
                if self.node_symbol_has_directive(
                    extends.id,
                    DirectiveKind::Extension,
                    extends.span,
                ) || self.node_symbol_has_directive(
                    extends.id,
                    DirectiveKind::MetaExtension,
                    extends.span,
                ) {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidExtendsExtension,
                        extends.span,
                        "Cannot extend an extension class",
                    ));
                }
                if self.node_symbol_has_directive(extends.id, DirectiveKind::LuaTable, extends.span)
                {
                    return Err(TransformError::new(
                        TransformErrorKind::InvalidExtendsLuaTable,
                        extends.span,
                        "Cannot extend a @luaTable class",
                    ));
                }
                Some(self.transform_expression(extends)?)
            }
            None => None,
        };

        let class_name = crate::symbols::NameMangler::mangle(&class_text);
        let class_ref = lua::Expression::name(class_name.clone(), origin);

        // 1. The constructor table, a local in every case; exported classes
        //    alias the exports field.
        if let Some(table) = &exported_table {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    lua::Expression::name(table.clone(), origin),
                    &class_text,
                    origin,
                )],
                vec![lua::Expression::table(Vec::new(), origin)],
                origin,
            ));
            let lua_ident = self.binding_identifier(name)?;
            let symbol = self.binding_symbol(name);
            self.emit_local_declaration(
                out,
                vec![(symbol, lua_ident)],
                vec![lua::Expression::member(
                    lua::Expression::name(table.clone(), origin),
                    &class_text,
                    origin,
                )],
                statement.span,
            );
        } else {
            let lua_ident = self.binding_identifier(name)?;
            let symbol = self.binding_symbol(name);
            self.emit_local_declaration(
                out,
                vec![(symbol, lua_ident)],
                vec![lua::Expression::table(Vec::new(), origin)],
                statement.span,
            );
        }

        // 2. Identity fields and the prototype table.
        out.push(lua::Statement::assign(
            vec![lua::Expression::member(class_ref.clone(), "name", origin)],
            vec![lua::Expression::string(class_text.clone(), origin)],
            origin,
        ));
        out.push(lua::Statement::assign(
            vec![lua::Expression::member(class_ref.clone(), "__index", origin)],
            vec![class_ref.clone()],
            origin,
        ));
        out.push(lua::Statement::assign(
            vec![lua::Expression::member(class_ref.clone(), "prototype", origin)],
            vec![lua::Expression::table(Vec::new(), origin)],
            origin,
        ));

        let prototype = lua::Expression::member(class_ref.clone(), "prototype", origin);
        let has_instance_getters = decl
            .members
            .iter()
            .any(|m| matches!(m, ClassMember::Getter(g) if !g.is_static));
        let has_instance_setters = decl
            .members
            .iter()
            .any(|m| matches!(m, ClassMember::Setter(s) if !s.is_static));
        let has_static_getters = decl
            .members
            .iter()
            .any(|m| matches!(m, ClassMember::Getter(g) if g.is_static));
        let has_static_setters = decl
            .members
            .iter()
            .any(|m| matches!(m, ClassMember::Setter(s) if s.is_static));

        if has_instance_getters {
            let helper = self.use_lualib(LuaLibFeature::ClassIndex);
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(prototype.clone(), "__index", origin)],
                vec![lua::Expression::call(helper, vec![prototype.clone()], origin)],
                origin,
            ));
        } else {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(prototype.clone(), "__index", origin)],
                vec![prototype.clone()],
                origin,
            ));
        }
        if has_instance_setters {
            let helper = self.use_lualib(LuaLibFeature::ClassNewIndex);
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(prototype.clone(), "__newindex", origin)],
                vec![lua::Expression::call(helper, vec![prototype.clone()], origin)],
                origin,
            ));
        }
        out.push(lua::Statement::assign(
            vec![lua::Expression::member(prototype.clone(), "constructor", origin)],
            vec![class_ref.clone()],
            origin,
        ));

        // 3. Inheritance metatables.
        if let Some(base) = &extends {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    class_ref.clone(),
                    super::SUPER_FIELD,
                    origin,
                )],
                vec![base.clone()],
                origin,
            ));
            if has_static_getters || has_static_setters {
                let index_helper = self.use_lualib(LuaLibFeature::ClassIndex);
                let newindex_helper = self.use_lualib(LuaLibFeature::ClassNewIndex);
                out.push(lua::Statement::expression(
                    lua::Expression::call(
                        lua::Expression::name("setmetatable", origin),
                        vec![
                            class_ref.clone(),
                            lua::Expression::table(
                                vec![
                                    lua::TableField::Named {
                                        key: "__index".to_string(),
                                        value: lua::Expression::call(
                                            index_helper,
                                            vec![class_ref.clone()],
                                            origin,
                                        ),
                                    },
                                    lua::TableField::Named {
                                        key: "__newindex".to_string(),
                                        value: lua::Expression::call(
                                            newindex_helper,
                                            vec![class_ref.clone()],
                                            origin,
                                        ),
                                    },
                                ],
                                origin,
                            ),
                        ],
                        origin,
                    ),
                    origin,
                ));
            } else {
                out.push(lua::Statement::expression(
                    lua::Expression::call(
                        lua::Expression::name("setmetatable", origin),
                        vec![class_ref.clone(), base.clone()],
                        origin,
                    ),
                    origin,
                ));
            }
            out.push(lua::Statement::expression(
                lua::Expression::call(
                    lua::Expression::name("setmetatable", origin),
                    vec![
                        prototype.clone(),
                        lua::Expression::member(base.clone(), "prototype", origin),
                    ],
                    origin,
                ),
                origin,
            ));
        } else if has_static_getters || has_static_setters {
            let index_helper = self.use_lualib(LuaLibFeature::ClassIndex);
            let newindex_helper = self.use_lualib(LuaLibFeature::ClassNewIndex);
            out.push(lua::Statement::expression(
                lua::Expression::call(
                    lua::Expression::name("setmetatable", origin),
                    vec![
                        class_ref.clone(),
                        lua::Expression::table(
                            vec![
                                lua::TableField::Named {
                                    key: "__index".to_string(),
                                    value: lua::Expression::call(
                                        index_helper,
                                        vec![class_ref.clone()],
                                        origin,
                                    ),
                                },
                                lua::TableField::Named {
                                    key: "__newindex".to_string(),
                                    value: lua::Expression::call(
                                        newindex_helper,
                                        vec![class_ref.clone()],
                                        origin,
                                    ),
                                },
                            ],
                            origin,
                        ),
                    ],
                    origin,
                ),
                origin,
            ));
        }

        self.class_stack.push(ClassFrame {
            reference: class_ref.clone(),
            has_super: extends.is_some(),
        });

        let result = self.transform_class_members(statement, decl, &class_ref, out);
        self.class_stack.pop();
        result?;

        // 7. Class decorators rebind the constructor table.
        if !decl.decorators.is_empty() {
            let helper = self.use_lualib(LuaLibFeature::Decorate);
            let mut decorator_fields = Vec::new();
            for decorator in &decl.decorators {
                decorator_fields.push(lua::TableField::Positional(
                    self.transform_expression(decorator)?,
                ));
            }
            out.push(lua::Statement::assign(
                vec![class_ref.clone()],
                vec![lua::Expression::call(
                    helper,
                    vec![
                        lua::Expression::table(decorator_fields, origin),
                        class_ref.clone(),
                    ],
                    origin,
                )],
                origin,
            ));
            if let Some(table) = &exported_table {
                out.push(lua::Statement::assign(
                    vec![lua::Expression::member(
                        lua::Expression::name(table.clone(), origin),
                        &class_text,
                        origin,
                    )],
                    vec![class_ref.clone()],
                    origin,
                ));
            }
        }

        Ok(())
    }

    fn transform_class_members(
        &mut self,
        statement: &Statement,
        decl: &ClassDeclaration,
        class_ref: &lua::Expression,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let prototype = lua::Expression::member(class_ref.clone(), "prototype", origin);

        let class_no_self = decl
            .name
            .as_ref()
            .map(|name| {
                self.node_symbol_has_directive(name.id, DirectiveKind::NoSelf, statement.span)
            })
            .unwrap_or(false);

        // 4. Constructor: explicit, or generated to chain and initialise.
        let constructor = decl.members.iter().find_map(|member| match member {
            ClassMember::Constructor(ctor) => Some(ctor),
            _ => None,
        });
        self.transform_constructor(statement, decl, constructor, &prototype, out)?;

        let new_body = {
            // C.new(...) allocates, runs ____constructor, returns self.
            let origin = Some(statement.span);
            lua::Block::new(vec![
                lua::Statement::local(
                    vec![lua::Identifier::new(super::SELF_PARAMETER, origin)],
                    vec![lua::Expression::call(
                        lua::Expression::name("setmetatable", origin),
                        vec![lua::Expression::table(Vec::new(), origin), prototype.clone()],
                        origin,
                    )],
                    origin,
                ),
                lua::Statement::expression(
                    lua::Expression::method_call(
                        lua::Expression::name(super::SELF_PARAMETER, origin),
                        "____constructor",
                        vec![lua::Expression::dots(origin)],
                        origin,
                    ),
                    origin,
                ),
                lua::Statement::ret(
                    vec![lua::Expression::name(super::SELF_PARAMETER, origin)],
                    origin,
                ),
            ])
        };
        out.push(lua::Statement::assign(
            vec![lua::Expression::member(class_ref.clone(), "new", origin)],
            vec![lua::Expression::function(Vec::new(), true, new_body, origin)],
            origin,
        ));

        // 5. Methods.
        let mut instance_getters = Vec::new();
        let mut instance_setters = Vec::new();
        let mut static_getters = Vec::new();
        let mut static_setters = Vec::new();

        for member in &decl.members {
            match member {
                ClassMember::Constructor(_) | ClassMember::Property(_) => {}
                ClassMember::Method(method) => {
                    let method_name = self.resolve(method.name.name).to_string();
                    if method.is_static && matches!(method_name.as_str(), "name" | "prototype") {
                        return Err(TransformError::forbidden_static_property_name(
                            method.span,
                            &method_name,
                        ));
                    }
                    let Some(body) = &method.body else {
                        return Err(TransformError::new(
                            TransformErrorKind::UnsupportedFunctionWithoutBody,
                            method.span,
                            "Class methods must have a body",
                        ));
                    };
                    let add_self = !class_no_self
                        && method
                            .this_param
                            .as_ref()
                            .map(|tp| !tp.is_void())
                            .unwrap_or(true);
                    let tuple_return = self.is_tuple_return_declaration(
                        method.doc.as_ref(),
                        method.name.id,
                        method.span,
                    );
                    let lowered = self.lower_function(
                        &method.parameters,
                        body,
                        add_self,
                        tuple_return,
                        method.is_generator,
                    )?;
                    let function = lua::Expression::function(
                        lowered.parameters,
                        lowered.is_vararg,
                        lowered.body,
                        Some(method.span),
                    );
                    // `toString` becomes the __tostring metamethod.
                    let emitted_name = if method_name == "toString" && !method.is_static {
                        "__tostring".to_string()
                    } else {
                        method_name
                    };
                    let target = if method.is_static {
                        lua::Expression::member(class_ref.clone(), emitted_name, origin)
                    } else {
                        lua::Expression::member(prototype.clone(), emitted_name, origin)
                    };
                    out.push(lua::Statement::assign(vec![target], vec![function], origin));
                }
                ClassMember::Getter(getter) => {
                    let accessor = self.lower_accessor(getter, true)?;
                    if getter.is_static {
                        static_getters.push(accessor);
                    } else {
                        instance_getters.push(accessor);
                    }
                }
                ClassMember::Setter(setter) => {
                    let accessor = self.lower_accessor(setter, false)?;
                    if setter.is_static {
                        static_setters.push(accessor);
                    } else {
                        instance_setters.push(accessor);
                    }
                }
            }
        }

        // 6. Accessor tables.
        if !instance_getters.is_empty() {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    prototype.clone(),
                    super::GETTERS_FIELD,
                    origin,
                )],
                vec![lua::Expression::table(instance_getters, origin)],
                origin,
            ));
        }
        if !instance_setters.is_empty() {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    prototype.clone(),
                    super::SETTERS_FIELD,
                    origin,
                )],
                vec![lua::Expression::table(instance_setters, origin)],
                origin,
            ));
        }
        if !static_getters.is_empty() {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    class_ref.clone(),
                    super::GETTERS_FIELD,
                    origin,
                )],
                vec![lua::Expression::table(static_getters, origin)],
                origin,
            ));
        }
        if !static_setters.is_empty() {
            out.push(lua::Statement::assign(
                vec![lua::Expression::member(
                    class_ref.clone(),
                    super::SETTERS_FIELD,
                    origin,
                )],
                vec![lua::Expression::table(static_setters, origin)],
                origin,
            ));
        }

        // Static properties initialise after methods, in source order.
        for member in &decl.members {
            if let ClassMember::Property(property) = member {
                if !property.is_static {
                    continue;
                }
                let property_name = self.resolve(property.name.name).to_string();
                if matches!(property_name.as_str(), "name" | "prototype") {
                    return Err(TransformError::forbidden_static_property_name(
                        property.span,
                        &property_name,
                    ));
                }
                let value = match &property.initializer {
                    Some(initializer) => self.transform_expression(initializer)?,
                    None => continue,
                };
                out.push(lua::Statement::assign(
                    vec![lua::Expression::member(
                        class_ref.clone(),
                        property_name,
                        origin,
                    )],
                    vec![value],
                    origin,
                ));
            }
        }

        Ok(())
    }

    /// The ____constructor: field initialisers, parameter properties, then
    /// the user body. Generated when absent, chaining to the base class.
    fn transform_constructor(
        &mut self,
        statement: &Statement,
        decl: &ClassDeclaration,
        constructor: Option<&ConstructorDeclaration>,
        prototype: &lua::Expression,
        out: &mut Vec<lua::Statement>,
    ) -> TransformResult<()> {
        let origin = Some(statement.span);
        let has_super = decl.extends.is_some();

        self.function_stack.push(FunctionFrame::default());
        self.scopes.push(ScopeKind::Function);

        let result = (|| -> TransformResult<(Vec<lua::Identifier>, bool, Vec<lua::Statement>)> {
            let mut statements = Vec::new();
            let (parameters, is_vararg) = match constructor {
                Some(ctor) => self.lower_parameters(&ctor.parameters, &mut statements)?,
                None => {
                    // The default constructor forwards everything upward.
                    if has_super {
                        let base = lua::Expression::member(
                            self.class_stack
                                .last()
                                .map(|frame| frame.reference.clone())
                                .unwrap_or_else(|| lua::Expression::nil(origin)),
                            super::SUPER_FIELD,
                            origin,
                        );
                        statements.push(lua::Statement::expression(
                            lua::Expression::call(
                                lua::Expression::member(
                                    lua::Expression::member(base, "prototype", origin),
                                    "____constructor",
                                    origin,
                                ),
                                vec![
                                    lua::Expression::name(super::SELF_PARAMETER, origin),
                                    lua::Expression::dots(origin),
                                ],
                                origin,
                            ),
                            origin,
                        ));
                    }
                    (Vec::new(), true)
                }
            };

            // Instance fields initialise before the constructor body runs.
            for member in &decl.members {
                if let ClassMember::Property(property) = member {
                    if property.is_static {
                        continue;
                    }
                    if let Some(initializer) = &property.initializer {
                        let value = self.transform_expression(initializer)?;
                        statements.push(lua::Statement::assign(
                            vec![lua::Expression::member(
                                lua::Expression::name(super::SELF_PARAMETER, origin),
                                self.resolve(property.name.name),
                                origin,
                            )],
                            vec![value],
                            origin,
                        ));
                    }
                }
            }

            if let Some(ctor) = constructor {
                // Parameter properties assign their arguments onto self.
                for parameter in &ctor.parameters {
                    if parameter.access.is_some() {
                        if let crate::ast::pattern::Binding::Identifier(ident) = &parameter.binding
                        {
                            let text = self.resolve(ident.name);
                            statements.push(lua::Statement::assign(
                                vec![lua::Expression::member(
                                    lua::Expression::name(super::SELF_PARAMETER, origin),
                                    text,
                                    origin,
                                )],
                                vec![lua::Expression::name(
                                    crate::symbols::NameMangler::mangle(text),
                                    origin,
                                )],
                                origin,
                            ));
                        }
                    }
                }

                let Some(body) = &ctor.body else {
                    return Err(TransformError::new(
                        TransformErrorKind::UnsupportedFunctionWithoutBody,
                        ctor.span,
                        "Constructors must have a body",
                    ));
                };
                for inner in &body.statements {
                    self.transform_statement(inner, &mut statements)?;
                }
            }

            Ok((parameters, is_vararg, statements))
        })();

        let (mut parameters, is_vararg, statements) = match result {
            Ok(parts) => parts,
            Err(error) => {
                self.function_stack.pop();
                return Err(error);
            }
        };
        let scope = self.scopes.pop(statement.span)?;
        let statements = super::hoisting::rewrite(&scope, statements, &self.symbols, self.options)?;
        self.function_stack.pop();

        parameters.insert(0, lua::Identifier::new(super::SELF_PARAMETER, origin));
        out.push(lua::Statement::assign(
            vec![lua::Expression::member(
                prototype.clone(),
                "____constructor",
                origin,
            )],
            vec![lua::Expression::function(
                parameters,
                is_vararg,
                lua::Block::new(statements),
                origin,
            )],
            origin,
        ));
        Ok(())
    }

    fn lower_accessor(
        &mut self,
        accessor: &AccessorDeclaration,
        is_getter: bool,
    ) -> TransformResult<lua::TableField> {
        let parameters: Vec<Parameter> = match (&accessor.parameter, is_getter) {
            (Some(parameter), false) => vec![parameter.clone()],
            _ => Vec::new(),
        };
        let lowered = self.lower_function(&parameters, &accessor.body, true, false, false)?;
        Ok(lua::TableField::Named {
            key: self.resolve(accessor.name.name).to_string(),
            value: lua::Expression::function(
                lowered.parameters,
                lowered.is_vararg,
                lowered.body,
                Some(accessor.span),
            ),
        })
    }
}

/// extends clauses must name an entity: an identifier or dotted chain.
fn is_entity_expression(expr: &Expression) -> bool {
    match &expr.kind {
        ExpressionKind::Identifier(_) => true,
        ExpressionKind::Member { object, .. } => is_entity_expression(object),
        _ => false,
    }
}
