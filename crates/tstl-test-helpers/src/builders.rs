//! Ergonomic constructors for building type-checked TSL ASTs in tests.
//! Node ids are minted sequentially and spans are synthetic but strictly
//! increasing, so source-order comparisons (hoisting, first-seen positions)
//! behave as they would for parsed code.

use std::path::PathBuf;
use tstl_core::ast::expression::*;
use tstl_core::ast::pattern::*;
use tstl_core::ast::statement::*;
use tstl_core::ast::{DocComment, DocTag, Ident, NodeId, SourceFile};
use tstl_core::span::Span;
use tstl_core::string_interner::StringInterner;

pub struct AstBuilder {
    pub interner: StringInterner,
    next_id: u32,
    cursor: u32,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder {
            interner: StringInterner::new(),
            next_id: 0,
            cursor: 0,
        }
    }

    pub fn node_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub fn span(&mut self) -> Span {
        self.cursor += 10;
        Span::new(self.cursor, self.cursor + 5, 1 + self.cursor / 80, 1)
    }

    pub fn ident(&mut self, name: &str) -> Ident {
        let id = self.node_id();
        let name = self.interner.intern(name);
        Ident::new(id, name, self.span())
    }

    fn expr(&mut self, kind: ExpressionKind) -> Expression {
        let id = self.node_id();
        Expression::new(id, kind, self.span())
    }

    fn stmt(&mut self, kind: StatementKind) -> Statement {
        let id = self.node_id();
        Statement::new(id, kind, self.span())
    }

    // --- expressions ---

    pub fn num(&mut self, value: f64) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::Number(value)))
    }

    pub fn str_(&mut self, value: &str) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::String(value.to_string())))
    }

    pub fn bool_(&mut self, value: bool) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::Boolean(value)))
    }

    pub fn undefined(&mut self) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::Undefined))
    }

    pub fn null(&mut self) -> Expression {
        self.expr(ExpressionKind::Literal(Literal::Null))
    }

    pub fn name(&mut self, name: &str) -> Expression {
        let interned = self.interner.intern(name);
        self.expr(ExpressionKind::Identifier(interned))
    }

    pub fn this(&mut self) -> Expression {
        self.expr(ExpressionKind::This)
    }

    pub fn array(&mut self, elements: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::Array(elements))
    }

    pub fn object(&mut self, properties: Vec<(&str, Expression)>) -> Expression {
        let properties = properties
            .into_iter()
            .map(|(key, value)| ObjectProperty::Property {
                key: self.ident(key),
                value,
            })
            .collect();
        self.expr(ExpressionKind::Object(properties))
    }

    pub fn binary(&mut self, op: BinaryOp, left: Expression, right: Expression) -> Expression {
        self.expr(ExpressionKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expression) -> Expression {
        self.expr(ExpressionKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn type_of(&mut self, operand: Expression) -> Expression {
        self.expr(ExpressionKind::TypeOf(Box::new(operand)))
    }

    pub fn conditional(
        &mut self,
        condition: Expression,
        when_true: Expression,
        when_false: Expression,
    ) -> Expression {
        self.expr(ExpressionKind::Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        })
    }

    pub fn call(&mut self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    pub fn new_(&mut self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::New {
            callee: Box::new(callee),
            arguments,
        })
    }

    pub fn member(&mut self, object: Expression, property: &str) -> Expression {
        let property = self.ident(property);
        self.expr(ExpressionKind::Member {
            object: Box::new(object),
            property,
        })
    }

    pub fn index(&mut self, object: Expression, index: Expression) -> Expression {
        self.expr(ExpressionKind::Index {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    pub fn assign(&mut self, target: Expression, value: Expression) -> Expression {
        self.expr(ExpressionKind::Assignment {
            target: Box::new(target),
            op: AssignmentOp::Assign,
            value: Box::new(value),
        })
    }

    pub fn compound_assign(
        &mut self,
        target: Expression,
        op: AssignmentOp,
        value: Expression,
    ) -> Expression {
        self.expr(ExpressionKind::Assignment {
            target: Box::new(target),
            op,
            value: Box::new(value),
        })
    }

    pub fn update(&mut self, op: UpdateOp, prefix: bool, target: Expression) -> Expression {
        self.expr(ExpressionKind::Update {
            op,
            prefix,
            target: Box::new(target),
        })
    }

    pub fn spread(&mut self, value: Expression) -> Expression {
        self.expr(ExpressionKind::Spread(Box::new(value)))
    }

    pub fn yield_(&mut self, value: Option<Expression>) -> Expression {
        self.expr(ExpressionKind::Yield(value.map(Box::new)))
    }

    pub fn template(&mut self, quasis: Vec<&str>, expressions: Vec<Expression>) -> Expression {
        let span = self.span();
        let quasis = quasis
            .into_iter()
            .map(|s| TemplateSpan {
                cooked: s.to_string(),
                raw: s.to_string(),
            })
            .collect();
        self.expr(ExpressionKind::Template(TemplateLiteral {
            quasis,
            expressions,
            span,
        }))
    }

    pub fn func_expr(
        &mut self,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
        is_generator: bool,
    ) -> Expression {
        let span = self.span();
        let body = self.block(body);
        self.expr(ExpressionKind::Function(FunctionExpression {
            name: None,
            parameters,
            this_param: None,
            body,
            is_generator,
            span,
        }))
    }

    pub fn arrow(&mut self, parameters: Vec<Parameter>, body: Expression) -> Expression {
        let span = self.span();
        self.expr(ExpressionKind::Arrow(ArrowFunction {
            parameters,
            body: ArrowBody::Expression(Box::new(body)),
            span,
        }))
    }

    // --- bindings / parameters ---

    pub fn binding(&mut self, name: &str) -> Binding {
        Binding::Identifier(self.ident(name))
    }

    pub fn array_binding(&mut self, elements: Vec<ArrayBindingElement>) -> Binding {
        let span = self.span();
        Binding::Array(ArrayBinding { elements, span })
    }

    pub fn element(&mut self, name: &str) -> ArrayBindingElement {
        ArrayBindingElement::Element(BindingElement {
            binding: self.binding(name),
            default: None,
        })
    }

    pub fn element_with_default(&mut self, name: &str, default: Expression) -> ArrayBindingElement {
        ArrayBindingElement::Element(BindingElement {
            binding: self.binding(name),
            default: Some(default),
        })
    }

    pub fn object_binding(&mut self, properties: Vec<ObjectBindingProperty>) -> Binding {
        let span = self.span();
        Binding::Object(ObjectBinding {
            properties,
            rest: None,
            span,
        })
    }

    pub fn object_binding_property(
        &mut self,
        key: &str,
        binding: Option<Binding>,
        default: Option<Expression>,
    ) -> ObjectBindingProperty {
        ObjectBindingProperty {
            key: self.ident(key),
            binding,
            default,
            span: self.span(),
        }
    }

    pub fn param(&mut self, name: &str) -> Parameter {
        Parameter {
            binding: self.binding(name),
            type_annotation: None,
            default: None,
            is_rest: false,
            is_optional: false,
            access: None,
            span: self.span(),
        }
    }

    pub fn rest_param(&mut self, name: &str) -> Parameter {
        Parameter {
            is_rest: true,
            ..self.param(name)
        }
    }

    pub fn param_with_default(&mut self, name: &str, default: Expression) -> Parameter {
        Parameter {
            default: Some(default),
            ..self.param(name)
        }
    }

    // --- statements ---

    pub fn block(&mut self, statements: Vec<Statement>) -> Block {
        Block {
            statements,
            span: self.span(),
        }
    }

    pub fn expr_stmt(&mut self, expression: Expression) -> Statement {
        self.stmt(StatementKind::Expression(expression))
    }

    pub fn let_(&mut self, name: &str, initializer: Expression) -> Statement {
        let binding = self.binding(name);
        self.var_stmt(VariableKind::Let, binding, Some(initializer))
    }

    pub fn const_(&mut self, name: &str, initializer: Expression) -> Statement {
        let binding = self.binding(name);
        self.var_stmt(VariableKind::Const, binding, Some(initializer))
    }

    pub fn const_pattern(&mut self, binding: Binding, initializer: Expression) -> Statement {
        self.var_stmt(VariableKind::Const, binding, Some(initializer))
    }

    pub fn var_stmt(
        &mut self,
        kind: VariableKind,
        binding: Binding,
        initializer: Option<Expression>,
    ) -> Statement {
        let span = self.span();
        self.stmt(StatementKind::Variable(VariableDeclaration {
            kind,
            declarations: vec![VariableDeclarator {
                binding,
                type_annotation: None,
                initializer,
                span,
            }],
            is_ambient: false,
            doc: None,
        }))
    }

    pub fn ret(&mut self, expression: Option<Expression>) -> Statement {
        self.stmt(StatementKind::Return(ReturnStatement { expression }))
    }

    pub fn throw(&mut self, expression: Expression) -> Statement {
        self.stmt(StatementKind::Throw(ThrowStatement { expression }))
    }

    pub fn break_(&mut self) -> Statement {
        self.stmt(StatementKind::Break)
    }

    pub fn continue_(&mut self) -> Statement {
        self.stmt(StatementKind::Continue)
    }

    pub fn block_stmt(&mut self, statements: Vec<Statement>) -> Statement {
        let block = self.block(statements);
        self.stmt(StatementKind::Block(block))
    }

    pub fn if_(
        &mut self,
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    ) -> Statement {
        let then_branch = self.block(then_branch);
        let else_branch = else_branch.map(|statements| self.block(statements));
        self.stmt(StatementKind::If(IfStatement {
            condition,
            then_branch,
            else_branch,
        }))
    }

    pub fn while_(&mut self, condition: Expression, body: Vec<Statement>) -> Statement {
        let body = self.block(body);
        self.stmt(StatementKind::While(WhileStatement { condition, body }))
    }

    pub fn do_while(&mut self, body: Vec<Statement>, condition: Expression) -> Statement {
        let body = self.block(body);
        self.stmt(StatementKind::DoWhile(DoWhileStatement { body, condition }))
    }

    pub fn for_(
        &mut self,
        initializer: Option<ForInitializer>,
        condition: Option<Expression>,
        incrementor: Option<Expression>,
        body: Vec<Statement>,
    ) -> Statement {
        let body = self.block(body);
        self.stmt(StatementKind::For(Box::new(ForStatement {
            initializer,
            condition,
            incrementor,
            body,
        })))
    }

    pub fn for_init(&mut self, name: &str, initializer: Expression) -> ForInitializer {
        let span = self.span();
        let binding = self.binding(name);
        ForInitializer::Variable(VariableDeclaration {
            kind: VariableKind::Let,
            declarations: vec![VariableDeclarator {
                binding,
                type_annotation: None,
                initializer: Some(initializer),
                span,
            }],
            is_ambient: false,
            doc: None,
        })
    }

    pub fn for_of(&mut self, name: &str, expression: Expression, body: Vec<Statement>) -> Statement {
        let binding = ForTarget::Declaration(VariableKind::Const, self.binding(name));
        let body = self.block(body);
        self.stmt(StatementKind::ForOf(Box::new(ForOfStatement {
            binding,
            expression,
            body,
        })))
    }

    pub fn for_in(&mut self, name: &str, expression: Expression, body: Vec<Statement>) -> Statement {
        let binding = ForTarget::Declaration(VariableKind::Const, self.binding(name));
        let body = self.block(body);
        self.stmt(StatementKind::ForIn(Box::new(ForInStatement {
            binding,
            expression,
            body,
        })))
    }

    pub fn switch(&mut self, expression: Expression, clauses: Vec<SwitchClause>) -> Statement {
        self.stmt(StatementKind::Switch(SwitchStatement { expression, clauses }))
    }

    pub fn case(&mut self, test: Expression, statements: Vec<Statement>) -> SwitchClause {
        SwitchClause {
            test: Some(test),
            statements,
            span: self.span(),
        }
    }

    pub fn default_case(&mut self, statements: Vec<Statement>) -> SwitchClause {
        SwitchClause {
            test: None,
            statements,
            span: self.span(),
        }
    }

    pub fn try_(
        &mut self,
        try_block: Vec<Statement>,
        catch: Option<(Option<&str>, Vec<Statement>)>,
        finally: Option<Vec<Statement>>,
    ) -> Statement {
        let try_block = self.block(try_block);
        let catch_clause = catch.map(|(variable, statements)| {
            let variable = variable.map(|name| self.ident(name));
            let block = self.block(statements);
            CatchClause {
                variable,
                block,
                span: self.span(),
            }
        });
        let finally_block = finally.map(|statements| self.block(statements));
        self.stmt(StatementKind::Try(TryStatement {
            try_block,
            catch_clause,
            finally_block,
        }))
    }

    pub fn func(
        &mut self,
        name: &str,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
    ) -> Statement {
        self.func_full(name, parameters, body, false, None)
    }

    pub fn generator(
        &mut self,
        name: &str,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
    ) -> Statement {
        self.func_full(name, parameters, body, true, None)
    }

    pub fn func_full(
        &mut self,
        name: &str,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
        is_generator: bool,
        doc: Option<DocComment>,
    ) -> Statement {
        let span = self.span();
        let name = self.ident(name);
        let body = self.block(body);
        self.stmt(StatementKind::Function(FunctionDeclaration {
            name: Some(name),
            parameters,
            this_param: None,
            return_type: None,
            body: Some(body),
            is_generator,
            is_ambient: false,
            doc,
            span,
        }))
    }

    pub fn doc_with_tags(&mut self, tags: &[&str]) -> DocComment {
        DocComment {
            text: Vec::new(),
            tags: tags
                .iter()
                .map(|name| DocTag {
                    name: name.to_string(),
                    text: String::new(),
                })
                .collect(),
        }
    }

    // --- classes ---

    pub fn class(&mut self, name: &str, members: Vec<ClassMember>) -> Statement {
        self.class_full(name, None, members, Vec::new())
    }

    pub fn class_extends(
        &mut self,
        name: &str,
        extends: Expression,
        members: Vec<ClassMember>,
    ) -> Statement {
        self.class_full(name, Some(extends), members, Vec::new())
    }

    pub fn class_full(
        &mut self,
        name: &str,
        extends: Option<Expression>,
        members: Vec<ClassMember>,
        decorators: Vec<Expression>,
    ) -> Statement {
        let span = self.span();
        let name = self.ident(name);
        self.stmt(StatementKind::Class(ClassDeclaration {
            decorators,
            name: Some(name),
            extends,
            members,
            is_ambient: false,
            doc: None,
            span,
        }))
    }

    pub fn property(&mut self, name: &str, initializer: Option<Expression>) -> ClassMember {
        let span = self.span();
        ClassMember::Property(PropertyDeclaration {
            is_static: false,
            name: self.ident(name),
            type_annotation: None,
            initializer,
            span,
        })
    }

    pub fn static_property(&mut self, name: &str, initializer: Option<Expression>) -> ClassMember {
        let span = self.span();
        ClassMember::Property(PropertyDeclaration {
            is_static: true,
            name: self.ident(name),
            type_annotation: None,
            initializer,
            span,
        })
    }

    pub fn constructor(&mut self, parameters: Vec<Parameter>, body: Vec<Statement>) -> ClassMember {
        let span = self.span();
        let body = self.block(body);
        ClassMember::Constructor(ConstructorDeclaration {
            parameters,
            body: Some(body),
            span,
        })
    }

    pub fn method(
        &mut self,
        name: &str,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
    ) -> ClassMember {
        let span = self.span();
        let name = self.ident(name);
        let body = self.block(body);
        ClassMember::Method(MethodDeclaration {
            is_static: false,
            name,
            parameters,
            this_param: None,
            body: Some(body),
            is_generator: false,
            doc: None,
            span,
        })
    }

    pub fn static_method(
        &mut self,
        name: &str,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
    ) -> ClassMember {
        let span = self.span();
        let name = self.ident(name);
        let body = self.block(body);
        ClassMember::Method(MethodDeclaration {
            is_static: true,
            name,
            parameters,
            this_param: None,
            body: Some(body),
            is_generator: false,
            doc: None,
            span,
        })
    }

    pub fn getter(&mut self, name: &str, body: Vec<Statement>) -> ClassMember {
        let span = self.span();
        let name = self.ident(name);
        let body = self.block(body);
        ClassMember::Getter(AccessorDeclaration {
            is_static: false,
            name,
            parameter: None,
            body,
            span,
        })
    }

    pub fn setter(&mut self, name: &str, parameter: Parameter, body: Vec<Statement>) -> ClassMember {
        let span = self.span();
        let name = self.ident(name);
        let body = self.block(body);
        ClassMember::Setter(AccessorDeclaration {
            is_static: false,
            name,
            parameter: Some(parameter),
            body,
            span,
        })
    }

    // --- enums / modules ---

    pub fn enum_(&mut self, name: &str, members: Vec<(&str, Option<Expression>)>) -> Statement {
        let span = self.span();
        let name = self.ident(name);
        let members = members
            .into_iter()
            .map(|(member_name, initializer)| {
                let id = self.node_id();
                EnumMember {
                    id,
                    name: self.ident(member_name),
                    initializer,
                    span: self.span(),
                }
            })
            .collect();
        self.stmt(StatementKind::Enum(EnumDeclaration {
            name,
            members,
            is_const: false,
            is_ambient: false,
            doc: None,
            span,
        }))
    }

    pub fn import_named(&mut self, names: Vec<&str>, module_path: &str) -> Statement {
        let span = self.span();
        let specifiers = names
            .into_iter()
            .map(|name| ImportSpecifier {
                imported: self.ident(name),
                local: None,
                is_type_only: false,
                span: self.span(),
            })
            .collect();
        self.stmt(StatementKind::Import(ImportDeclaration {
            clause: ImportClause::Named(specifiers),
            module_path: module_path.to_string(),
            span,
        }))
    }

    pub fn export(&mut self, declaration: Statement) -> Statement {
        let span = self.span();
        self.stmt(StatementKind::Export(ExportDeclaration {
            kind: ExportKind::Declaration(Box::new(declaration)),
            span,
        }))
    }

    pub fn namespace(&mut self, name: &str, statements: Vec<Statement>) -> Statement {
        let span = self.span();
        let name = self.ident(name);
        self.stmt(StatementKind::Namespace(NamespaceDeclaration {
            name,
            statements,
            is_ambient: false,
            span,
        }))
    }

    // --- files ---

    pub fn file(&mut self, statements: Vec<Statement>) -> SourceFile {
        SourceFile {
            id: self.node_id(),
            path: PathBuf::from("src/main.tsl"),
            statements,
            is_json: false,
            span: Span::new(0, self.cursor + 10, 1, 1),
        }
    }

    pub fn json_file(&mut self, expression: Expression) -> SourceFile {
        let statement = self.expr_stmt(expression);
        SourceFile {
            id: self.node_id(),
            path: PathBuf::from("src/data.json"),
            statements: vec![statement],
            is_json: true,
            span: Span::new(0, self.cursor + 10, 1, 1),
        }
    }
}
