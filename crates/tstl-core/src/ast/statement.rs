use super::expression::Expression;
use super::pattern::Binding;
use super::types::TypeNode;
use super::{DocComment, Ident, NodeId};
use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: NodeId,
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(id: NodeId, kind: StatementKind, span: Span) -> Self {
        Statement { id, kind, span }
    }

    /// The doc comment attached to this statement, if it is a declaration
    /// that can carry one. File-level directives are read from the first
    /// top-level statement's doc.
    pub fn doc(&self) -> Option<&DocComment> {
        match &self.kind {
            StatementKind::Variable(decl) => decl.doc.as_ref(),
            StatementKind::Function(decl) => decl.doc.as_ref(),
            StatementKind::Class(decl) => decl.doc.as_ref(),
            StatementKind::Enum(decl) => decl.doc.as_ref(),
            StatementKind::Interface(decl) => decl.doc.as_ref(),
            StatementKind::Export(export) => match &export.kind {
                ExportKind::Declaration(inner) => inner.doc(),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatementKind {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Enum(EnumDeclaration),
    Namespace(NamespaceDeclaration),
    Interface(InterfaceDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Import(ImportDeclaration),
    Export(ExportDeclaration),
    If(IfStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(Box<ForStatement>),
    ForOf(Box<ForOfStatement>),
    ForIn(Box<ForInStatement>),
    Switch(SwitchStatement),
    Break,
    Continue,
    Return(ReturnStatement),
    Throw(ThrowStatement),
    Try(TryStatement),
    Block(Block),
    Expression(Expression),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Let,
    Const,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
    pub is_ambient: bool,
    pub doc: Option<DocComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub binding: Binding,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: Option<Ident>,
    pub parameters: Vec<Parameter>,
    pub this_param: Option<TypeNode>,
    pub return_type: Option<TypeNode>,
    /// None for overload signatures and ambient declarations.
    pub body: Option<Block>,
    pub is_generator: bool,
    pub is_ambient: bool,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub binding: Binding,
    pub type_annotation: Option<TypeNode>,
    pub default: Option<Expression>,
    pub is_rest: bool,
    pub is_optional: bool,
    /// Parameter-property shorthand on constructors.
    pub access: Option<AccessModifier>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub decorators: Vec<Expression>,
    pub name: Option<Ident>,
    pub extends: Option<Expression>,
    pub members: Vec<ClassMember>,
    pub is_ambient: bool,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassMember {
    Property(PropertyDeclaration),
    Constructor(ConstructorDeclaration),
    Method(MethodDeclaration),
    Getter(AccessorDeclaration),
    Setter(AccessorDeclaration),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub is_static: bool,
    pub name: Ident,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorDeclaration {
    pub parameters: Vec<Parameter>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub is_static: bool,
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub this_param: Option<TypeNode>,
    pub body: Option<Block>,
    pub is_generator: bool,
    pub doc: Option<DocComment>,
    pub span: Span,
}

/// Getter (no parameter) or setter (one parameter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessorDeclaration {
    pub is_static: bool,
    pub name: Ident,
    pub parameter: Option<Parameter>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: Ident,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
    pub is_ambient: bool,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMember {
    pub id: NodeId,
    pub name: Ident,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDeclaration {
    pub name: Ident,
    pub statements: Vec<Statement>,
    pub is_ambient: bool,
    pub span: Span,
}

/// Type-level declarations emit nothing; the name is kept so directives and
/// diagnostics can refer to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub name: Ident,
    pub doc: Option<DocComment>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeAliasDeclaration {
    pub name: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub clause: ImportClause,
    pub module_path: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImportClause {
    Named(Vec<ImportSpecifier>),
    Namespace(Ident),
    Default(Ident),
    SideEffect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub imported: Ident,
    pub local: Option<Ident>,
    pub is_type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDeclaration {
    pub kind: ExportKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportKind {
    Declaration(Box<Statement>),
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    Default(Expression),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: Ident,
    pub exported: Option<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoWhileStatement {
    pub body: Block,
    pub condition: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForStatement {
    pub initializer: Option<ForInitializer>,
    pub condition: Option<Expression>,
    pub incrementor: Option<Expression>,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ForInitializer {
    Variable(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForOfStatement {
    pub binding: ForTarget,
    pub expression: Expression,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForInStatement {
    pub binding: ForTarget,
    pub expression: Expression,
    pub body: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ForTarget {
    Declaration(VariableKind, Binding),
    Expression(Expression),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub expression: Expression,
    pub clauses: Vec<SwitchClause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchClause {
    /// None marks the default clause.
    pub test: Option<Expression>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub expression: Option<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrowStatement {
    pub expression: Expression,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryStatement {
    pub try_block: Block,
    pub catch_clause: Option<CatchClause>,
    pub finally_block: Option<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchClause {
    pub variable: Option<Ident>,
    pub block: Block,
    pub span: Span,
}
