use crate::ast::{DocComment, NodeId};
use crate::directives::Directive;
use serde::{Deserialize, Serialize};

/// Opaque symbol handle minted by the front end. The transformer never
/// inspects it; it only maps it to its own stable [`crate::symbols::SymbolId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OracleSymbol(pub u32);

/// Whether a function value receives an implicit `this`/`self` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextType {
    /// Could not be determined; treated as context-free.
    #[default]
    None,
    /// Explicitly context-free (`this: void` or @noSelf).
    Void,
    /// Receives a self parameter.
    NonVoid,
    /// A union of both kinds; conversions involving it are rejected.
    Mixed,
}

/// The semantic type model the oracle answers with. A deliberately shallow
/// rendition of the front end's types: the transformer only asks structural
/// questions (array-ness, string-ness, possible falsiness).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Type {
    #[default]
    Any,
    Unknown,
    Number,
    String,
    Boolean,
    Void,
    Undefined,
    Null,
    Never,
    Object,
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Function(Box<FunctionType>),
    Enum {
        symbol: OracleSymbol,
        is_const: bool,
    },
    Class(OracleSymbol),
    Union(Vec<Type>),
    NumberLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub context: ContextType,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}

impl Type {
    pub fn is_array_like(&self) -> bool {
        match self {
            Type::Array(_) | Type::Tuple(_) => true,
            Type::Union(members) => members.iter().all(|t| t.is_array_like()),
            _ => false,
        }
    }

    pub fn is_string(&self) -> bool {
        match self {
            Type::String | Type::StringLiteral(_) => true,
            Type::Union(members) => members.iter().all(|t| t.is_string()),
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        match self {
            Type::Number | Type::NumberLiteral(_) => true,
            Type::Union(members) => members.iter().all(|t| t.is_number()),
            _ => false,
        }
    }

    /// Whether a value of this type could be falsy in Lua (nil or false).
    /// Under non-strict null checks every non-literal type admits nil.
    pub fn may_be_falsy(&self, strict_null_checks: bool) -> bool {
        match self {
            Type::Undefined | Type::Null | Type::Boolean | Type::Void | Type::Any
            | Type::Unknown | Type::Never => true,
            Type::BooleanLiteral(value) => !value,
            Type::NumberLiteral(_) | Type::StringLiteral(_) => false,
            Type::Union(members) => members.iter().any(|t| t.may_be_falsy(strict_null_checks)),
            _ => !strict_null_checks,
        }
    }
}

/// A resolved call signature.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub context_type: ContextType,
    pub return_type: Type,
    /// Marked @tupleReturn: multiple Lua return values, no wrapping table.
    pub tuple_return: bool,
    pub directives: Vec<Directive>,
}

impl Signature {
    pub fn has_directive(&self, kind: crate::directives::DirectiveKind) -> bool {
        self.directives.iter().any(|d| d.kind == kind)
    }
}

/// A constant value folded by the front end (const enum members, literal
/// property reads).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Number(f64),
    String(String),
}

/// The minimal capability set the transformer requires from the external
/// type checker. Every method has a permissive default so partial oracles
/// (tests, the JSON-driven CLI) only implement what they exercise.
pub trait TypeOracle {
    /// The semantic type of an expression node.
    fn type_of(&self, _node: NodeId) -> Type {
        Type::Any
    }

    /// The semantic type denoted by a type-annotation node.
    fn type_from_type_node(&self, _node: NodeId) -> Type {
        Type::Any
    }

    fn symbol_of(&self, _node: NodeId) -> Option<OracleSymbol> {
        None
    }

    /// Declaration sites of a symbol, in source order. Used to detect
    /// merged declarations (namespaces) and first-declaration checks.
    fn symbol_declarations(&self, _symbol: OracleSymbol) -> Vec<NodeId> {
        Vec::new()
    }

    /// The symbols exported from a file or namespace scope node.
    fn exports_of(&self, _scope: NodeId) -> Vec<OracleSymbol> {
        Vec::new()
    }

    fn fully_qualified_name(&self, _symbol: OracleSymbol) -> Option<String> {
        None
    }

    /// The signature selected for a call expression node.
    fn resolved_signature(&self, _call: NodeId) -> Option<Signature> {
        None
    }

    /// Call signatures of a type; defaults to deriving one from a
    /// function-shaped type.
    fn signatures_of_type(&self, ty: &Type) -> Vec<Signature> {
        match ty {
            Type::Function(func) => vec![Signature {
                context_type: func.context,
                return_type: func.return_type.clone(),
                tuple_return: false,
                directives: Vec::new(),
            }],
            _ => Vec::new(),
        }
    }

    fn return_type_of_signature(&self, signature: &Signature) -> Type {
        signature.return_type.clone()
    }

    /// The type expected at a position, e.g. the declared type a function
    /// value is being assigned to.
    fn contextual_type(&self, _node: NodeId) -> Option<Type> {
        None
    }

    fn base_constraint_of(&self, _ty: &Type) -> Option<Type> {
        None
    }

    fn base_types_of(&self, _ty: &Type) -> Vec<Type> {
        Vec::new()
    }

    /// Constant value of a property or element access, when the front end
    /// folded one (const enum members).
    fn constant_value_of(&self, _node: NodeId) -> Option<ConstantValue> {
        None
    }

    /// Doc comment attached to a symbol's declaration, for directive lookup.
    fn doc_comment_of(&self, _symbol: OracleSymbol) -> Option<DocComment> {
        None
    }

    // Emit-resolver subset: import elision.

    /// False when an import binding is type-only and may be elided.
    fn is_value_alias_declaration(&self, _node: NodeId) -> bool {
        true
    }

    fn is_referenced_alias_declaration(&self, _node: NodeId) -> bool {
        true
    }

    fn module_exports_some_value(&self, _module_path: &str) -> bool {
        true
    }
}

/// An oracle that knows nothing: every type is `any`, nothing is exported,
/// no signatures resolve. Used by the CLI when no front end is attached.
#[derive(Debug, Default)]
pub struct NullTypeOracle;

impl TypeOracle for NullTypeOracle {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsiness() {
        assert!(Type::Boolean.may_be_falsy(true));
        assert!(Type::Undefined.may_be_falsy(true));
        assert!(!Type::NumberLiteral(1.0).may_be_falsy(true));
        assert!(!Type::Number.may_be_falsy(true));
        // Non-strict nulls: anything non-literal admits nil.
        assert!(Type::Number.may_be_falsy(false));
        assert!(Type::Union(vec![Type::Number, Type::Undefined]).may_be_falsy(true));
    }

    #[test]
    fn test_array_like() {
        assert!(Type::Array(Box::new(Type::Number)).is_array_like());
        assert!(Type::Tuple(vec![Type::Number, Type::String]).is_array_like());
        assert!(!Type::Object.is_array_like());
    }

    #[test]
    fn test_null_oracle_defaults() {
        let oracle = NullTypeOracle;
        assert_eq!(oracle.type_of(NodeId(1)), Type::Any);
        assert!(oracle.symbol_of(NodeId(1)).is_none());
        assert!(oracle.resolved_signature(NodeId(1)).is_none());
    }
}
