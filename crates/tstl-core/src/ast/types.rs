use super::{Ident, NodeId};
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A syntactic type annotation. The transformer never interprets these
/// beyond a few structural checks; semantic questions go through the
/// TypeOracle's `type_from_type_node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeNode {
    pub id: NodeId,
    pub kind: TypeNodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeNodeKind {
    Any,
    Unknown,
    Number,
    String,
    Boolean,
    Void,
    Undefined,
    Null,
    Never,
    This,
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Function {
        parameters: Vec<TypeNode>,
        this_param: Option<Box<TypeNode>>,
        return_type: Box<TypeNode>,
    },
    Reference {
        name: Ident,
        type_arguments: Vec<TypeNode>,
    },
    Union(Vec<TypeNode>),
    Literal(LiteralTypeNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralTypeNode {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl TypeNode {
    /// An explicit `this: void` parameter marks a context-free function.
    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeNodeKind::Void)
    }
}
