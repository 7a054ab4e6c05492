use super::expression::Expression;
use super::Ident;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A binding target in a variable declaration or parameter list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Binding {
    Identifier(Ident),
    Array(ArrayBinding),
    Object(ObjectBinding),
}

impl Binding {
    pub fn span(&self) -> Span {
        match self {
            Binding::Identifier(ident) => ident.span,
            Binding::Array(array) => array.span,
            Binding::Object(object) => object.span,
        }
    }

    pub fn as_identifier(&self) -> Option<&Ident> {
        match self {
            Binding::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayBinding {
    pub elements: Vec<ArrayBindingElement>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArrayBindingElement {
    Element(BindingElement),
    /// `...rest`; must be last.
    Rest(Ident),
    /// An elided position: `const [, x] = pair`.
    Hole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingElement {
    pub binding: Binding,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectBinding {
    pub properties: Vec<ObjectBindingProperty>,
    /// Rest elements on object patterns are rejected during lowering.
    pub rest: Option<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectBindingProperty {
    pub key: Ident,
    /// None for shorthand `{ key }`.
    pub binding: Option<Binding>,
    pub default: Option<Expression>,
    pub span: Span,
}
