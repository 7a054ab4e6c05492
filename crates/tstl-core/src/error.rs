use crate::span::Span;
use thiserror::Error;

/// The closed set of fatal transformation failures. Every kind aborts the
/// current file; the Host decides whether to continue with other files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformErrorKind {
    UnsupportedKind,
    UnsupportedProperty,
    UnsupportedForTarget,
    UnsupportedOverloadAssignment,
    UnsupportedSelfFunctionConversion,
    UnsupportedNoSelfFunctionConversion,
    UnsupportedFunctionWithoutBody,
    InvalidJsonFileContent,
    InvalidDecoratorContext,
    InvalidDecoratorArgumentNumber,
    InvalidExtensionMetaExtension,
    InvalidExtendsExtension,
    InvalidExtendsLuaTable,
    InvalidInstanceOfExtension,
    InvalidInstanceOfLuaTable,
    InvalidAmbientIdentifierName,
    InvalidExportsExtension,
    InvalidExportDeclaration,
    InvalidThrowExpression,
    InvalidForRangeCall,
    InvalidPropertyCall,
    InvalidElementCall,
    InvalidNewExpressionOnExtension,
    MissingClassName,
    MissingMetaExtension,
    MissingFunctionName,
    MissingSourceFile,
    MissingForOfVariables,
    UndefinedScope,
    UndefinedTypeNode,
    UndefinedFunctionDefinition,
    HeterogeneousEnum,
    UnknownSuperType,
    UnresolvableRequirePath,
    ForbiddenStaticClassPropertyName,
    ForbiddenLuaTableUseException,
    ForbiddenLuaTableNonDeclaration,
    ForbiddenLuaTableSetExpression,
    ForbiddenForIn,
    ForbiddenEllipsisDestruction,
    UnsupportedObjectDestructuringInForOf,
    UnsupportedNonDestructuringLuaIterator,
    UnsupportedImportType,
    UnsupportedDefaultExport,
    DefaultImportsNotSupported,
    ReferencedBeforeDeclaration,
    CouldNotCast,
}

/// A fatal transformation error, carrying the origin position of the TSL
/// node that triggered it.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct TransformError {
    pub kind: TransformErrorKind,
    pub span: Span,
    pub message: String,
}

pub type TransformResult<T> = Result<T, TransformError>;

impl TransformError {
    pub fn new(kind: TransformErrorKind, span: Span, message: impl Into<String>) -> Self {
        TransformError {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn unsupported_kind(span: Span, description: &str) -> Self {
        Self::new(
            TransformErrorKind::UnsupportedKind,
            span,
            format!("Unsupported node kind: {description}"),
        )
    }

    pub fn unsupported_property(span: Span, owner: &str, property: &str) -> Self {
        Self::new(
            TransformErrorKind::UnsupportedProperty,
            span,
            format!("Unsupported property on {owner}: {property}"),
        )
    }

    pub fn unsupported_for_target(span: Span, construct: &str, target: &str) -> Self {
        Self::new(
            TransformErrorKind::UnsupportedForTarget,
            span,
            format!("{construct} is not supported for target {target}"),
        )
    }

    pub fn invalid_throw_expression(span: Span) -> Self {
        Self::new(
            TransformErrorKind::InvalidThrowExpression,
            span,
            "Invalid throw expression, only strings can be thrown",
        )
    }

    pub fn invalid_ambient_identifier(span: Span, name: &str) -> Self {
        Self::new(
            TransformErrorKind::InvalidAmbientIdentifierName,
            span,
            format!("Invalid ambient identifier name \"{name}\": ambient identifiers must be valid Lua identifiers"),
        )
    }

    pub fn forbidden_for_in(span: Span) -> Self {
        Self::new(
            TransformErrorKind::ForbiddenForIn,
            span,
            "Iterating over arrays with for...in is not allowed",
        )
    }

    pub fn forbidden_ellipsis_destruction(span: Span) -> Self {
        Self::new(
            TransformErrorKind::ForbiddenEllipsisDestruction,
            span,
            "Object rest elements cannot be destructured",
        )
    }

    pub fn missing_class_name(span: Span) -> Self {
        Self::new(
            TransformErrorKind::MissingClassName,
            span,
            "Class declarations must have a name",
        )
    }

    pub fn missing_function_name(span: Span) -> Self {
        Self::new(
            TransformErrorKind::MissingFunctionName,
            span,
            "Function declarations must have a name",
        )
    }

    pub fn missing_for_of_variables(span: Span) -> Self {
        Self::new(
            TransformErrorKind::MissingForOfVariables,
            span,
            "Transpiled for...of requires an iteration variable",
        )
    }

    pub fn heterogeneous_enum(span: Span, name: &str) -> Self {
        Self::new(
            TransformErrorKind::HeterogeneousEnum,
            span,
            format!("Enum \"{name}\" mixes numeric and string member values"),
        )
    }

    pub fn unresolvable_require_path(span: Span, path: &str) -> Self {
        Self::new(
            TransformErrorKind::UnresolvableRequirePath,
            span,
            format!("Cannot resolve \"{path}\": import paths must be inside the project root"),
        )
    }

    pub fn invalid_for_range_call(span: Span, reason: &str) -> Self {
        Self::new(
            TransformErrorKind::InvalidForRangeCall,
            span,
            format!("Invalid @forRange call: {reason}"),
        )
    }

    pub fn undefined_scope(span: Span) -> Self {
        Self::new(
            TransformErrorKind::UndefinedScope,
            span,
            "Internal error: scope stack underflow",
        )
    }

    pub fn default_imports_not_supported(span: Span) -> Self {
        Self::new(
            TransformErrorKind::DefaultImportsNotSupported,
            span,
            "Default imports are not supported",
        )
    }

    pub fn unsupported_default_export(span: Span) -> Self {
        Self::new(
            TransformErrorKind::UnsupportedDefaultExport,
            span,
            "Default exports are not supported",
        )
    }

    pub fn forbidden_static_property_name(span: Span, name: &str) -> Self {
        Self::new(
            TransformErrorKind::ForbiddenStaticClassPropertyName,
            span,
            format!("Static class members cannot be named \"{name}\""),
        )
    }

    pub fn invalid_json_file_content(span: Span) -> Self {
        Self::new(
            TransformErrorKind::InvalidJsonFileContent,
            span,
            "JSON source files must contain a single value",
        )
    }
}
