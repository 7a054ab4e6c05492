//! tstl-core: the AST-to-AST transformer translating a type-checked,
//! class-oriented source language into Lua. Parsing, type checking, file
//! I/O and Lua printing of the emitted tree live behind narrow interfaces
//! ([`oracle::TypeOracle`], the CLI crate, [`lua::printer`]).

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod directives;
pub mod error;
pub mod lua;
pub mod lualib;
pub mod oracle;
pub mod scope;
pub mod span;
pub mod string_interner;
pub mod symbols;
pub mod transform;

pub use config::{CompilerConfig, CompilerOptions, LuaLibImport, LuaTarget};
pub use diagnostics::{
    CollectingDiagnosticHandler, ConsoleDiagnosticHandler, Diagnostic, DiagnosticHandler,
    DiagnosticLevel,
};
pub use error::{TransformError, TransformErrorKind, TransformResult};
pub use lualib::{lua_lib_bundle, LuaLibFeature, LuaLibRegistry};
pub use oracle::{ContextType, NullTypeOracle, Signature, Type, TypeOracle};
pub use span::Span;
pub use transform::{transform_source_file, LuaTransformer, TransformedFile};
