//! Transpile convenience wrappers for tests: transform one built source
//! file and print the Lua output.

use rustc_hash::FxHashSet;
use std::sync::Arc;
use tstl_core::ast::SourceFile;
use tstl_core::config::CompilerOptions;
use tstl_core::diagnostics::CollectingDiagnosticHandler;
use tstl_core::lua::LuaPrinter;
use tstl_core::oracle::TypeOracle;
use tstl_core::string_interner::StringInterner;
use tstl_core::transform::transform_source_file;
use tstl_core::{LuaLibFeature, TransformError};

pub fn transpile(
    file: &SourceFile,
    oracle: &dyn TypeOracle,
    interner: &StringInterner,
) -> Result<String, TransformError> {
    let options = CompilerOptions::default();
    transpile_with_options(file, oracle, interner, &options)
}

pub fn transpile_with_options(
    file: &SourceFile,
    oracle: &dyn TypeOracle,
    interner: &StringInterner,
    options: &CompilerOptions,
) -> Result<String, TransformError> {
    let handler = Arc::new(CollectingDiagnosticHandler::new());
    let transformed = transform_source_file(file, oracle, options, handler, interner)?;
    Ok(LuaPrinter::new().print(&transformed.block))
}

pub fn transpile_with_features(
    file: &SourceFile,
    oracle: &dyn TypeOracle,
    interner: &StringInterner,
) -> Result<(String, FxHashSet<LuaLibFeature>), TransformError> {
    let options = CompilerOptions::default();
    let handler = Arc::new(CollectingDiagnosticHandler::new());
    let transformed = transform_source_file(file, oracle, &options, handler, interner)?;
    let printed = LuaPrinter::new().print(&transformed.block);
    Ok((printed, transformed.used_features))
}
