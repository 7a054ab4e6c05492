//! Block-exit rewriting: when a scope pops, imports are lifted first,
//! forward-referenced locals gain a `local` declaration at block entry, and
//! function definitions that must exist before their reference sites move
//! to the top in their original relative order.

use crate::config::CompilerOptions;
use crate::error::{TransformError, TransformErrorKind, TransformResult};
use crate::lua;
use crate::scope::Scope;
use crate::symbols::{SymbolId, SymbolTracker};
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) fn rewrite(
    scope: &Scope,
    statements: Vec<lua::Statement>,
    symbols: &SymbolTracker,
    options: &CompilerOptions,
) -> TransformResult<Vec<lua::Statement>> {
    let mut result: Vec<lua::Statement> = scope.import_statements.clone();

    if options.no_hoisting {
        check_use_before_declaration(scope)?;
        result.extend(statements);
        return Ok(result);
    }

    // A symbol counts as forward-referenced when any reference site, or its
    // very first sighting anywhere in the file, precedes the declaration.
    let referenced_before = |symbol: SymbolId, declared_at: u32| -> bool {
        if let Some(references) = scope.referenced_symbols.get(&symbol) {
            if references.iter().any(|span| span.start < declared_at) {
                return true;
            }
        }
        symbols
            .first_seen(symbol)
            .map(|span| span.start < declared_at)
            .unwrap_or(false)
    };

    // Function definitions that must move to the top: those referenced
    // before their definition, closed over by other moved definitions.
    let mut hoisted_functions: FxHashSet<SymbolId> = scope
        .function_definitions
        .iter()
        .filter(|(symbol, info)| referenced_before(**symbol, info.declared_at.start))
        .map(|(symbol, _)| *symbol)
        .collect();
    loop {
        let mut grew = false;
        let snapshot: Vec<SymbolId> = hoisted_functions.iter().copied().collect();
        for symbol in snapshot {
            if let Some(info) = scope.function_definitions.get(&symbol) {
                for referenced in &info.referenced_symbols {
                    if scope.function_definitions.contains_key(referenced)
                        && hoisted_functions.insert(*referenced)
                    {
                        grew = true;
                    }
                }
            }
        }
        if !grew {
            break;
        }
    }

    // Variables a hoisted function closes over must be declared at the top
    // as well, or the closure would capture a global instead of the local.
    let mut symbols_needed_at_top: FxHashSet<SymbolId> = FxHashSet::default();
    for symbol in &hoisted_functions {
        if let Some(info) = scope.function_definitions.get(symbol) {
            symbols_needed_at_top.extend(info.referenced_symbols.iter().copied());
        }
    }

    let hoisted_function_indices: FxHashMap<usize, SymbolId> = scope
        .function_definitions
        .iter()
        .filter(|(symbol, _)| hoisted_functions.contains(*symbol))
        .filter_map(|(symbol, info)| {
            info.statement_index.map(|index| (index, *symbol))
        })
        .collect();
    for (symbol, info) in &scope.function_definitions {
        if hoisted_functions.contains(symbol) && info.statement_index.is_none() {
            return Err(TransformError::new(
                TransformErrorKind::UndefinedFunctionDefinition,
                info.declared_at,
                "Internal error: hoisted function definition has no placement",
            ));
        }
    }

    // Declaration statements to split into `local` at top plus assignment
    // in place.
    let mut hoisted_declaration_indices: FxHashSet<usize> = FxHashSet::default();
    for record in &scope.declarations {
        if hoisted_function_indices.contains_key(&record.statement_index) {
            continue;
        }
        let needs_hoist = record.names.iter().any(|(symbol, _)| {
            symbol
                .map(|symbol| {
                    referenced_before(symbol, record.declared_at.start)
                        || symbols_needed_at_top.contains(&symbol)
                })
                .unwrap_or(false)
        });
        if needs_hoist {
            hoisted_declaration_indices.insert(record.statement_index);
        }
    }

    if hoisted_function_indices.is_empty() && hoisted_declaration_indices.is_empty() {
        result.extend(statements);
        return Ok(result);
    }

    // Top region: `local` declarations for hoisted variables, then for the
    // hoisted functions, then the function assignments in original order.
    let mut declaration_region: Vec<lua::Statement> = Vec::new();
    let mut function_region: Vec<(usize, lua::Statement)> = Vec::new();
    let mut body_region: Vec<lua::Statement> = Vec::new();

    for (index, statement) in statements.into_iter().enumerate() {
        if hoisted_function_indices.contains_key(&index) {
            let lua::StatementKind::LocalDeclaration { names, expressions } = statement.kind
            else {
                return Err(TransformError::new(
                    TransformErrorKind::UndefinedFunctionDefinition,
                    statement.origin.unwrap_or_default(),
                    "Internal error: function definition site is not a declaration",
                ));
            };
            declaration_region.push(lua::Statement::local(
                names.clone(),
                Vec::new(),
                statement.origin,
            ));
            let targets = names
                .into_iter()
                .map(lua::Expression::identifier)
                .collect();
            function_region.push((
                index,
                lua::Statement::assign(targets, expressions, statement.origin),
            ));
            continue;
        }

        if hoisted_declaration_indices.contains(&index) {
            if let lua::StatementKind::LocalDeclaration { names, expressions } = statement.kind {
                declaration_region.push(lua::Statement::local(
                    names.clone(),
                    Vec::new(),
                    statement.origin,
                ));
                if !expressions.is_empty() {
                    let targets = names
                        .into_iter()
                        .map(lua::Expression::identifier)
                        .collect();
                    body_region.push(lua::Statement::assign(
                        targets,
                        expressions,
                        statement.origin,
                    ));
                }
                continue;
            }
            // A non-local declaration record (e.g. an exports assignment)
            // needs no splitting.
            body_region.push(statement);
            continue;
        }

        body_region.push(statement);
    }

    function_region.sort_by_key(|(index, _)| *index);

    result.extend(declaration_region);
    result.extend(function_region.into_iter().map(|(_, statement)| statement));
    result.extend(body_region);
    Ok(result)
}

fn check_use_before_declaration(scope: &Scope) -> TransformResult<()> {
    for record in &scope.declarations {
        for (symbol, name) in &record.names {
            let Some(symbol) = symbol else { continue };
            if let Some(references) = scope.referenced_symbols.get(symbol) {
                if references
                    .iter()
                    .any(|span| span.start < record.declared_at.start)
                {
                    return Err(TransformError::new(
                        TransformErrorKind::ReferencedBeforeDeclaration,
                        record.declared_at,
                        format!("\"{name}\" is referenced before its declaration and hoisting is disabled"),
                    ));
                }
            }
        }
    }
    Ok(())
}
