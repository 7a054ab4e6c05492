use tstl_test_helpers::{transpile, AstBuilder, MockTypeOracle};

#[test]
fn test_try_catch_without_returns_uses_plain_pcall() {
    let mut b = AstBuilder::new();
    let f = b.name("f");
    let call = b.call(f, vec![]);
    let try_stmt = b.expr_stmt(call);
    let g = b.name("g");
    let e = b.name("e");
    let handle = b.call(g, vec![e]);
    let catch_stmt = b.expr_stmt(handle);
    let stmt = b.try_(vec![try_stmt], Some((Some("e"), vec![catch_stmt])), None);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local ____TS_try, ____TS_error = pcall(function()"));
    assert!(output.contains("if not ____TS_try then"));
    assert!(output.contains("local e = ____TS_error"));
    assert!(output.contains("g(e)"));
    assert!(!output.contains("____TS_returnValue"));
}

#[test]
fn test_try_with_returns_caches_and_propagates() {
    let mut b = AstBuilder::new();
    let a = b.str_("a");
    let try_ret = b.ret(Some(a));
    let c = b.str_("b");
    let catch_ret = b.ret(Some(c));
    let side = b.name("sideEffect");
    let side_call = b.call(side, vec![]);
    let finally_stmt = b.expr_stmt(side_call);
    let stmt = b.try_(
        vec![try_ret],
        Some((None, vec![catch_ret])),
        Some(vec![finally_stmt]),
    );
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output
        .contains("local ____TS_try, ____TS_returned, ____TS_returnValue = pcall(function()"));
    // Returns inside the try carry the truthy marker.
    assert!(output.contains("return true, \"a\""));
    // The catch body is wrapped and its result replaces the cached slots.
    assert!(output.contains("____TS_returned, ____TS_returnValue = (function()"));
    assert!(output.contains("return true, \"b\""));
    // The finally side effect runs before the cached value propagates.
    let side_pos = output.find("sideEffect()").unwrap();
    let propagate_pos = output.find("if ____TS_returned then").unwrap();
    assert!(side_pos < propagate_pos);
    assert!(output.contains("return ____TS_returnValue"));
}

#[test]
fn test_try_finally_without_catch_rethrows() {
    let mut b = AstBuilder::new();
    let f = b.name("f");
    let call = b.call(f, vec![]);
    let try_stmt = b.expr_stmt(call);
    let cleanup = b.name("cleanup");
    let cleanup_call = b.call(cleanup, vec![]);
    let finally_stmt = b.expr_stmt(cleanup_call);
    let stmt = b.try_(vec![try_stmt], None, Some(vec![finally_stmt]));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("cleanup()"));
    // Errors re-raise after the finally block has run.
    let cleanup_pos = output.find("cleanup()").unwrap();
    let rethrow_pos = output.find("error(____TS_error)").unwrap();
    assert!(cleanup_pos < rethrow_pos);
}

#[test]
fn test_rethrow_preserves_error_value() {
    let mut b = AstBuilder::new();
    // try { throw "oops" } catch (e) { throw e }
    let message = b.str_("oops");
    let inner_throw = b.throw(message);
    let e = b.name("e");
    let rethrow = b.throw(e);
    // e is untyped here, so the rethrow needs a string-typed oracle entry.
    let mut oracle = MockTypeOracle::new();
    if let tstl_core::ast::statement::StatementKind::Throw(throw) = &rethrow.kind {
        oracle.set_type(throw.expression.id, tstl_core::Type::String);
    }
    let stmt = b.try_(vec![inner_throw], Some((Some("e"), vec![rethrow])), None);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("error(\"oops\")"));
    assert!(output.contains("local e = ____TS_error"));
    assert!(output.contains("error(e)"));
}

#[test]
fn test_nested_function_returns_are_not_marked() {
    let mut b = AstBuilder::new();
    // try { const g = function() { return 1 } } catch {}
    let one = b.num(1.0);
    let inner_ret = b.ret(Some(one));
    let func = b.func_expr(vec![], vec![inner_ret], false);
    let decl = b.const_("g", func);
    let stmt = b.try_(vec![decl], Some((None, vec![])), None);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    // The inner function's return must stay unmarked, so the plain pcall
    // shape is chosen and no marker tuple appears.
    assert!(output.contains("local ____TS_try, ____TS_error = pcall(function()"));
    assert!(output.contains("return 1"));
    assert!(!output.contains("return true, 1"));
}
