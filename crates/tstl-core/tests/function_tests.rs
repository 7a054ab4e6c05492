use tstl_core::ast::statement::StatementKind;
use tstl_core::config::CompilerOptions;
use tstl_core::oracle::{ContextType, Signature, Type};
use tstl_core::LuaLibFeature;
use tstl_test_helpers::{transpile, transpile_with_features, transpile_with_options, AstBuilder, MockTypeOracle};

#[test]
fn test_function_declaration_lowers_to_local() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let ret = b.ret(Some(one));
    let param = b.param("x");
    let decl = b.func("f", vec![param], vec![ret]);
    let file = b.file(vec![decl]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local f = function(x)"));
    assert!(output.contains("return 1"));
}

#[test]
fn test_parameter_default_guard() {
    let mut b = AstBuilder::new();
    let fallback = b.num(3.0);
    let param = b.param_with_default("x", fallback);
    let x = b.name("x");
    let ret = b.ret(Some(x));
    let decl = b.func("f", vec![param], vec![ret]);
    let file = b.file(vec![decl]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("if x == nil then"));
    assert!(output.contains("x = 3"));
}

#[test]
fn test_rest_parameter_collects_varargs() {
    let mut b = AstBuilder::new();
    let rest = b.rest_param("items");
    let items = b.name("items");
    let ret = b.ret(Some(items));
    let decl = b.func("f", vec![rest], vec![ret]);
    let file = b.file(vec![decl]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local f = function(...)"));
    assert!(output.contains("local items = {"));
    assert!(output.contains("..."));
}

#[test]
fn test_method_call_with_nonvoid_context_uses_colon_syntax() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let obj = b.name("obj");
    let callee = b.member(obj, "greet");
    let arg = b.str_("hi");
    let call = b.call(callee, vec![arg]);
    oracle.set_signature(
        call.id,
        Signature {
            context_type: ContextType::NonVoid,
            ..Default::default()
        },
    );
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "obj:greet(\"hi\")\n");
}

#[test]
fn test_bare_nonvoid_call_receives_global_context() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let f = b.name("f");
    let one = b.num(1.0);
    let call = b.call(f, vec![one]);
    oracle.set_signature(
        call.id,
        Signature {
            context_type: ContextType::NonVoid,
            ..Default::default()
        },
    );
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "f(_G, 1)\n");
}

#[test]
fn test_bare_nonvoid_call_receives_nil_in_strict_mode() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let f = b.name("f");
    let call = b.call(f, vec![]);
    oracle.set_signature(
        call.id,
        Signature {
            context_type: ContextType::NonVoid,
            ..Default::default()
        },
    );
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let options = CompilerOptions {
        strict: true,
        ..Default::default()
    };
    let output = transpile_with_options(&file, &oracle, &b.interner, &options).unwrap();
    assert_eq!(output, "f(nil)\n");
}

#[test]
fn test_void_context_call_is_plain() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let obj = b.name("obj");
    let callee = b.member(obj, "helper");
    let call = b.call(callee, vec![]);
    oracle.set_signature(
        call.id,
        Signature {
            context_type: ContextType::Void,
            ..Default::default()
        },
    );
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "obj.helper()\n");
}

#[test]
fn test_tuple_return_function_flattens_array_returns() {
    let mut b = AstBuilder::new();
    let a = b.num(1.0);
    let c = b.num(2.0);
    let pair = b.array(vec![a, c]);
    let ret = b.ret(Some(pair));
    let doc = b.doc_with_tags(&["tupleReturn"]);
    let decl = b.func_full("pair", vec![], vec![ret], false, Some(doc));
    let file = b.file(vec![decl]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("return 1, 2"));
}

#[test]
fn test_generator_lowers_to_coroutine_iterator() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let yield_one = b.yield_(Some(one));
    let stmt = b.expr_stmt(yield_one);
    let decl = b.generator("gen", vec![], vec![stmt]);
    let file = b.file(vec![decl]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("coroutine.create(function()"));
    assert!(output.contains("coroutine.yield(1)"));
    assert!(output.contains("coroutine.resume(____TS_co, ...)"));
    assert!(output.contains("done = coroutine.status(____TS_co) == \"dead\""));
    assert!(output.contains("next = function(____, ...)"));
}

#[test]
fn test_arrow_function_has_no_self_parameter() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let one = b.num(1.0);
    let body = b.binary(tstl_core::ast::expression::BinaryOp::Add, x, one);
    let param = b.param("x");
    let arrow = b.arrow(vec![param], body);
    let decl = b.const_("inc", arrow);
    let file = b.file(vec![decl]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local inc = function(x)"));
    assert!(output.contains("return x + 1"));
}

#[test]
fn test_function_with_nonvoid_type_receives_self() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let decl = b.func("handler", vec![], vec![]);
    let name_id = match &decl.kind {
        StatementKind::Function(func) => func.name.as_ref().unwrap().id,
        _ => unreachable!(),
    };
    oracle.set_type(
        name_id,
        Type::Function(Box::new(tstl_core::oracle::FunctionType {
            context: ContextType::NonVoid,
            parameter_types: vec![],
            return_type: Type::Void,
        })),
    );
    let file = b.file(vec![decl]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("local handler = function(self)"));
}

#[test]
fn test_for_of_over_array_uses_ipairs() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let v = b.name("v");
    let print = b.name("print");
    let call = b.call(print, vec![v]);
    let body = b.expr_stmt(call);
    let stmt = b.for_of("v", arr, vec![body]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "for ____, v in ipairs(arr) do\n    print(v)\nend\n");
}

#[test]
fn test_for_of_over_iterable_uses_runtime_iterator() {
    let mut b = AstBuilder::new();
    let iterable = b.name("it");
    let stmt = b.for_of("v", iterable, vec![]);
    let file = b.file(vec![stmt]);

    let (output, features) =
        transpile_with_features(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("for v in __TS__iterator(it) do"));
    assert!(features.contains(&LuaLibFeature::Iterator));
}

#[test]
fn test_for_range_lowers_to_numeric_for() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let range = b.name("range");
    let symbol = oracle.fresh_symbol();
    oracle.bind_symbol(symbol, &[range.id]);
    oracle.set_symbol_directives(symbol, &["forRange"]);
    let one = b.num(1.0);
    let ten = b.num(10.0);
    let call = b.call(range, vec![one, ten]);
    let stmt = b.for_of("i", call, vec![]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "for i = 1, 10 do\nend\n");
}

#[test]
fn test_for_range_with_wrong_arity_is_rejected() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let range = b.name("range");
    let symbol = oracle.fresh_symbol();
    oracle.bind_symbol(symbol, &[range.id]);
    oracle.set_symbol_directives(symbol, &["forRange"]);
    let one = b.num(1.0);
    let call = b.call(range, vec![one]);
    let stmt = b.for_of("i", call, vec![]);
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &oracle, &b.interner).unwrap_err();
    assert_eq!(error.kind, tstl_core::TransformErrorKind::InvalidForRangeCall);
}

#[test]
fn test_lua_iterator_for_of() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let pairs_fn = b.name("nodes");
    let symbol = oracle.fresh_symbol();
    oracle.bind_symbol(symbol, &[pairs_fn.id]);
    oracle.set_symbol_directives(symbol, &["luaIterator"]);
    let call = b.call(pairs_fn, vec![]);
    let stmt = b.for_of("node", call, vec![]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "for node in nodes() do\nend\n");
}

#[test]
fn test_for_in_uses_pairs() {
    let mut b = AstBuilder::new();
    let obj = b.name("obj");
    let k = b.name("k");
    let print = b.name("print");
    let call = b.call(print, vec![k]);
    let body = b.expr_stmt(call);
    let stmt = b.for_in("k", obj, vec![body]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "for k in pairs(obj) do\n    print(k)\nend\n");
}

#[test]
fn test_for_in_over_array_is_rejected() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let stmt = b.for_in("k", arr, vec![]);
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &oracle, &b.interner).unwrap_err();
    assert_eq!(error.kind, tstl_core::TransformErrorKind::ForbiddenForIn);
}

#[test]
fn test_new_map_uses_lualib_collection() {
    let mut b = AstBuilder::new();
    let map = b.name("Map");
    let new = b.new_(map, vec![]);
    let stmt = b.const_("m", new);
    let file = b.file(vec![stmt]);

    let (output, features) =
        transpile_with_features(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "local m = Map.new()\n");
    assert!(features.contains(&LuaLibFeature::Map));
}
