use tstl_core::ast::expression::{AssignmentOp, BinaryOp, UpdateOp};
use tstl_core::config::{CompilerOptions, LuaTarget};
use tstl_core::oracle::Type;
use tstl_test_helpers::{transpile, transpile_with_options, AstBuilder, MockTypeOracle};

#[test]
fn test_simple_local_declaration() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let stmt = b.let_("x", one);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "local x = 1\n");
}

#[test]
fn test_sentinel_globals() {
    let mut b = AstBuilder::new();
    let undefined = b.undefined();
    let s1 = b.let_("a", undefined);
    let nan = b.name("NaN");
    let s2 = b.let_("b", nan);
    let inf = b.name("Infinity");
    let s3 = b.let_("c", inf);
    let global = b.name("globalThis");
    let s4 = b.let_("d", global);
    let file = b.file(vec![s1, s2, s3, s4]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local a = nil"));
    assert!(output.contains("local b = (0 / 0)"));
    assert!(output.contains("local c = math.huge"));
    assert!(output.contains("local d = _G"));
}

#[test]
fn test_array_element_access_is_one_based() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let a = b.name("a");
    oracle.set_type(a.id, Type::Array(Box::new(Type::Number)));
    let i = b.name("i");
    oracle.set_type(i.id, Type::Number);
    let access = b.index(a, i);
    let stmt = b.ret(Some(access));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return a[i + 1]\n");
}

#[test]
fn test_constant_index_folds() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let a = b.name("a");
    oracle.set_type(a.id, Type::Array(Box::new(Type::Number)));
    let zero = b.num(0.0);
    let access = b.index(a, zero);
    let stmt = b.ret(Some(access));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return a[1]\n");
}

#[test]
fn test_index_minus_one_cancels_adjustment() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let a = b.name("a");
    oracle.set_type(a.id, Type::Array(Box::new(Type::Number)));
    let i = b.name("i");
    oracle.set_type(i.id, Type::Number);
    let one = b.num(1.0);
    let index = b.binary(BinaryOp::Subtract, i, one);
    oracle.set_type(index.id, Type::Number);
    let access = b.index(a, index);
    let stmt = b.ret(Some(access));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return a[i]\n");
}

#[test]
fn test_length_lowers_to_length_operator() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let a = b.name("a");
    oracle.set_type(a.id, Type::Array(Box::new(Type::Number)));
    let length = b.member(a, "length");
    let s1 = b.ret(Some(length));
    let file = b.file(vec![s1]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return #a\n");
}

#[test]
fn test_string_concatenation() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let greeting = b.str_("hello ");
    let name = b.name("name");
    oracle.set_type(name.id, Type::String);
    let concat = b.binary(BinaryOp::Add, greeting, name);
    let stmt = b.ret(Some(concat));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return \"hello \" .. name\n");
}

#[test]
fn test_concat_wraps_untyped_operands_in_tostring() {
    let mut b = AstBuilder::new();
    let prefix = b.str_("value: ");
    let value = b.name("v");
    let concat = b.binary(BinaryOp::Add, prefix, value);
    let stmt = b.ret(Some(concat));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("tostring(v)"));
}

#[test]
fn test_ternary_with_truthy_branch() {
    let mut b = AstBuilder::new();
    let cond = b.name("cond");
    let one = b.num(1.0);
    let two = b.num(2.0);
    let conditional = b.conditional(cond, one, two);
    let stmt = b.ret(Some(conditional));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return cond and 1 or 2\n");
}

#[test]
fn test_ternary_with_possibly_falsy_branch_uses_closures() {
    let mut b = AstBuilder::new();
    let cond = b.name("cond");
    let t = b.bool_(false);
    let f = b.bool_(true);
    let conditional = b.conditional(cond, t, f);
    let stmt = b.ret(Some(conditional));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    // Both branches wrapped in closures and the chosen one called.
    assert!(output.contains("function()"));
    assert!(output.contains("return false"));
    assert!(output.contains("return true"));
    assert!(output.trim_end().ends_with(")()"));
}

#[test]
fn test_typeof_comparison_fuses_to_type_call() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let type_of = b.type_of(x);
    let object_str = b.str_("object");
    let cmp = b.binary(BinaryOp::StrictEqual, type_of, object_str);
    let stmt = b.ret(Some(cmp));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return type(x) == \"table\"\n");
}

#[test]
fn test_bare_typeof_uses_lualib() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let type_of = b.type_of(x);
    let stmt = b.ret(Some(type_of));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return __TS__TypeOf(x)\n");
}

#[test]
fn test_instanceof_uses_lualib() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let c = b.name("C");
    let check = b.binary(BinaryOp::InstanceOf, x, c);
    let stmt = b.ret(Some(check));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return __TS__InstanceOf(x, C)\n");
}

#[test]
fn test_instanceof_object_special_case() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let object = b.name("Object");
    let check = b.binary(BinaryOp::InstanceOf, x, object);
    let stmt = b.ret(Some(check));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return __TS__InstanceOfObject(x)\n");
}

#[test]
fn test_native_bitwise_on_default_target() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let y = b.name("y");
    let and = b.binary(BinaryOp::BitwiseAnd, x, y);
    let stmt = b.ret(Some(and));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return x & y\n");
}

#[test]
fn test_unsigned_shift_right_is_native_shift() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let y = b.name("y");
    let shift = b.binary(BinaryOp::ShiftRightUnsigned, x, y);
    let stmt = b.ret(Some(shift));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return x >> y\n");
}

#[test]
fn test_bitwise_library_on_lua52() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let y = b.name("y");
    let or = b.binary(BinaryOp::BitwiseOr, x, y);
    let stmt = b.ret(Some(or));
    let file = b.file(vec![stmt]);

    let options = CompilerOptions {
        lua_target: LuaTarget::Lua52,
        ..Default::default()
    };
    let output =
        transpile_with_options(&file, &MockTypeOracle::new(), &b.interner, &options).unwrap();
    assert_eq!(output, "return bit32.bor(x, y)\n");
}

#[test]
fn test_compound_assignment_statement() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let one = b.num(1.0);
    let assign = b.compound_assign(x, AssignmentOp::Add, one);
    let stmt = b.expr_stmt(assign);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "x = x + 1\n");
}

#[test]
fn test_update_statement() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let update = b.update(UpdateOp::Increment, false, x);
    let stmt = b.expr_stmt(update);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "x = x + 1\n");
}

#[test]
fn test_postfix_update_as_expression_returns_old_value() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let update = b.update(UpdateOp::Increment, false, x);
    let stmt = b.let_("y", update);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local ____TS_tmp1 = x"));
    assert!(output.contains("x = ____TS_tmp1 + 1"));
    assert!(output.contains("return ____TS_tmp1"));
}

#[test]
fn test_compound_element_assignment_evaluates_index_once() {
    let mut b = AstBuilder::new();
    let a = b.name("a");
    let f = b.name("f");
    let key = b.call(f, vec![]);
    let target = b.index(a, key);
    let one = b.num(1.0);
    let assign = b.compound_assign(target, AssignmentOp::Add, one);
    let stmt = b.expr_stmt(assign);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local ____TS_index = f()"));
    assert_eq!(output.matches("f()").count(), 1);
}

#[test]
fn test_template_literal_folds_to_concat() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();
    let value = b.name("x");
    oracle.set_type(value.id, Type::String);
    let template = b.template(vec!["a ", " b"], vec![value]);
    let stmt = b.ret(Some(template));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("\"a \""));
    assert!(output.contains(" .. x"));
    assert!(output.contains("\" b\""));
}

#[test]
fn test_spread_of_array_unpacks() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();
    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let spread = b.spread(arr);
    let f = b.name("f");
    let call = b.call(f, vec![spread]);
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "f(table.unpack(arr))\n");
}

#[test]
fn test_spread_of_unknown_uses_lualib() {
    let mut b = AstBuilder::new();
    let value = b.name("it");
    let spread = b.spread(value);
    let f = b.name("f");
    let call = b.call(f, vec![spread]);
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "f(__TS__Spread(it))\n");
}

#[test]
fn test_math_intrinsics() {
    let mut b = AstBuilder::new();
    let math1 = b.name("Math");
    let atan2 = b.member(math1, "atan2");
    let y = b.name("y");
    let x = b.name("x");
    let call = b.call(atan2, vec![y, x]);
    let s1 = b.ret(Some(call));
    let file = b.file(vec![s1]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return math.atan(y / x)\n");
}

#[test]
fn test_math_round() {
    let mut b = AstBuilder::new();
    let math = b.name("Math");
    let round = b.member(math, "round");
    let x = b.name("x");
    let call = b.call(round, vec![x]);
    let stmt = b.ret(Some(call));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return math.floor(x + 0.5)\n");
}

#[test]
fn test_math_pi_constant() {
    let mut b = AstBuilder::new();
    let math = b.name("Math");
    let pi = b.member(math, "PI");
    let stmt = b.ret(Some(pi));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return math.pi\n");
}

#[test]
fn test_console_log_lowers_to_print() {
    let mut b = AstBuilder::new();
    let console = b.name("console");
    let log = b.member(console, "log");
    let message = b.str_("hi");
    let call = b.call(log, vec![message]);
    let stmt = b.expr_stmt(call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "print(\"hi\")\n");
}

#[test]
fn test_has_own_property_uses_rawget() {
    let mut b = AstBuilder::new();
    let obj = b.name("o");
    let callee = b.member(obj, "hasOwnProperty");
    let key = b.str_("k");
    let call = b.call(callee, vec![key]);
    let stmt = b.ret(Some(call));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "return rawget(o, \"k\") ~= nil\n");
}

#[test]
fn test_array_push_and_pop() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let a1 = b.name("a");
    oracle.set_type(a1.id, Type::Array(Box::new(Type::Number)));
    let push = b.member(a1, "push");
    let three = b.num(3.0);
    let push_call = b.call(push, vec![three]);
    let s1 = b.expr_stmt(push_call);

    let a2 = b.name("a");
    oracle.set_type(a2.id, Type::Array(Box::new(Type::Number)));
    let pop = b.member(a2, "pop");
    let pop_call = b.call(pop, vec![]);
    let s2 = b.expr_stmt(pop_call);

    let file = b.file(vec![s1, s2]);
    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("__TS__ArrayPush(a, 3)"));
    assert!(output.contains("table.remove(a)"));
}

#[test]
fn test_string_methods() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let s = b.name("s");
    oracle.set_type(s.id, Type::String);
    let upper = b.member(s, "toUpperCase");
    let call = b.call(upper, vec![]);
    let stmt = b.ret(Some(call));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return string.upper(s)\n");
}

#[test]
fn test_string_split_uses_lualib() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let s = b.name("s");
    oracle.set_type(s.id, Type::String);
    let split = b.member(s, "split");
    let sep = b.str_(",");
    let call = b.call(split, vec![sep]);
    let stmt = b.ret(Some(call));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return __TS__StringSplit(s, \",\")\n");
}

#[test]
fn test_delete_statement_assigns_nil() {
    let mut b = AstBuilder::new();
    let obj = b.name("o");
    let target = b.member(obj, "k");
    let id = target.id;
    let delete = tstl_core::ast::expression::Expression::new(
        id,
        tstl_core::ast::expression::ExpressionKind::Delete(Box::new(target)),
        tstl_core::span::Span::zero(),
    );
    let stmt = b.expr_stmt(delete);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "o.k = nil\n");
}

#[test]
fn test_mangled_identifier_declaration() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let stmt = b.let_("end", one);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "local ____end = 1\n");
}
