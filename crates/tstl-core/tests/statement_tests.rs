use tstl_core::ast::expression::{AssignmentOp, BinaryOp};
use tstl_core::config::{CompilerOptions, LuaTarget};
use tstl_test_helpers::{transpile, transpile_with_options, AstBuilder, MockTypeOracle};

#[test]
fn test_block_statement_preserves_scoping() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let inner = b.let_("x", one);
    let block = b.block_stmt(vec![inner]);
    let two = b.num(2.0);
    let after = b.let_("y", two);
    let file = b.file(vec![block, after]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "do\n    local x = 1\nend\nlocal y = 2\n");
}

#[test]
fn test_if_else() {
    let mut b = AstBuilder::new();
    let cond = b.name("cond");
    let a = b.num(1.0);
    let then_stmt = b.let_("a", a);
    let c = b.num(2.0);
    let else_stmt = b.let_("b", c);
    let stmt = b.if_(cond, vec![then_stmt], Some(vec![else_stmt]));
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(
        output,
        "if cond then\n    local a = 1\nelse\n    local b = 2\nend\n"
    );
}

#[test]
fn test_while_loop() {
    let mut b = AstBuilder::new();
    let cond = b.name("cond");
    let f = b.name("f");
    let call = b.call(f, vec![]);
    let body = b.expr_stmt(call);
    let stmt = b.while_(cond, vec![body]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "while cond do\n    f()\nend\n");
}

#[test]
fn test_do_while_lowers_to_repeat_until() {
    let mut b = AstBuilder::new();
    let f = b.name("f");
    let call = b.call(f, vec![]);
    let body = b.expr_stmt(call);
    let cond = b.name("cond");
    let stmt = b.do_while(vec![body], cond);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "repeat\n    f()\nuntil not cond\n");
}

#[test]
fn test_for_loop_lowers_to_scoped_while() {
    let mut b = AstBuilder::new();
    let zero = b.num(0.0);
    let init = b.for_init("i", zero);
    let i1 = b.name("i");
    let ten = b.num(10.0);
    let cond = b.binary(BinaryOp::LessThan, i1, ten);
    let i2 = b.name("i");
    let one = b.num(1.0);
    let incr = b.compound_assign(i2, AssignmentOp::Add, one);
    let f = b.name("f");
    let i3 = b.name("i");
    let call = b.call(f, vec![i3]);
    let body = b.expr_stmt(call);
    let stmt = b.for_(Some(init), Some(cond), Some(incr), vec![body]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(
        output,
        "do\n    local i = 0\n    while i < 10 do\n        f(i)\n        i = i + 1\n    end\nend\n"
    );
}

#[test]
fn test_continue_emits_goto_and_label() {
    let mut b = AstBuilder::new();
    let cond = b.name("cond");
    let inner_cond = b.name("skip");
    let cont = b.continue_();
    let guard = b.if_(inner_cond, vec![cont], None);
    let f = b.name("f");
    let call = b.call(f, vec![]);
    let work = b.expr_stmt(call);
    let stmt = b.while_(cond, vec![guard, work]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("goto __continue"));
    assert!(output.contains("::__continue"));
    // Label is the last thing in the loop body.
    let label_pos = output.find("::__continue").unwrap();
    let call_pos = output.find("f()").unwrap();
    assert!(call_pos < label_pos);
}

#[test]
fn test_continue_in_for_loop_jumps_before_incrementor() {
    let mut b = AstBuilder::new();
    let zero = b.num(0.0);
    let init = b.for_init("i", zero);
    let i1 = b.name("i");
    let ten = b.num(10.0);
    let cond = b.binary(BinaryOp::LessThan, i1, ten);
    let i2 = b.name("i");
    let one = b.num(1.0);
    let incr = b.compound_assign(i2, AssignmentOp::Add, one);
    let cont = b.continue_();
    let stmt = b.for_(Some(init), Some(cond), Some(incr), vec![cont]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    let label_pos = output.find("::__continue").unwrap();
    let incr_pos = output.find("i = i + 1").unwrap();
    assert!(label_pos < incr_pos, "continue label must precede the incrementor");
}

#[test]
fn test_switch_lowering_with_fall_through() {
    let mut b = AstBuilder::new();
    let value = b.num(2.0);

    let one = b.num(1.0);
    let r1 = b.name("r");
    let p1 = b.member(r1, "push");
    let a1 = b.num(1.0);
    let c1_call = b.call(p1, vec![a1]);
    let c1_stmt = b.expr_stmt(c1_call);
    let clause1 = b.case(one, vec![c1_stmt]);

    let two = b.num(2.0);
    let r2 = b.name("r");
    let p2 = b.member(r2, "push");
    let a2 = b.num(2.0);
    let c2_call = b.call(p2, vec![a2]);
    let c2_stmt = b.expr_stmt(c2_call);
    let clause2 = b.case(two, vec![c2_stmt]);

    let three = b.num(3.0);
    let r3 = b.name("r");
    let p3 = b.member(r3, "push");
    let a3 = b.num(3.0);
    let c3_call = b.call(p3, vec![a3]);
    let c3_stmt = b.expr_stmt(c3_call);
    let brk = b.break_();
    let clause3 = b.case(three, vec![c3_stmt, brk]);

    let r4 = b.name("r");
    let p4 = b.member(r4, "push");
    let a4 = b.num(0.0);
    let d_call = b.call(p4, vec![a4]);
    let d_stmt = b.expr_stmt(d_call);
    let default = b.default_case(vec![d_stmt]);

    let stmt = b.switch(value, vec![clause1, clause2, clause3, default]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    // Dispatch chain, case labels, fall-through order, break to end label.
    assert!(output.contains("local ____TS_switch"));
    assert!(output.contains("goto ____TS_switch"));
    assert!(output.contains("_case_0"));
    assert!(output.contains("_case_1"));
    assert!(output.contains("_default"));
    assert!(output.contains("_end"));
    let case1 = output.find("::____TS_switch2_case_1::").unwrap();
    let case2 = output.find("::____TS_switch2_case_2::").unwrap();
    assert!(case1 < case2, "case bodies stay in source order for fall-through");
    // break lowers to a goto targeting the switch end label.
    let break_goto = output.rfind("goto ____TS_switch2_end").unwrap();
    assert!(break_goto > case2);
}

#[test]
fn test_switch_is_rejected_on_lua51() {
    let mut b = AstBuilder::new();
    let value = b.num(1.0);
    let one = b.num(1.0);
    let clause = b.case(one, vec![]);
    let stmt = b.switch(value, vec![clause]);
    let file = b.file(vec![stmt]);

    let options = CompilerOptions {
        lua_target: LuaTarget::Lua51,
        ..Default::default()
    };
    let error = transpile_with_options(&file, &MockTypeOracle::new(), &b.interner, &options)
        .unwrap_err();
    assert_eq!(
        error.kind,
        tstl_core::TransformErrorKind::UnsupportedForTarget
    );
}

#[test]
fn test_throw_string_lowers_to_error() {
    let mut b = AstBuilder::new();
    let message = b.str_("oops");
    let stmt = b.throw(message);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "error(\"oops\")\n");
}

#[test]
fn test_throw_non_string_is_rejected() {
    let mut b = AstBuilder::new();
    let value = b.num(1.0);
    let stmt = b.throw(value);
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(
        error.kind,
        tstl_core::TransformErrorKind::InvalidThrowExpression
    );
}

#[test]
fn test_pure_expression_statement_is_bound_to_throwaway() {
    let mut b = AstBuilder::new();
    let x = b.name("x");
    let y = b.name("y");
    let add = b.binary(BinaryOp::Add, x, y);
    let stmt = b.expr_stmt(add);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "local ____ = x + y\n");
}
