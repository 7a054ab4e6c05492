use tstl_core::ast::pattern::ArrayBindingElement;
use tstl_core::oracle::{Signature, Type};
use tstl_test_helpers::{transpile, AstBuilder, MockTypeOracle};

#[test]
fn test_array_destructuring_of_array_unpacks() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let e1 = b.element("a");
    let e2 = b.element("b");
    let pattern = b.array_binding(vec![e1, e2]);
    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let stmt = b.const_pattern(pattern, arr);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "local a, b = table.unpack(arr)\n");
}

#[test]
fn test_tuple_return_call_destructures_without_unpack() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let e1 = b.element("a");
    let e2 = b.element("b");
    let pattern = b.array_binding(vec![e1, e2]);
    let f = b.name("f");
    let call = b.call(f, vec![]);
    oracle.set_signature(
        call.id,
        Signature {
            tuple_return: true,
            ..Default::default()
        },
    );
    let stmt = b.const_pattern(pattern, call);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "local a, b = f()\n");
}

#[test]
fn test_array_destructuring_with_hole() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let e1 = b.element("first");
    let e2 = b.element("third");
    let pattern = b.array_binding(vec![e1, ArrayBindingElement::Hole, e2]);
    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let stmt = b.const_pattern(pattern, arr);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "local first, ____, third = table.unpack(arr)\n");
}

#[test]
fn test_array_destructuring_with_rest() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let e1 = b.element("first");
    let rest_ident = b.ident("rest");
    let pattern = b.array_binding(vec![e1, ArrayBindingElement::Rest(rest_ident)]);
    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let stmt = b.const_pattern(pattern, arr);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("local first = arr[1]"));
    assert!(output.contains("local rest = {"));
    assert!(output.contains("table.unpack(arr, 2)"));
}

#[test]
fn test_array_destructuring_with_default() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let fallback = b.num(9.0);
    let e1 = b.element_with_default("a", fallback);
    let pattern = b.array_binding(vec![e1]);
    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let stmt = b.const_pattern(pattern, arr);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("local a = arr[1]"));
    assert!(output.contains("if a == nil then"));
    assert!(output.contains("a = 9"));
}

#[test]
fn test_object_destructuring() {
    let mut b = AstBuilder::new();
    let p1 = b.object_binding_property("name", None, None);
    let p2 = b.object_binding_property("age", None, None);
    let pattern = b.object_binding(vec![p1, p2]);
    let person = b.name("person");
    let stmt = b.const_pattern(pattern, person);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local name = person.name"));
    assert!(output.contains("local age = person.age"));
}

#[test]
fn test_nested_object_destructuring_with_defaults() {
    // const { a: { b = 5 } = {} } = { a: undefined } leaves b as 5.
    let mut b = AstBuilder::new();

    let five = b.num(5.0);
    let inner_prop = b.object_binding_property("b", None, Some(five));
    let inner = b.object_binding(vec![inner_prop]);
    let empty = b.object(vec![]);
    let outer_prop = b.object_binding_property("a", Some(inner), Some(empty));
    let pattern = b.object_binding(vec![outer_prop]);

    let undefined = b.undefined();
    let value = b.object(vec![("a", undefined)]);
    let stmt = b.const_pattern(pattern, value);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    // The outer property defaults to {} when nil, then b defaults to 5.
    assert!(output.contains("if ____TS_tmp2 == nil then"));
    assert!(output.contains("____TS_tmp2 = {}"));
    assert!(output.contains("local b = ____TS_tmp2.b"));
    assert!(output.contains("if b == nil then"));
    assert!(output.contains("b = 5"));
}

#[test]
fn test_object_rest_is_rejected() {
    let mut b = AstBuilder::new();
    let p1 = b.object_binding_property("a", None, None);
    let rest = b.ident("rest");
    let span = b.span();
    let pattern = tstl_core::ast::pattern::Binding::Object(tstl_core::ast::pattern::ObjectBinding {
        properties: vec![p1],
        rest: Some(rest),
        span,
    });
    let value = b.name("o");
    let stmt = b.const_pattern(pattern, value);
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(
        error.kind,
        tstl_core::TransformErrorKind::ForbiddenEllipsisDestruction
    );
}

#[test]
fn test_destructuring_assignment_to_existing_targets() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let a = b.name("a");
    let c = b.name("c");
    let targets = b.array(vec![a, c]);
    let arr = b.name("arr");
    oracle.set_type(arr.id, Type::Array(Box::new(Type::Number)));
    let assign = b.assign(targets, arr);
    let stmt = b.expr_stmt(assign);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "a, c = table.unpack(arr)\n");
}
