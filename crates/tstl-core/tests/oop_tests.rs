use tstl_test_helpers::{transpile, transpile_with_features, AstBuilder, MockTypeOracle};
use tstl_core::LuaLibFeature;

#[test]
fn test_simple_class_protocol() {
    let mut b = AstBuilder::new();
    let stmt = b.class("Person", vec![]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local Person = {}"));
    assert!(output.contains("Person.name = \"Person\""));
    assert!(output.contains("Person.__index = Person"));
    assert!(output.contains("Person.prototype = {}"));
    assert!(output.contains("Person.prototype.__index = Person.prototype"));
    assert!(output.contains("Person.prototype.constructor = Person"));
    assert!(output.contains("Person.new = function(...)"));
    assert!(output.contains("setmetatable({}, Person.prototype)"));
    assert!(output.contains("self:____constructor(...)"));
}

#[test]
fn test_class_with_constructor_and_fields() {
    let mut b = AstBuilder::new();
    let zero = b.num(0.0);
    let field = b.property("count", Some(zero));
    let this1 = b.this();
    let target = b.member(this1, "name");
    let n = b.name("name");
    let assign = b.assign(target, n);
    let body_stmt = b.expr_stmt(assign);
    let param = b.param("name");
    let ctor = b.constructor(vec![param], vec![body_stmt]);
    let stmt = b.class("Person", vec![field, ctor]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Person.prototype.____constructor = function(self, name)"));
    // Field initialisers run before the constructor body.
    let field_pos = output.find("self.count = 0").unwrap();
    let body_pos = output.find("self.name = name").unwrap();
    assert!(field_pos < body_pos);
}

#[test]
fn test_class_methods_take_self() {
    let mut b = AstBuilder::new();
    let this = b.this();
    let x = b.member(this, "x");
    let ret = b.ret(Some(x));
    let method = b.method("getX", vec![], vec![ret]);
    let stmt = b.class("Point", vec![method]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Point.prototype.getX = function(self)"));
    assert!(output.contains("return self.x"));
}

#[test]
fn test_static_method_goes_on_constructor_table() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let ret = b.ret(Some(one));
    let method = b.static_method("make", vec![], vec![ret]);
    let stmt = b.class("Factory", vec![method]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Factory.make = function(self)"));
    assert!(!output.contains("Factory.prototype.make"));
}

#[test]
fn test_to_string_becomes_tostring_metamethod() {
    let mut b = AstBuilder::new();
    let text = b.str_("p");
    let ret = b.ret(Some(text));
    let method = b.method("toString", vec![], vec![ret]);
    let stmt = b.class("Point", vec![method]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Point.prototype.__tostring = function(self)"));
}

#[test]
fn test_accessors_register_class_index_helpers() {
    let mut b = AstBuilder::new();

    let this1 = b.this();
    let backing = b.member(this1, "_x");
    let get_ret = b.ret(Some(backing));
    let getter = b.getter("x", vec![get_ret]);

    let this2 = b.this();
    let target = b.member(this2, "_x");
    let v = b.name("v");
    let set_assign = b.assign(target, v);
    let set_stmt = b.expr_stmt(set_assign);
    let param = b.param("v");
    let setter = b.setter("x", param, vec![set_stmt]);

    let zero = b.num(0.0);
    let field = b.property("_x", Some(zero));

    let stmt = b.class("C", vec![field, getter, setter]);
    let file = b.file(vec![stmt]);

    let (output, features) =
        transpile_with_features(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("C.prototype.__index = __TS__Index(C.prototype)"));
    assert!(output.contains("C.prototype.__newindex = __TS__NewIndex(C.prototype)"));
    assert!(output.contains("C.prototype.____getters"));
    assert!(output.contains("C.prototype.____setters"));
    assert!(features.contains(&LuaLibFeature::ClassIndex));
    assert!(features.contains(&LuaLibFeature::ClassNewIndex));
}

#[test]
fn test_inheritance_links_metatables() {
    let mut b = AstBuilder::new();
    let base = b.name("Animal");
    let stmt = b.class_extends("Dog", base, vec![]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Dog.____super = Animal"));
    assert!(output.contains("setmetatable(Dog, Animal)"));
    assert!(output.contains("setmetatable(Dog.prototype, Animal.prototype)"));
    // The generated default constructor chains upward.
    assert!(output.contains("Dog.____super.prototype.____constructor(self, ...)"));
}

#[test]
fn test_super_call_in_constructor() {
    let mut b = AstBuilder::new();
    let base = b.name("Animal");
    let super_kw = tstl_core::ast::expression::Expression::new(
        b.node_id(),
        tstl_core::ast::expression::ExpressionKind::Super,
        tstl_core::span::Span::zero(),
    );
    let name_arg = b.name("name");
    let super_call = b.call(super_kw, vec![name_arg]);
    let call_stmt = b.expr_stmt(super_call);
    let param = b.param("name");
    let ctor = b.constructor(vec![param], vec![call_stmt]);
    let stmt = b.class_extends("Dog", base, vec![ctor]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Dog.____super.prototype.____constructor(self, name)"));
}

#[test]
fn test_new_expression_calls_class_new() {
    let mut b = AstBuilder::new();
    let c = b.name("C");
    let five = b.num(5.0);
    let new = b.new_(c, vec![five]);
    let stmt = b.const_("c", new);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "local c = C.new(5)\n");
}

#[test]
fn test_class_decorators_wrap_constructor() {
    let mut b = AstBuilder::new();
    let decorator = b.name("sealed");
    let stmt = b.class_full("C", None, vec![], vec![decorator]);
    let file = b.file(vec![stmt]);

    let (output, features) =
        transpile_with_features(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("C = __TS__Decorate("));
    assert!(output.contains("sealed"));
    assert!(features.contains(&LuaLibFeature::Decorate));
}

#[test]
fn test_static_property_initialises_on_constructor_table() {
    let mut b = AstBuilder::new();
    let value = b.num(7.0);
    let property = b.static_property("count", Some(value));
    let stmt = b.class("Counter", vec![property]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Counter.count = 7"));
}

#[test]
fn test_forbidden_static_name() {
    let mut b = AstBuilder::new();
    let value = b.num(1.0);
    let property = b.static_property("name", Some(value));
    let stmt = b.class("C", vec![property]);
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(
        error.kind,
        tstl_core::TransformErrorKind::ForbiddenStaticClassPropertyName
    );
}

#[test]
fn test_missing_class_name_is_rejected() {
    let mut b = AstBuilder::new();
    let span = b.span();
    let id = b.node_id();
    let stmt = tstl_core::ast::statement::Statement::new(
        id,
        tstl_core::ast::statement::StatementKind::Class(
            tstl_core::ast::statement::ClassDeclaration {
                decorators: vec![],
                name: None,
                extends: None,
                members: vec![],
                is_ambient: false,
                doc: None,
                span,
            },
        ),
        span,
    );
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(error.kind, tstl_core::TransformErrorKind::MissingClassName);
}
