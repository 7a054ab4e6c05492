use tstl_core::oracle::ConstantValue;
use tstl_test_helpers::{transpile, AstBuilder, MockTypeOracle};

#[test]
fn test_file_with_exports_becomes_module() {
    let mut b = AstBuilder::new();
    let five = b.num(5.0);
    let decl = b.const_("x", five);
    let stmt = b.export(decl);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.starts_with("local ____exports = {}\n"));
    assert!(output.trim_end().ends_with("return ____exports"));
    assert!(output.contains("____exports.x"));
}

#[test]
fn test_oracle_known_exports_write_directly_to_exports_table() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let five = b.num(5.0);
    let decl = b.const_("x", five);
    // Bind the declared symbol and mark it exported from the file scope.
    let symbol = oracle.fresh_symbol();
    if let tstl_core::ast::statement::StatementKind::Variable(var) = &decl.kind {
        let ident = var.declarations[0].binding.as_identifier().unwrap();
        oracle.bind_symbol(symbol, &[ident.id]);
    }
    let stmt = b.export(decl);
    let file = b.file(vec![stmt]);
    oracle.add_export(file.id, symbol);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("____exports.x = 5"));
    // No shadow local remains.
    assert!(!output.contains("local x"));
}

#[test]
fn test_exported_references_rewrite_to_exports_field() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let five = b.num(5.0);
    let decl = b.const_("x", five);
    let symbol = oracle.fresh_symbol();
    if let tstl_core::ast::statement::StatementKind::Variable(var) = &decl.kind {
        let ident = var.declarations[0].binding.as_identifier().unwrap();
        oracle.bind_symbol(symbol, &[ident.id]);
    }
    let export = b.export(decl);

    let reference = b.name("x");
    oracle.bind_symbol(symbol, &[reference.id]);
    let print = b.name("print");
    let call = b.call(print, vec![reference]);
    let use_stmt = b.expr_stmt(call);

    let file = b.file(vec![export, use_stmt]);
    oracle.add_export(file.id, symbol);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("print(____exports.x)"));
}

#[test]
fn test_named_import_lowering_and_hoisting() {
    let mut b = AstBuilder::new();
    // A statement before the import: the hoister still lifts the require
    // to the top of the file.
    let one = b.num(1.0);
    let first = b.const_("a", one);
    let import = b.import_named(vec!["helper"], "./util");
    let helper = b.name("helper");
    let call = b.call(helper, vec![]);
    let use_stmt = b.expr_stmt(call);
    let file = b.file(vec![first, import, use_stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    let require_pos = output.find("require(\"src.util\")").unwrap();
    let decl_pos = output.find("local a = 1").unwrap();
    assert!(require_pos < decl_pos, "imports are lifted to the top");
    assert!(output.contains("local ____util = require(\"src.util\")"));
    assert!(output.contains("local helper = ____util.helper"));
}

#[test]
fn test_import_path_resolution_with_parent_directory() {
    let mut b = AstBuilder::new();
    let import = b.import_named(vec!["x"], "../lib/math");
    let file = b.file(vec![import]);

    // Source file sits at src/main.tsl, so ../lib resolves beside src.
    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("require(\"lib.math\")"));
}

#[test]
fn test_import_escaping_root_is_rejected() {
    let mut b = AstBuilder::new();
    let import = b.import_named(vec!["x"], "../../../outside");
    let file = b.file(vec![import]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(
        error.kind,
        tstl_core::TransformErrorKind::UnresolvableRequirePath
    );
}

#[test]
fn test_side_effect_import() {
    let mut b = AstBuilder::new();
    let span = b.span();
    let id = b.node_id();
    let stmt = tstl_core::ast::statement::Statement::new(
        id,
        tstl_core::ast::statement::StatementKind::Import(
            tstl_core::ast::statement::ImportDeclaration {
                clause: tstl_core::ast::statement::ImportClause::SideEffect,
                module_path: "./setup".to_string(),
                span,
            },
        ),
        span,
    );
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert_eq!(output, "require(\"src.setup\")\n");
}

#[test]
fn test_default_import_is_rejected() {
    let mut b = AstBuilder::new();
    let ident = b.ident("thing");
    let span = b.span();
    let id = b.node_id();
    let stmt = tstl_core::ast::statement::Statement::new(
        id,
        tstl_core::ast::statement::StatementKind::Import(
            tstl_core::ast::statement::ImportDeclaration {
                clause: tstl_core::ast::statement::ImportClause::Default(ident),
                module_path: "./thing".to_string(),
                span,
            },
        ),
        span,
    );
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(
        error.kind,
        tstl_core::TransformErrorKind::DefaultImportsNotSupported
    );
}

#[test]
fn test_enum_emits_forward_and_reverse_mappings() {
    let mut b = AstBuilder::new();
    let five = b.num(5.0);
    let stmt = b.enum_("Color", vec![("Red", None), ("Green", Some(five)), ("Blue", None)]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local Color = {}"));
    assert!(output.contains("Color.Red = 0"));
    assert!(output.contains("Color[0] = \"Red\""));
    assert!(output.contains("Color.Green = 5"));
    assert!(output.contains("Color[5] = \"Green\""));
    // Auto-increment continues from the explicit value.
    assert!(output.contains("Color.Blue = 6"));
    assert!(output.contains("Color[6] = \"Blue\""));
}

#[test]
fn test_string_enum_has_no_reverse_mapping() {
    let mut b = AstBuilder::new();
    let up = b.str_("up");
    let down = b.str_("down");
    let stmt = b.enum_("Direction", vec![("Up", Some(up)), ("Down", Some(down))]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("Direction.Up = \"up\""));
    assert!(output.contains("Direction.Down = \"down\""));
    assert!(!output.contains("Direction[\"up\"]"));
}

#[test]
fn test_mixed_enum_is_rejected() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let s = b.str_("two");
    let stmt = b.enum_("Bad", vec![("A", Some(one)), ("B", Some(s))]);
    let file = b.file(vec![stmt]);

    let error = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap_err();
    assert_eq!(error.kind, tstl_core::TransformErrorKind::HeterogeneousEnum);
}

#[test]
fn test_const_enum_disappears_and_members_fold() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    // const enum Flag { On = 1 } compiled away; Flag.On folds to 1.
    let span = b.span();
    let name = b.ident("Flag");
    let member_id = b.node_id();
    let member_name = b.ident("On");
    let one = b.num(1.0);
    let member_span = b.span();
    let id = b.node_id();
    let decl = tstl_core::ast::statement::Statement::new(
        id,
        tstl_core::ast::statement::StatementKind::Enum(tstl_core::ast::statement::EnumDeclaration {
            name,
            members: vec![tstl_core::ast::statement::EnumMember {
                id: member_id,
                name: member_name,
                initializer: Some(one),
                span: member_span,
            }],
            is_const: true,
            is_ambient: false,
            doc: None,
            span,
        }),
        span,
    );

    let flag = b.name("Flag");
    let access = b.member(flag, "On");
    oracle.set_constant(access.id, ConstantValue::Number(1.0));
    let ret = b.ret(Some(access));
    let file = b.file(vec![decl, ret]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert_eq!(output, "return 1\n");
}

#[test]
fn test_namespace_lowering() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let inner = b.const_("x", one);
    let stmt = b.namespace("NS", vec![inner]);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.contains("local NS = {}"));
    assert!(output.contains("do\n"));
    assert!(output.contains("local x = 1"));
}

#[test]
fn test_namespace_member_exports_mutate_namespace_table() {
    let mut b = AstBuilder::new();
    let mut oracle = MockTypeOracle::new();

    let one = b.num(1.0);
    let inner = b.const_("x", one);
    let symbol = oracle.fresh_symbol();
    if let tstl_core::ast::statement::StatementKind::Variable(var) = &inner.kind {
        let ident = var.declarations[0].binding.as_identifier().unwrap();
        oracle.bind_symbol(symbol, &[ident.id]);
    }
    let export = b.export(inner);
    let stmt = b.namespace("NS", vec![export]);
    oracle.add_export(stmt.id, symbol);
    let file = b.file(vec![stmt]);

    let output = transpile(&file, &oracle, &b.interner).unwrap();
    assert!(output.contains("NS.x = 1"));
}

#[test]
fn test_json_file_returns_expression() {
    let mut b = AstBuilder::new();
    let one = b.num(1.0);
    let two = b.num(2.0);
    let value = b.object(vec![("a", one), ("b", two)]);
    let file = b.json_file(value);

    let output = transpile(&file, &MockTypeOracle::new(), &b.interner).unwrap();
    assert!(output.starts_with("return {"));
    assert!(!output.contains("____exports"));
}
