use super::analyzer::{Analysis, analyze};
use crate::parser::{Parser, lex};

/// Lex + parse (asserting both are clean) + analyze.
fn analyzed(source: &str) -> Analysis {
    let lexed = lex(source);
    assert_eq!(
        lexed.diagnostics.error_count(),
        0,
        "lexer errors in test source"
    );
    let tokens = lexed.tokens.clone();
    let parsed = Parser::new(source, lexed.tokens, lexed.end).parse();
    assert_eq!(
        parsed.diagnostics.error_count(),
        0,
        "parser errors in test source"
    );
    analyze(&parsed.root, &tokens)
}

#[test]
fn declaration_assignment_print() {
    let analysis = analyzed("{int a a=5 print(a)}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    assert_eq!(analysis.diagnostics.warning_count(), 0);
    insta::assert_snapshot!(analysis.ast.dump(), @r#"
    Block
      Declare
        TypeName "int"
        Ident "a"
      Assign
        Ident "a"
        IntLiteral "5"
      Print
        Ident "a"
    "#);
}

#[test]
fn string_literal_collapses_to_one_leaf() {
    let analysis = analyzed("{string s s=\"ab c\" print(s)}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    insta::assert_snapshot!(analysis.ast.dump(), @r#"
    Block
      Declare
        TypeName "string"
        Ident "s"
      Assign
        Ident "s"
        StringLiteral "ab c"
      Print
        Ident "s"
    "#);
}

#[test]
fn empty_string_literal_is_an_empty_leaf() {
    let analysis = analyzed("{string s s=\"\"}$");
    assert_eq!(analysis.diagnostics.error_count(), 0);
    assert!(analysis.ast.dump().contains("StringLiteral \"\""));
}

#[test]
fn addition_chain_nests_to_the_right() {
    let analysis = analyzed("{int a a=1+2+3}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    insta::assert_snapshot!(analysis.ast.dump(), @r#"
    Block
      Declare
        TypeName "int"
        Ident "a"
      Assign
        Ident "a"
        Add
          IntLiteral "1"
          Add
            IntLiteral "2"
            IntLiteral "3"
    "#);
}

#[test]
fn comparison_and_nested_block() {
    let analysis = analyzed("{if (1 == 2) {print(\"hi\")}}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    insta::assert_snapshot!(analysis.ast.dump(), @r#"
    Block
      If
        IsEq
          IntLiteral "1"
          IntLiteral "2"
        Block
          Print
            StringLiteral "hi"
    "#);
}

#[test]
fn scope_shadowing_creates_two_records() {
    let analysis = analyzed("{int a {int a a=1} a=2}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    insta::assert_snapshot!(analysis.symbols.dump(), @r"
    Scope 0
      a: int [initialized] (1:6)
      Scope 1a
        a: int [initialized] (1:13)
    ");
}

#[test]
fn sibling_scopes_get_lexical_suffixes() {
    let analysis = analyzed("{{}{}{}}$");
    assert_eq!(analysis.diagnostics.error_count(), 0);
    insta::assert_snapshot!(analysis.symbols.dump(), @r"
    Scope 0
      Scope 1a
      Scope 1b
      Scope 1c
    ");
}

#[test]
fn inner_block_resolves_outer_variable() {
    let analysis = analyzed("{int a {a=1}}$");
    assert_eq!(analysis.diagnostics.error_count(), 0);
}

#[test]
fn type_mismatch_on_assignment_is_one_error() {
    let analysis = analyzed("{int a string b a=b}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(
        rendered.contains(
            "ERROR   Analyzer - Type mismatch: Assigning string value [b] to int variable [a] at (1:17)"
        ),
        "unexpected diagnostics: {rendered}"
    );
}

#[test]
fn literal_type_mismatch_names_the_literal() {
    let analysis = analyzed("{int a a=\"x\"}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains(
        "Type mismatch: Assigning string literal [x] to int variable [a] at (1:8)"
    ));
}

#[test]
fn undeclared_assignment_target_is_reported() {
    let analysis = analyzed("{a=1}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Use of undeclared variable 'a' at (1:2)"));
}

#[test]
fn undeclared_print_operand_is_reported() {
    let analysis = analyzed("{print(a)}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Use of undeclared variable 'a' at (1:8)"));
}

#[test]
fn redeclaration_in_same_scope_is_reported() {
    let analysis = analyzed("{int a int a}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Redeclared variable [a] at (1:12)"));
}

#[test]
fn add_operand_must_be_int() {
    let analysis = analyzed("{int a string b b=\"x\" a=1+b}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Type mismatch: Using string in int expression at (1:27)"));
}

#[test]
fn nested_comparison_is_not_an_int_operand() {
    let analysis = analyzed("{int a a=1+(1==1)}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Type mismatch: Using boolean in int expression at (1:13)"));
}

#[test]
fn comparison_operands_must_have_equal_types() {
    let analysis = analyzed("{boolean b b=(1 == \"x\")}$");

    assert_eq!(analysis.diagnostics.error_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Type mismatch: Comparing int to string at (1:15)"));
}

#[test]
fn comparing_booleans_to_booleans_is_fine() {
    let analysis = analyzed("{boolean b b=(true == (1 != 2))}$");
    assert_eq!(analysis.diagnostics.error_count(), 0);
}

#[test]
fn use_before_initialization_warns_once() {
    let analysis = analyzed("{int a print(a)}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    assert_eq!(analysis.diagnostics.warning_count(), 1);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains(
        "WARNING Analyzer - Variable [a] is used before being initialized at (1:14)"
    ));
}

#[test]
fn unused_symbols_warn_in_the_post_pass() {
    let analysis = analyzed("{int a int b a=1}$");

    assert_eq!(analysis.diagnostics.error_count(), 0);
    assert_eq!(analysis.diagnostics.warning_count(), 2);
    let rendered = analysis.diagnostics.printer().render();
    assert!(rendered.contains("Variable [a] is initialized but never used at (1:6)"));
    assert!(rendered.contains("Variable [b] is declared but never initialized at (1:12)"));
}

#[test]
fn every_identifier_resolves_or_errors() {
    let analysis = analyzed("{int a {boolean b b=(a==1)}}$");
    assert_eq!(analysis.diagnostics.error_count(), 0);

    // `a` resolved to the outer scope and was marked used there.
    let root = analysis.symbols.root();
    assert!(analysis.symbols.symbol(root, "a").unwrap().used);
}
